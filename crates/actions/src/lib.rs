// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The shipped action implementations (C4): `SyncBranch`, `SyncReviewCode`,
//! `PropagateComment`, and `MarkChangeAsMerged`.

mod error;
mod mark_change_as_merged;
mod propagate_comment;
mod sync_branch;
mod sync_review_code;

use std::path::PathBuf;
use std::sync::Arc;

use zoidbergd_core::ActionRegistry;

pub use mark_change_as_merged::MarkChangeAsMergedAction;
pub use propagate_comment::PropagateCommentAction;
pub use sync_branch::SyncBranchAction;
pub use sync_review_code::SyncReviewCodeAction;

/// Register the four actions shipped with the daemon under their
/// `zoidberg.*` names. `scratch_dir` is where `SyncBranch`/`SyncReviewCode`
/// check out their throwaway git clones.
pub fn register_builtin_actions(registry: &mut ActionRegistry, scratch_dir: impl Into<PathBuf>) {
    let scratch_dir = scratch_dir.into();
    registry.register(Arc::new(SyncBranchAction::new(scratch_dir.clone())));
    registry.register(Arc::new(SyncReviewCodeAction::new(scratch_dir)));
    registry.register(Arc::new(PropagateCommentAction));
    registry.register(Arc::new(MarkChangeAsMergedAction));
}
