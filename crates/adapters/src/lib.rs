// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the SSH transport and the git+ssh helper used
//! to mirror refs between Gerrit servers.

pub mod gitssh;
pub mod ssh;
mod subprocess;

pub use gitssh::{GitSsh, GitSshError};
pub use ssh::{EventChannel, Ssh2Transport, SshError, SshTransport, KEEPALIVE_INTERVAL_SECS};

#[cfg(any(test, feature = "test-support"))]
pub use ssh::{FakeEventChannel, FakeTransport};
