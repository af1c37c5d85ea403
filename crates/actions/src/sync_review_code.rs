// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mirrors an in-review patch set onto another Gerrit instance as a new
//! review, preserving the change's topic.

use std::path::PathBuf;

use zoidbergd_adapters::GitSsh;
use zoidbergd_core::{Action, ActionBinding, ActionError, CommandRunner, Configuration, Event, Source};

use crate::error::execution_error;

pub struct SyncReviewCodeAction {
    git: GitSsh,
}

impl SyncReviewCodeAction {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            git: GitSsh::new(scratch_dir),
        }
    }
}

impl Action for SyncReviewCodeAction {
    fn name(&self) -> &'static str {
        "zoidberg.SyncReviewCode"
    }

    fn do_run(
        &self,
        event: &Event,
        cfg: &Configuration,
        binding: &ActionBinding,
        source: &Source,
        _commands: &dyn CommandRunner,
    ) -> Result<(), ActionError> {
        let change = event.change.as_ref().ok_or_else(|| execution_error(self.name(), "event has no change"))?;
        let patch_set = event
            .patch_set
            .as_ref()
            .ok_or_else(|| execution_error(self.name(), "event has no patchSet"))?;
        let patch_ref = patch_set
            .ref_
            .as_ref()
            .ok_or_else(|| execution_error(self.name(), "patchSet has no ref"))?;
        let target = cfg
            .gerrits
            .get(&binding.target)
            .ok_or_else(|| execution_error(self.name(), format!("unknown target `{}`", binding.target)))?;

        // We clone off the *target* here, not the source — the new review
        // lands on the target, so that's where the local working copy needs
        // to track.
        let dir = self
            .git
            .clone_project(target, &change.project, &change.branch)
            .map_err(|error| execution_error(self.name(), error))?;

        let fetch_result = self.git.fetch(&dir, source, &change.project, patch_ref);
        if let Err(error) = fetch_result {
            self.git.cleanup(&dir);
            return Err(execution_error(self.name(), error));
        }

        let refspec = match change.topic.as_deref().filter(|t| !t.is_empty()) {
            Some(topic) => format!("FETCH_HEAD:refs/for/{}/{}", change.branch, topic),
            None => format!("FETCH_HEAD:refs/for/{}", change.branch),
        };
        let push_result = self.git.push(&dir, target, &change.project, &refspec, false);
        self.git.cleanup(&dir);
        push_result.map_err(|error| execution_error(self.name(), error))
    }
}

#[cfg(test)]
#[path = "sync_review_code_tests.rs"]
mod tests;
