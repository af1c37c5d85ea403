// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mirrors a pushed branch from its originating source straight to another
//! Gerrit instance.

use std::path::PathBuf;

use zoidbergd_adapters::GitSsh;
use zoidbergd_core::{Action, ActionBinding, ActionError, CommandRunner, Configuration, Event, Source};

use crate::error::execution_error;

pub struct SyncBranchAction {
    git: GitSsh,
}

impl SyncBranchAction {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            git: GitSsh::new(scratch_dir),
        }
    }
}

impl Action for SyncBranchAction {
    fn name(&self) -> &'static str {
        "zoidberg.SyncBranch"
    }

    fn do_run(
        &self,
        event: &Event,
        cfg: &Configuration,
        binding: &ActionBinding,
        source: &Source,
        _commands: &dyn CommandRunner,
    ) -> Result<(), ActionError> {
        let ref_update = event.ref_update.as_ref().ok_or_else(|| execution_error(self.name(), "event has no refUpdate"))?;
        let target = cfg
            .gerrits
            .get(&binding.target)
            .ok_or_else(|| execution_error(self.name(), format!("unknown target `{}`", binding.target)))?;
        let branch = &ref_update.ref_name;
        let project = &ref_update.project;

        let dir = self
            .git
            .clone_project(source, project, branch)
            .map_err(|error| execution_error(self.name(), error))?;

        let refspec = format!("{branch}:refs/heads/{branch}");
        let push_result = self.git.push(&dir, target, project, &refspec, true);
        self.git.cleanup(&dir);
        push_result.map_err(|error| execution_error(self.name(), error))
    }
}

#[cfg(test)]
#[path = "sync_branch_tests.rs"]
mod tests;
