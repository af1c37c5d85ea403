// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A registered, config-validated placeholder. The distilled config format
//! names this action but no original implementation exists to ground it
//! against — see DESIGN.md's Open Question decisions. It accepts bindings
//! at config-validation time but refuses to run.

use zoidbergd_core::{Action, ActionBinding, ActionError, CommandRunner, Configuration, Event, Source};

pub struct MarkChangeAsMergedAction;

impl Action for MarkChangeAsMergedAction {
    fn name(&self) -> &'static str {
        "zoidberg.MarkChangeAsMerged"
    }

    fn do_run(
        &self,
        _event: &Event,
        _cfg: &Configuration,
        _binding: &ActionBinding,
        _source: &Source,
        _commands: &dyn CommandRunner,
    ) -> Result<(), ActionError> {
        Err(ActionError::NotImplemented {
            action: self.name().to_string(),
        })
    }

    fn do_startup(
        &self,
        _cfg: &Configuration,
        _binding: &ActionBinding,
        _source: &Source,
        _commands: &dyn CommandRunner,
    ) -> Result<(), ActionError> {
        Err(ActionError::NotImplemented {
            action: self.name().to_string(),
        })
    }
}

#[cfg(test)]
#[path = "mark_change_as_merged_tests.rs"]
mod tests;
