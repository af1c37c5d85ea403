// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The action contract (C4) and the explicit, write-once registry that
//! backs it.
//!
//! The registry is a table built by explicit calls — there is no reliance
//! on import-time/static-init side effects. Built-in actions and plugin
//! actions both register into the same table the same way.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ActionBinding, Configuration, Source};
use crate::event::Event;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{action}: {message}")]
    Validation { action: String, message: String },
    #[error("{action}: not implemented")]
    NotImplemented { action: String },
    #[error("{action}: {message}")]
    Execution { action: String, message: String },
}

/// What an action uses to run a one-shot `gerrit` SSH command against a
/// named source, without needing to know how that source's connection is
/// actually held open. `Engine` implements this over its live client map;
/// `PropagateComment` is the only shipped action that needs it.
pub trait CommandRunner: Send + Sync {
    fn run_command(&self, source_name: &str, command: &str) -> Result<Vec<String>, String>;
}

/// Implemented by every action variant: validate its own binding, run on a
/// matching event, and optionally catch up once its target comes online.
pub trait Action: Send + Sync {
    /// Registered name, e.g. `"zoidberg.SyncBranch"`.
    ///
    /// See the `Action` variants in `zoidbergd-actions` for the shipped set.
    fn name(&self) -> &'static str;

    /// Variant-specific config validation. Default: accept anything with a
    /// valid `target`, which the universal prelude in [`validate_config`]
    /// already checked.
    fn validate_binding(&self, _cfg: &Configuration, _binding: &ActionBinding) -> Result<(), ActionError> {
        Ok(())
    }

    /// Perform the action's effect for `event`. Only called after the
    /// universal branch filter and target-liveness check in [`run`] pass.
    fn do_run(
        &self,
        event: &Event,
        cfg: &Configuration,
        binding: &ActionBinding,
        source: &Source,
        commands: &dyn CommandRunner,
    ) -> Result<(), ActionError>;

    /// Catch-up work to run once per inactive→active transition, after the
    /// universal target-liveness check in [`startup`] passes. Default: no
    /// startup work.
    fn do_startup(
        &self,
        _cfg: &Configuration,
        _binding: &ActionBinding,
        _source: &Source,
        _commands: &dyn CommandRunner,
    ) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Universal validation prelude shared by every action: `target` must be
/// present and must reference a known source.
pub fn validate_config(
    action: &dyn Action,
    cfg: &Configuration,
    binding: &ActionBinding,
) -> Result<(), ActionError> {
    if !cfg.gerrits.contains_key(&binding.target) {
        return Err(ActionError::Validation {
            action: action.name().to_string(),
            message: format!("target `{}` does not reference a gerrit instance", binding.target),
        });
    }
    action.validate_binding(cfg, binding)
}

/// Whether a branch filter on `binding`, if present, matches `event`.
/// `true` when there is no filter at all.
pub fn branch_matches(binding: &ActionBinding, event: &Event) -> bool {
    match &binding.branch_re {
        None => true,
        Some(re) => match event.branch() {
            Some(branch) => re.is_match(branch),
            None => false,
        },
    }
}

/// Process-wide, explicitly constructed name → implementation table.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action implementation under its own [`Action::name`].
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn get_all(&self) -> impl Iterator<Item = &Arc<dyn Action>> {
        self.actions.values()
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
