// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin loader (C7).
//!
//! The original loader imported `<name>.actions` so that the module's
//! registration side effects ran. Dynamically loading Rust code at runtime
//! has no safe story in a crate that forbids `unsafe`, so this loader instead resolves
//! each configured plugin name against a compiled-in table of constructor
//! functions the binary registered up front. Anything not in that table is
//! a [`PluginError::NotFound`], handled by the same load/reload policy as
//! every other config error.

use std::collections::HashMap;

use zoidbergd_core::ActionRegistry;

use crate::error::PluginError;

/// A named bundle of actions that can be enabled via `plugins:` in config.
pub type RegisterFn = fn(&mut ActionRegistry);

#[derive(Default)]
pub struct PluginLoader {
    bundles: HashMap<String, RegisterFn>,
}

impl PluginLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a bundle available under `name` for `plugins:` to reference.
    pub fn register_bundle(&mut self, name: impl Into<String>, register: RegisterFn) {
        self.bundles.insert(name.into(), register);
    }

    /// Resolve every name in `plugins` against the known bundles and run
    /// its registration function against `registry`, in order.
    pub fn load(&self, plugins: &[String], registry: &mut ActionRegistry) -> Result<(), PluginError> {
        for name in plugins {
            let register = self.bundles.get(name).ok_or_else(|| PluginError::NotFound(name.clone()))?;
            register(registry);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "plugin_loader_tests.rs"]
mod tests;
