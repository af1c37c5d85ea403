// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime.

use std::path::PathBuf;

use zoidbergd_adapters::SshError;
use zoidbergd_core::{ActionError, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connect error: {0}")]
    Connect(#[from] SshError),
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("plugin `{0}` is not a known bundle")]
    NotFound(String),
}

/// Errors from loading or reloading the configuration. Every variant is
/// fatal on the first load and logged-but-non-fatal on reload (the previous
/// configuration is retained).
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("binding for action `{0}` has no registered implementation")]
    UnknownAction(String),
    #[error(transparent)]
    Validation(#[from] ActionError),
}

#[derive(Debug, thiserror::Error)]
#[error("initial config load failed: {0}")]
pub struct EngineError(#[from] pub ReloadError);
