// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The zoidbergd runtime: per-source SSH clients, the event stream reader,
//! the plugin loader, and the main processing loop that ties them together.

mod client;
mod engine;
mod error;
mod plugin_loader;
mod stream;

pub use client::SourceClient;
pub use engine::{Engine, POLL_TIMEOUT};
pub use error::{ClientError, EngineError, PluginError, ReloadError};
pub use plugin_loader::{PluginLoader, RegisterFn};
pub use stream::EventStream;
