// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zoidbergd: bridges multiple Gerrit code-review servers by relaying their
//! `stream-events` output through pluggable actions.
//!
//! The engine's processing loop is synchronous (the SSH transport is
//! blocking), so it runs on its own OS thread; the `tokio` runtime here
//! exists only to wait on SIGTERM/SIGINT the same way, then flip the
//! engine's shutdown flag and join it.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cli;
mod logging;

use std::sync::atomic::Ordering;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use zoidbergd_adapters::Ssh2Transport;
use zoidbergd_core::ActionRegistry;
use zoidbergd_engine::{Engine, PluginLoader};

use crate::cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(&args)?;

    let mut registry = ActionRegistry::new();
    zoidbergd_actions::register_builtin_actions(&mut registry, args.scratch_dir.clone());

    // Built-ins are registered above unconditionally; the plugin loader only
    // has a bundle table to resolve `plugins:` entries against once a
    // deployment ships one (see zoidbergd-engine::PluginLoader docs).
    let plugin_loader = PluginLoader::new();

    let mut engine: Engine<Ssh2Transport> = match Engine::bootstrap(&args.config, registry, plugin_loader) {
        Ok(engine) => engine,
        Err(error) => {
            error!(%error, "failed to start");
            std::process::exit(1);
        }
    };

    let shutdown = engine.shutdown_handle();
    info!(config = %args.config.display(), "starting");
    let engine_thread = std::thread::spawn(move || engine.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }
    shutdown.store(false, Ordering::SeqCst);

    if engine_thread.join().is_err() {
        error!("engine thread panicked");
        std::process::exit(1);
    }
    info!("stopped");
    Ok(())
}
