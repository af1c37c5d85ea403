// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (C1's ambient half): file-or-stdout `tracing` subscriber,
//! verbosity controlled by `-v`/`RUST_LOG`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Args;

/// `"debug"` under `-v`, `"info"` otherwise — the fallback used when
/// `RUST_LOG` isn't set.
pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Split a `--logfile` path into the directory `rolling::never` should
/// watch and the bare file name within it, creating the directory if
/// needed. `None` path parent (bare file name in the cwd) resolves to `.`.
fn split_log_path(path: &std::path::Path) -> anyhow::Result<(std::path::PathBuf, std::ffi::OsString)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("logfile path {} has no file name", path.display()))?
        .to_os_string();
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;
    Ok((parent, file_name))
}

/// Build the process-wide `tracing` subscriber. The returned guard must be
/// held for the life of the process — dropping it stops the background
/// flush thread and any buffered log lines are lost.
pub fn init(args: &Args) -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(args.verbose)));

    let (non_blocking, guard) = match &args.logfile {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            tracing_appender::non_blocking(appender)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
