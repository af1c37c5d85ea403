// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers.
//!
//! The engine runs entirely on blocking OS threads, so these helpers poll
//! [`std::process::Child`] rather than reaching for an
//! async runtime.

use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

/// Default timeout for a single git subcommand (`clone`, `fetch`, `push`, …).
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// How often to poll a child process for completion while waiting on a
/// timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `cmd` to completion, killing it and returning an error if it runs
/// longer than `timeout`.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration, description: &str) -> Result<Output, String> {
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("{description} failed to start: {e}"))?;

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(_status)) => {
                return child
                    .wait_with_output()
                    .map_err(|e| format!("{description} failed to collect output: {e}"));
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(format!("{description} timed out after {}s", timeout.as_secs()));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(format!("{description} failed while polling: {e}")),
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
