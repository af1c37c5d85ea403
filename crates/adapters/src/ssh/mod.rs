// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH transport adapter (C2's transport half).
//!
//! [`SshTransport`] is the seam between the engine and an actual Gerrit SSH
//! session: connecting, running one-shot `gerrit` commands, and opening a
//! long-lived channel for `gerrit stream-events`. [`Ssh2Transport`] is the
//! real implementation, backed by the `ssh2` bindings to libssh2.

mod real;

pub use real::Ssh2Transport;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEventChannel, FakeTransport};

use std::path::Path;

/// Keepalive interval the client asks the server to honor once connected,
/// matching the original client's `set_keepalive(30)`.
pub const KEEPALIVE_INTERVAL_SECS: u32 = 30;

#[derive(Debug, thiserror::Error)]
pub enum SshError {
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("ssh protocol error: {0}")]
    Protocol(#[from] ssh2::Error),
    #[error("authentication failed for user `{username}`")]
    AuthFailed { username: String },
    #[error("not connected")]
    NotConnected,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single remote-exec'd channel, used for the long-lived
/// `gerrit stream-events` command.
///
/// Mirrors the polling shape of the original stream reader: the caller
/// checks [`exit_status_ready`](EventChannel::exit_status_ready) before each
/// [`read_line`](EventChannel::read_line), rather than relying on `read_line`
/// blocking forever.
pub trait EventChannel: Send {
    /// Read the next full line from the channel's stdout, blocking until one
    /// is available. `Ok(None)` means the remote side closed the stream.
    fn read_line(&mut self) -> Result<Option<String>, SshError>;

    /// Whether the remote command has signalled it is done.
    fn exit_status_ready(&mut self) -> bool;

    /// Best-effort read of a single line of buffered stderr, if any is
    /// available without blocking.
    fn read_stderr_line(&mut self) -> Option<String>;

    /// Send EOF and close the channel.
    fn close(&mut self);
}

/// Everything the engine needs from a single Gerrit SSH connection.
pub trait SshTransport: Send {
    fn connect(&mut self, host: &str, port: u16, username: &str, key_filename: &Path) -> Result<(), SshError>;

    fn is_connected(&self) -> bool;

    /// Open a channel executing `command` and leave it open for streaming.
    fn open_channel(&self, command: &str) -> Result<Box<dyn EventChannel>, SshError>;

    /// Run `command` to completion and collect its stdout as lines.
    fn run_command(&self, command: &str) -> Result<Vec<String>, SshError>;

    fn close(&mut self);
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
