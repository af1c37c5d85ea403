// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake SSH transport for testing the engine without a real Gerrit server.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{EventChannel, SshError, SshTransport};

/// A recorded `connect` call, for asserting on connection-reuse behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectCall {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub key_filename: PathBuf,
}

struct FakeState {
    connected: bool,
    connect_calls: Vec<ConnectCall>,
    fail_connect: bool,
    command_responses: HashMap<String, Vec<String>>,
    stream_lines: VecDeque<String>,
    stream_closed: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            connected: false,
            connect_calls: Vec::new(),
            fail_connect: false,
            command_responses: HashMap::new(),
            stream_lines: VecDeque::new(),
            stream_closed: false,
        }
    }
}

/// Fake transport: records calls, and hands canned responses back to
/// whoever holds it or any of its `.clone()`s.
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a line for the next [`open_channel`](SshTransport::open_channel)
    /// reader to yield.
    pub fn push_stream_line(&self, line: impl Into<String>) {
        self.inner.lock().stream_lines.push_back(line.into());
    }

    /// Mark the stream as closed: once queued lines are drained, the
    /// channel's `exit_status_ready` returns true.
    pub fn close_stream(&self) {
        self.inner.lock().stream_closed = true;
    }

    /// Canned stdout lines for a future [`run_command`](SshTransport::run_command) call.
    pub fn set_command_response(&self, command: impl Into<String>, lines: Vec<String>) {
        self.inner.lock().command_responses.insert(command.into(), lines);
    }

    /// Make the next `connect` call fail.
    pub fn fail_next_connect(&self) {
        self.inner.lock().fail_connect = true;
    }

    pub fn connect_calls(&self) -> Vec<ConnectCall> {
        self.inner.lock().connect_calls.clone()
    }
}

impl SshTransport for FakeTransport {
    fn connect(&mut self, host: &str, port: u16, username: &str, key_filename: &Path) -> Result<(), SshError> {
        let mut state = self.inner.lock();
        if state.fail_connect {
            state.fail_connect = false;
            return Err(SshError::AuthFailed {
                username: username.to_string(),
            });
        }
        state.connect_calls.push(ConnectCall {
            host: host.to_string(),
            port,
            username: username.to_string(),
            key_filename: key_filename.to_path_buf(),
        });
        state.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    fn open_channel(&self, _command: &str) -> Result<Box<dyn EventChannel>, SshError> {
        if !self.inner.lock().connected {
            return Err(SshError::NotConnected);
        }
        Ok(Box::new(FakeEventChannel {
            inner: self.inner.clone(),
        }))
    }

    fn run_command(&self, command: &str) -> Result<Vec<String>, SshError> {
        let state = self.inner.lock();
        if !state.connected {
            return Err(SshError::NotConnected);
        }
        Ok(state.command_responses.get(command).cloned().unwrap_or_default())
    }

    fn close(&mut self) {
        self.inner.lock().connected = false;
    }
}

pub struct FakeEventChannel {
    inner: Arc<Mutex<FakeState>>,
}

impl EventChannel for FakeEventChannel {
    /// Pops a queued line if one is ready. If the queue is empty and the
    /// stream hasn't been closed, returns an empty placeholder line rather
    /// than blocking — matching [`Ssh2EventChannel`](super::real)'s
    /// would-block behavior so callers that poll in a loop see the same
    /// shape from both implementations.
    fn read_line(&mut self) -> Result<Option<String>, SshError> {
        let mut state = self.inner.lock();
        if let Some(line) = state.stream_lines.pop_front() {
            return Ok(Some(line));
        }
        if state.stream_closed {
            return Ok(None);
        }
        Ok(Some(String::new()))
    }

    fn exit_status_ready(&mut self) -> bool {
        let state = self.inner.lock();
        state.stream_closed && state.stream_lines.is_empty()
    }

    fn read_stderr_line(&mut self) -> Option<String> {
        None
    }

    fn close(&mut self) {
        self.inner.lock().stream_closed = true;
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
