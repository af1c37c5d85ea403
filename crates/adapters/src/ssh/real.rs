// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Read;
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use super::{EventChannel, SshError, SshTransport, KEEPALIVE_INTERVAL_SECS};

/// Read timeout on the underlying TCP stream. Bounds how long a stream
/// reader thread can be stuck inside a single blocking read, so it notices
/// a cooperative stop promptly instead of only at the next line.
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Real SSH transport, backed by `ssh2` (libssh2 bindings).
pub struct Ssh2Transport {
    session: Option<ssh2::Session>,
}

impl Default for Ssh2Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Ssh2Transport {
    pub fn new() -> Self {
        Self { session: None }
    }
}

impl SshTransport for Ssh2Transport {
    fn connect(&mut self, host: &str, port: u16, username: &str, key_filename: &Path) -> Result<(), SshError> {
        let tcp = TcpStream::connect((host, port)).map_err(|source| SshError::Connect {
            host: host.to_string(),
            port,
            source,
        })?;
        tcp.set_read_timeout(Some(READ_TIMEOUT)).map_err(|source| SshError::Connect {
            host: host.to_string(),
            port,
            source,
        })?;
        let mut session = ssh2::Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session.userauth_pubkey_file(username, None, key_filename, None)?;
        if !session.authenticated() {
            return Err(SshError::AuthFailed {
                username: username.to_string(),
            });
        }
        session.set_keepalive(true, KEEPALIVE_INTERVAL_SECS);
        self.session = Some(session);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.authenticated())
    }

    fn open_channel(&self, command: &str) -> Result<Box<dyn EventChannel>, SshError> {
        let session = self.session.as_ref().ok_or(SshError::NotConnected)?;
        let mut channel = session.channel_session()?;
        channel.exec(command)?;
        Ok(Box::new(Ssh2EventChannel {
            channel,
            buf: Vec::new(),
        }))
    }

    fn run_command(&self, command: &str) -> Result<Vec<String>, SshError> {
        let session = self.session.as_ref().ok_or(SshError::NotConnected)?;
        let mut channel = session.channel_session()?;
        channel.exec(command)?;
        let mut output = String::new();
        channel.read_to_string(&mut output)?;
        channel.wait_close()?;
        Ok(output.lines().map(str::to_string).collect())
    }

    fn close(&mut self) {
        if let Some(session) = &self.session {
            let _ = session.disconnect(None, "zoidbergd shutting down", None);
        }
        self.session = None;
    }
}

struct Ssh2EventChannel {
    channel: ssh2::Channel,
    buf: Vec<u8>,
}

impl EventChannel for Ssh2EventChannel {
    /// Returns a complete line, `None` on EOF, or an empty placeholder line
    /// if the underlying read timed out with nothing buffered — the caller
    /// is expected to poll again rather than this call blocking forever.
    /// Keeping the would-block case non-recursive-forever lets the stream
    /// thread notice a cooperative stop between reads instead of being
    /// stuck inside a single `read_line` call indefinitely.
    fn read_line(&mut self) -> Result<Option<String>, SshError> {
        if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            return Ok(Some(String::from_utf8_lossy(&line).trim_end().to_string()));
        }
        let mut chunk = [0u8; 4096];
        match self.channel.read(&mut chunk) {
            Ok(0) => Ok(None),
            Ok(n) => {
                self.buf.extend_from_slice(&chunk[..n]);
                self.read_line()
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(Some(String::new())),
            Err(e) => Err(SshError::Io(e)),
        }
    }

    fn exit_status_ready(&mut self) -> bool {
        self.channel.eof()
    }

    fn read_stderr_line(&mut self) -> Option<String> {
        let mut stderr = self.channel.stderr();
        let mut chunk = [0u8; 1024];
        match stderr.read(&mut chunk) {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(String::from_utf8_lossy(&chunk[..n]).trim_end().to_string()),
        }
    }

    fn close(&mut self) {
        let _ = self.channel.send_eof();
        let _ = self.channel.close();
        let _ = self.channel.wait_close();
    }
}
