// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event stream (C2): one OS thread per source, reading `gerrit
//! stream-events` lines and handing parsed events to the main loop.
//!
//! The transport is moved into the spawned thread rather than shared behind
//! a lock — `ssh2`'s channels aren't meant to be driven from more than one
//! thread at a time, so streaming and one-shot `run_command` calls use
//! separate connections (see [`crate::client::SourceClient`]).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use zoidbergd_adapters::{EventChannel, SshTransport};
use zoidbergd_core::Event;

/// A running (or just-stopped) `gerrit stream-events` reader.
pub struct EventStream {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EventStream {
    /// Open `gerrit stream-events` on `transport` and start draining it into
    /// `tx` on a dedicated thread. `transport` must already be connected.
    pub fn start<T>(transport: T, tx: Sender<Event>) -> Self
    where
        T: SshTransport + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let running_thread = running.clone();
        let handle = std::thread::spawn(move || run_loop(transport, tx, running_thread));
        Self {
            running,
            handle: Some(handle),
        }
    }

    /// `true` iff the reader thread is still believed to be running.
    /// Permanently false once the remote closes the stream or `stop` is
    /// called — a new `EventStream` is required to reconnect.
    pub fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Cooperatively stop the reader and join its thread.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop<T: SshTransport>(transport: T, tx: Sender<Event>, running: Arc<AtomicBool>) {
    let mut channel: Box<dyn EventChannel> = match transport.open_channel("gerrit stream-events") {
        Ok(channel) => channel,
        Err(error) => {
            tracing::error!(%error, "failed to open gerrit stream-events channel");
            running.store(false, Ordering::SeqCst);
            return;
        }
    };

    while running.load(Ordering::SeqCst) {
        if channel.exit_status_ready() {
            let reason = channel
                .read_stderr_line()
                .unwrap_or_else(|| "remote server connection closed".to_string());
            tracing::error!(reason, "gerrit stream-events closed");
            break;
        }
        match channel.read_line() {
            Ok(Some(line)) if line.is_empty() => {
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
            Ok(Some(line)) => match zoidbergd_core::parse(&line) {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Err(error) => tracing::debug!(%error, "failed to parse stream-events line"),
            },
            Ok(None) => {
                tracing::error!("gerrit stream-events stream ended");
                break;
            }
            Err(error) => {
                tracing::error!(%error, "gerrit stream-events read error");
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    channel.close();
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
