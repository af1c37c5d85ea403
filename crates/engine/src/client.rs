// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source client (C3): owns one source's SSH connection, its event stream,
//! and its in-memory failed-event buffer.

use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use zoidbergd_adapters::SshTransport;
use zoidbergd_core::{Event, Source};

use crate::error::ClientError;
use crate::stream::EventStream;

/// Queue capacity for a source's main event queue; generous enough that the
/// main loop's 0.5s poll never has to apply backpressure in practice.
const EVENT_QUEUE_CAPACITY: usize = 1024;

/// Everything the engine needs to drive one configured Gerrit source.
///
/// `T` is the SSH transport implementation — `Ssh2Transport` in production,
/// `FakeTransport` in tests. A fresh `T` is spun up for the background
/// stream reader on every [`activate`](Self::activate); one-shot
/// [`run_command`](Self::run_command) calls use a second, independently
/// connected transport, since a single `ssh2` session isn't meant to be
/// driven from two threads at once.
pub struct SourceClient<T> {
    host: String,
    port: u16,
    username: String,
    key_filename: PathBuf,
    command_transport: Mutex<T>,
    stream: Mutex<Option<EventStream>>,
    queue_tx: Sender<Event>,
    queue_rx: Receiver<Event>,
    failed: Mutex<Vec<Event>>,
}

impl<T> SourceClient<T>
where
    T: SshTransport + Default + 'static,
{
    pub fn new(source: &Source) -> Self {
        let (queue_tx, queue_rx) = crossbeam_channel::bounded(EVENT_QUEUE_CAPACITY);
        Self {
            host: source.host.clone(),
            port: source.port,
            username: source.username.clone(),
            key_filename: source.key_filename.clone(),
            command_transport: Mutex::new(T::default()),
            stream: Mutex::new(None),
            queue_tx,
            queue_rx,
            failed: Mutex::new(Vec::new()),
        }
    }

    /// `true` iff `self` and `other` share the same `(host, port, username,
    /// key)` — the reuse test applied on config reload.
    pub fn same_connection_as(&self, other: &Self) -> bool {
        self.host == other.host
            && self.port == other.port
            && self.username == other.username
            && self.key_filename == other.key_filename
    }

    /// Establish SSH and start a fresh event stream. Idempotent-ish: calling
    /// this while already active just reconnects the command transport and
    /// leaves the existing stream alone, matching `is_active`'s lazy-repair
    /// contract.
    pub fn activate(&self) -> Result<(), ClientError> {
        self.command_transport
            .lock()
            .connect(&self.host, self.port, &self.username, &self.key_filename)?;

        let mut stream_transport = T::default();
        stream_transport.connect(&self.host, self.port, &self.username, &self.key_filename)?;
        let stream = EventStream::start(stream_transport, self.queue_tx.clone());
        *self.stream.lock() = Some(stream);
        Ok(())
    }

    /// `true` iff the command transport is connected and the stream is
    /// still running. A dead stream with no corresponding transport repair
    /// is torn down as a side effect, so the next `activate` starts clean.
    pub fn is_active(&self) -> bool {
        let connected = self.command_transport.lock().is_connected();
        let mut guard = self.stream.lock();
        let stream_running = guard.as_ref().is_some_and(EventStream::is_active);
        if !stream_running {
            if let Some(stream) = guard.take() {
                stream.stop();
            }
        }
        connected && stream_running
    }

    /// Pop the next event, waiting up to `timeout`. Never fails on timeout.
    pub fn get_event(&self, timeout: Duration) -> Option<Event> {
        self.queue_rx.recv_timeout(timeout).ok()
    }

    pub fn store_failed_event(&self, event: Event) {
        self.failed.lock().push(event);
    }

    /// Move every buffered failed event back onto the main queue, in order,
    /// and clear the buffer.
    pub fn enqueue_failed_events(&self) {
        let events = std::mem::take(&mut *self.failed.lock());
        for event in events {
            let _ = self.queue_tx.send(event);
        }
    }

    /// Run `gerrit <command>` to completion and return its stdout lines.
    /// SSH errors (connect or exec) are logged and surface as an empty
    /// result rather than propagating — a one-shot command failing
    /// shouldn't take down the caller's own event processing.
    pub fn run_command(&self, command: &str) -> Vec<String> {
        let mut transport = T::default();
        if let Err(error) = transport.connect(&self.host, self.port, &self.username, &self.key_filename) {
            tracing::error!(%error, host = %self.host, command, "run_command failed to connect");
            return Vec::new();
        }
        let result = transport.run_command(&format!("gerrit {command}"));
        transport.close();
        match result {
            Ok(lines) => lines,
            Err(error) => {
                tracing::error!(%error, host = %self.host, command, "run_command failed");
                Vec::new()
            }
        }
    }

    /// Stop the stream, close the command transport, and drop any queued
    /// events.
    pub fn shutdown(&self) {
        if let Some(stream) = self.stream.lock().take() {
            stream.stop();
        }
        self.command_transport.lock().close();
        while self.queue_rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
