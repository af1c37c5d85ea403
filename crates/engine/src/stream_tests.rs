// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use zoidbergd_adapters::FakeTransport;
use std::path::PathBuf;

fn connected_fake() -> FakeTransport {
    let mut transport = FakeTransport::new();
    transport
        .connect("gerrit.example.com", 29418, "zoidberg", &PathBuf::from("/k"))
        .unwrap();
    transport
}

#[test]
fn streams_a_queued_line_as_a_parsed_event() {
    let transport = connected_fake();
    transport.push_stream_line(r#"{"type":"ref-updated","refUpdate":{"project":"nikki","refName":"master"}}"#);
    transport.close_stream();

    let (tx, rx) = crossbeam_channel::unbounded();
    let stream = EventStream::start(transport, tx);

    let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(event.project(), Some("nikki"));

    // The stream reports stopped once the fake signals end-of-stream.
    std::thread::sleep(Duration::from_millis(50));
    assert!(!stream.is_active());
}

#[test]
fn malformed_line_is_skipped_without_stopping_the_stream() {
    let transport = connected_fake();
    transport.push_stream_line("not json");
    transport.push_stream_line(r#"{"type":"comment-added"}"#);
    transport.close_stream();

    let (tx, rx) = crossbeam_channel::unbounded();
    let _stream = EventStream::start(transport, tx);

    let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(event.kind, "comment-added");
}

#[test]
fn stop_joins_the_reader_thread_even_without_a_remote_close() {
    let transport = connected_fake();
    let (tx, _rx) = crossbeam_channel::unbounded();
    let stream = EventStream::start(transport, tx);
    assert!(stream.is_active());
    stream.stop();
}
