// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use zoidbergd_adapters::FakeTransport;
use zoidbergd_core::Configuration;

fn source(name: &str) -> Source {
    let cfg = Configuration::parse(&format!(
        r#"
gerrits:
  - {name}:
      host: {name}.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/{name}.key
      project-pattern: ".*"
"#
    ))
    .unwrap();
    cfg.gerrits[name].clone()
}

#[test]
fn activate_connects_and_starts_a_running_stream() {
    let client: SourceClient<FakeTransport> = SourceClient::new(&source("master"));
    client.activate().unwrap();
    assert!(client.is_active());
    client.shutdown();
}

#[test]
fn failed_events_are_requeued_in_order_and_buffer_cleared() {
    let client: SourceClient<FakeTransport> = SourceClient::new(&source("master"));
    client.activate().unwrap();

    let first = zoidbergd_core::parse(r#"{"type":"comment-added","comment":"first"}"#).unwrap();
    let second = zoidbergd_core::parse(r#"{"type":"comment-added","comment":"second"}"#).unwrap();
    client.store_failed_event(first.clone());
    client.store_failed_event(second.clone());

    client.enqueue_failed_events();

    assert_eq!(client.get_event(Duration::from_millis(100)), Some(first));
    assert_eq!(client.get_event(Duration::from_millis(100)), Some(second));

    // Idempotence: calling again with nothing buffered yields nothing new.
    client.enqueue_failed_events();
    assert_eq!(client.get_event(Duration::from_millis(50)), None);
    client.shutdown();
}

#[test]
fn same_connection_as_compares_only_the_connection_tuple() {
    let a: SourceClient<FakeTransport> = SourceClient::new(&source("master"));
    let b: SourceClient<FakeTransport> = SourceClient::new(&source("master"));
    assert!(a.same_connection_as(&b));

    let c: SourceClient<FakeTransport> = SourceClient::new(&source("thirdparty"));
    assert!(!a.same_connection_as(&c));
}

#[test]
fn get_event_times_out_without_erroring_when_queue_is_empty() {
    let client: SourceClient<FakeTransport> = SourceClient::new(&source("master"));
    assert_eq!(client.get_event(Duration::from_millis(20)), None);
}

#[test]
fn run_command_returns_stdout_lines_on_success() {
    let client: SourceClient<FakeTransport> = SourceClient::new(&source("master"));
    client.activate().unwrap();
    let lines = client.run_command("review abc -m hi");
    // No canned response was set for this command, so an empty `Vec` here
    // exercises the same return path a real empty stdout would take.
    assert_eq!(lines, Vec::<String>::new());
    client.shutdown();
}

/// A transport whose `connect` always fails, standing in for a Gerrit host
/// that's unreachable or refuses the key.
#[derive(Default)]
struct AlwaysFailsTransport;

impl zoidbergd_adapters::SshTransport for AlwaysFailsTransport {
    fn connect(
        &mut self,
        _host: &str,
        _port: u16,
        username: &str,
        _key_filename: &std::path::Path,
    ) -> Result<(), zoidbergd_adapters::SshError> {
        Err(zoidbergd_adapters::SshError::AuthFailed {
            username: username.to_string(),
        })
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn open_channel(&self, _command: &str) -> Result<Box<dyn zoidbergd_adapters::EventChannel>, zoidbergd_adapters::SshError> {
        Err(zoidbergd_adapters::SshError::NotConnected)
    }

    fn run_command(&self, _command: &str) -> Result<Vec<String>, zoidbergd_adapters::SshError> {
        Err(zoidbergd_adapters::SshError::NotConnected)
    }

    fn close(&mut self) {}
}

#[test]
fn run_command_swallows_a_connect_failure_and_returns_an_empty_result() {
    let client: SourceClient<AlwaysFailsTransport> = SourceClient::new(&source("master"));
    let lines = client.run_command("review abc -m hi");
    assert_eq!(lines, Vec::<String>::new());
}
