// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use zoidbergd_adapters::FakeTransport;
use zoidbergd_core::{Action, ActionError};

fn config(yaml: &str) -> Configuration {
    Configuration::parse(yaml).unwrap()
}

struct CountingAction {
    name: &'static str,
    runs: Arc<AtomicUsize>,
    startups: Arc<AtomicUsize>,
}

impl Action for CountingAction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn do_run(
        &self,
        _event: &Event,
        _cfg: &Configuration,
        _binding: &ActionBinding,
        _source: &zoidbergd_core::Source,
        _commands: &dyn zoidbergd_core::CommandRunner,
    ) -> Result<(), ActionError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn do_startup(
        &self,
        _cfg: &Configuration,
        _binding: &ActionBinding,
        _source: &zoidbergd_core::Source,
        _commands: &dyn zoidbergd_core::CommandRunner,
    ) -> Result<(), ActionError> {
        self.startups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn registry_with(name: &'static str, runs: Arc<AtomicUsize>, startups: Arc<AtomicUsize>) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(Arc::new(CountingAction { name, runs, startups }));
    registry
}

const TWO_SOURCE_CONFIG: &str = r#"
gerrits:
  - master:
      host: master.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/master.key
      project-pattern: ".*"
      events:
        - type: comment-added
          action: zoidberg.test.Counter
          target: thirdparty
  - thirdparty:
      host: thirdparty.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/thirdparty.key
      project-pattern: ".*"
"#;

fn bootstrap_with(yaml: &str, registry: ActionRegistry) -> Engine<FakeTransport> {
    let mut cfg = config(yaml);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zoidbergd.yml");
    std::fs::write(&path, yaml).unwrap();
    cfg.path = path;
    std::mem::forget(dir);
    let plugin_loader = PluginLoader::new();
    validate_full(&cfg, &registry).unwrap();
    let clients = cfg
        .gerrits
        .iter()
        .map(|(name, source)| (name.clone(), Arc::new(SourceClient::new(source))))
        .collect();
    Engine {
        registry,
        plugin_loader,
        config: cfg,
        clients,
        startup_queue: VecDeque::new(),
        running: Arc::new(AtomicBool::new(true)),
    }
}

#[test]
fn unknown_action_in_binding_fails_validation() {
    let cfg = config(TWO_SOURCE_CONFIG);
    let registry = ActionRegistry::new();
    let err = validate_full(&cfg, &registry).unwrap_err();
    assert!(matches!(err, ReloadError::UnknownAction(name) if name == "zoidberg.test.Counter"));
}

#[test]
fn binding_targeting_unknown_source_fails_validation() {
    let runs = Arc::new(AtomicUsize::new(0));
    let startups = Arc::new(AtomicUsize::new(0));
    let registry = registry_with("zoidberg.test.Counter", runs, startups);
    let cfg = config(
        r#"
gerrits:
  - master:
      host: master.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/master.key
      project-pattern: ".*"
      events:
        - type: comment-added
          action: zoidberg.test.Counter
          target: nowhere
"#,
    );
    let err = validate_full(&cfg, &registry).unwrap_err();
    assert!(matches!(err, ReloadError::Validation(_)));
}

#[test]
fn event_is_dispatched_when_target_is_active_and_project_matches() {
    let runs = Arc::new(AtomicUsize::new(0));
    let startups = Arc::new(AtomicUsize::new(0));
    let registry = registry_with("zoidberg.test.Counter", runs.clone(), startups);
    let engine = bootstrap_with(TWO_SOURCE_CONFIG, registry);

    engine.clients["thirdparty"].activate().unwrap();
    let event = zoidbergd_core::parse(r#"{"type":"comment-added","change":{"project":"foo","branch":"main"}}"#).unwrap();
    engine.process_event("master", &event);

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    engine.clients["thirdparty"].shutdown();
}

#[test]
fn event_with_no_project_is_ignored() {
    let runs = Arc::new(AtomicUsize::new(0));
    let startups = Arc::new(AtomicUsize::new(0));
    let registry = registry_with("zoidberg.test.Counter", runs.clone(), startups);
    let engine = bootstrap_with(TWO_SOURCE_CONFIG, registry);

    let event = zoidbergd_core::parse(r#"{"type":"comment-added"}"#).unwrap();
    engine.process_event("master", &event);

    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn event_is_buffered_as_failed_when_target_is_down() {
    let runs = Arc::new(AtomicUsize::new(0));
    let startups = Arc::new(AtomicUsize::new(0));
    let registry = registry_with("zoidberg.test.Counter", runs.clone(), startups);
    let engine = bootstrap_with(TWO_SOURCE_CONFIG, registry);

    // `thirdparty` was never activated, so it reads as inactive.
    let event = zoidbergd_core::parse(r#"{"type":"comment-added","change":{"project":"foo","branch":"main"}}"#).unwrap();
    engine.process_event("master", &event);

    assert_eq!(runs.load(Ordering::SeqCst), 0);

    engine.clients["master"].enqueue_failed_events();
    assert_eq!(engine.clients["master"].get_event(Duration::from_millis(50)), Some(event));
}

#[test]
fn startup_tasks_run_once_target_becomes_active_and_requeue_otherwise() {
    let runs = Arc::new(AtomicUsize::new(0));
    let startups = Arc::new(AtomicUsize::new(0));
    let registry = registry_with("zoidberg.test.Counter", runs, startups.clone());
    let mut engine = bootstrap_with(
        r#"
gerrits:
  - master:
      host: master.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/master.key
      project-pattern: ".*"
      startup:
        - action: zoidberg.test.Counter
          target: thirdparty
  - thirdparty:
      host: thirdparty.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/thirdparty.key
      project-pattern: ".*"
"#,
        registry,
    );

    engine.queue_startup_tasks("master");
    // target inactive: task requeues without running.
    engine.process_startup_tasks();
    assert_eq!(startups.load(Ordering::SeqCst), 0);
    assert_eq!(engine.startup_queue.len(), 1);

    engine.clients["thirdparty"].activate().unwrap();
    engine.process_startup_tasks();
    assert_eq!(startups.load(Ordering::SeqCst), 1);
    assert!(engine.startup_queue.is_empty());

    engine.clients["thirdparty"].shutdown();
}

#[test]
fn reload_carries_over_clients_with_an_unchanged_connection_tuple() {
    let registry = ActionRegistry::new();
    let mut engine = bootstrap_with(
        r#"
gerrits:
  - master:
      host: master.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/master.key
      project-pattern: ".*"
"#,
        registry,
    );
    let original = engine.clients["master"].clone();
    engine.clients["master"].activate().unwrap();

    // Rewrite the config file with the same connection tuple but an
    // unrelated cosmetic change (a startup binding would require a
    // registered action, so we keep the file identical here).
    let text = std::fs::read_to_string(&engine.config.path).unwrap();
    std::fs::write(&engine.config.path, text).unwrap();

    engine.reload().unwrap();
    assert!(Arc::ptr_eq(&engine.clients["master"], &original));
    assert!(engine.clients["master"].is_active());

    engine.clients["master"].shutdown();
    std::fs::remove_file(&engine.config.path).ok();
}

#[test]
fn command_runner_returns_empty_result_rather_than_erroring_when_the_command_fails() {
    let registry = ActionRegistry::new();
    let engine = bootstrap_with(TWO_SOURCE_CONFIG, registry);
    engine.clients["thirdparty"].activate().unwrap();

    // No canned response was set for this command, so `FakeTransport`
    // returns an empty line list — exercising the same "errors surface as
    // an empty result" contract `CommandRunner::run_command` promises its
    // callers (see `crates/engine/src/client_tests.rs` for the transport
    // connect-failure case).
    let lines = engine.run_command("thirdparty", "review abc -m hi").unwrap();
    assert_eq!(lines, Vec::<String>::new());

    engine.clients["thirdparty"].shutdown();
}

#[test]
fn command_runner_errors_on_an_unknown_source_name() {
    let registry = ActionRegistry::new();
    let engine = bootstrap_with(TWO_SOURCE_CONFIG, registry);
    assert!(engine.run_command("nowhere", "review abc -m hi").is_err());
}

#[test]
fn reload_replaces_and_shuts_down_a_client_whose_connection_changed() {
    let registry = ActionRegistry::new();
    let mut engine = bootstrap_with(
        r#"
gerrits:
  - master:
      host: master.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/master.key
      project-pattern: ".*"
"#,
        registry,
    );
    let original = engine.clients["master"].clone();
    engine.clients["master"].activate().unwrap();

    std::fs::write(
        &engine.config.path,
        r#"
gerrits:
  - master:
      host: master.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/master-renewed.key
      project-pattern: ".*"
"#,
    )
    .unwrap();

    engine.reload().unwrap();
    assert!(!Arc::ptr_eq(&engine.clients["master"], &original));

    engine.clients["master"].shutdown();
    std::fs::remove_file(&engine.config.path).ok();
}
