// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The processing loop (C6): fair round-robin polling across sources,
//! startup-task queueing, failed-event re-queue, and config hot-reload.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use zoidbergd_adapters::SshTransport;
use zoidbergd_core::{
    branch_matches, validate_config, Action, ActionBinding, ActionRegistry, CommandRunner, Configuration, Event,
};

use crate::client::SourceClient;
use crate::error::{EngineError, ReloadError};
use crate::plugin_loader::PluginLoader;

/// Bound on how long the main loop blocks per source per `get_event` call.
/// Any small finite timeout keeps polling fair across sources; 0.5s matches
/// the original daemon's poll interval.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(500);

struct StartupTask {
    source_name: String,
    binding: ActionBinding,
}

/// The live engine: current configuration, per-source clients, the
/// startup-task queue, and the shared shutdown flag.
pub struct Engine<T> {
    registry: ActionRegistry,
    plugin_loader: PluginLoader,
    config: Configuration,
    clients: BTreeMap<String, Arc<SourceClient<T>>>,
    startup_queue: VecDeque<StartupTask>,
    running: Arc<AtomicBool>,
}

impl<T> Engine<T>
where
    T: SshTransport + Default + 'static,
{
    /// Load `config_path`, validate every binding against `registry` (after
    /// running `plugin_loader` over `config.plugins`), and build one
    /// inactive client per source. Propagates any error — this is the
    /// initial, fatal-on-failure load.
    pub fn bootstrap(
        config_path: impl AsRef<Path>,
        mut registry: ActionRegistry,
        plugin_loader: PluginLoader,
    ) -> Result<Self, EngineError> {
        let config_path = config_path.as_ref();
        let config = Configuration::load(config_path).map_err(|source| ReloadError::Config {
            path: config_path.to_path_buf(),
            source,
        })?;
        plugin_loader.load(&config.plugins, &mut registry)?;
        validate_full(&config, &registry)?;

        let clients = config
            .gerrits
            .iter()
            .map(|(name, source)| (name.clone(), Arc::new(SourceClient::new(source))))
            .collect();

        Ok(Self {
            registry,
            plugin_loader,
            config,
            clients,
            startup_queue: VecDeque::new(),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// A clonable handle a signal handler can flip to request shutdown.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Run the processing loop until `shutdown_handle` is cleared, then
    /// shut down every client.
    pub fn run(&mut self) {
        while self.running.load(Ordering::SeqCst) {
            self.run_iteration();
        }
        for client in self.clients.values() {
            client.shutdown();
        }
    }

    /// One pass of the main loop. Exposed separately from [`run`](Self::run)
    /// so tests can drive it deterministically rather than racing a
    /// free-running thread.
    pub fn run_iteration(&mut self) {
        self.process_startup_tasks();

        // `clients` is a `BTreeMap`, so this iterates in lexicographic
        // source-name order — fair, reproducible interleaving.
        let names: Vec<String> = self.clients.keys().cloned().collect();
        for name in names {
            let client = self.clients[&name].clone();
            if !client.is_active() {
                match client.activate() {
                    Ok(()) => self.queue_startup_tasks(&name),
                    Err(error) => {
                        tracing::error!(%error, source = %name, "failed to activate source");
                        continue;
                    }
                }
            }

            client.enqueue_failed_events();
            while let Some(event) = client.get_event(POLL_TIMEOUT) {
                self.process_event(&name, &event);
            }
        }

        if self.config.file_has_changed() {
            if let Err(error) = self.reload() {
                tracing::error!(%error, "config reload failed; keeping previous configuration");
            }
        }
    }

    fn queue_startup_tasks(&mut self, source_name: &str) {
        let Some(source) = self.config.gerrits.get(source_name) else {
            return;
        };
        for binding in &source.startup {
            self.startup_queue.push_back(StartupTask {
                source_name: source_name.to_string(),
                binding: binding.clone(),
            });
        }
    }

    fn process_startup_tasks(&mut self) {
        let pending: Vec<StartupTask> = self.startup_queue.drain(..).collect();
        for task in pending {
            let Some(target) = self.clients.get(&task.binding.target) else {
                continue;
            };
            if !target.is_active() {
                self.startup_queue.push_back(task);
                continue;
            }
            let Some(source) = self.config.gerrits.get(&task.source_name) else {
                continue;
            };
            if let Some(action) = self.registry.get(&task.binding.action) {
                if let Err(error) = action.do_startup(&self.config, &task.binding, source, self) {
                    tracing::error!(%error, action = action.name(), "startup task failed");
                }
            }
        }
    }

    fn process_event(&self, source_name: &str, event: &Event) {
        let Some(project) = event.project() else {
            return;
        };
        let Some(source) = self.config.gerrits.get(source_name) else {
            return;
        };
        if !source.project_re.is_match(project) {
            return;
        }
        let Some(bindings) = source.events.get(&event.kind) else {
            return;
        };
        for binding in bindings {
            self.run_action(source_name, source, binding, event);
        }
    }

    fn run_action(&self, source_name: &str, source: &zoidbergd_core::Source, binding: &ActionBinding, event: &Event) {
        if !branch_matches(binding, event) {
            return;
        }
        let Some(action) = self.registry.get(&binding.action) else {
            tracing::error!(action = %binding.action, "binding references an unregistered action");
            return;
        };
        let Some(target) = self.clients.get(&binding.target) else {
            return;
        };
        if !target.is_active() {
            self.clients[source_name].store_failed_event(event.clone());
            return;
        }
        if let Err(error) = action.do_run(event, &self.config, binding, source, self) {
            tracing::error!(%error, action = action.name(), "action execution failed");
        }
    }

    fn reload(&mut self) -> Result<(), ReloadError> {
        let config_path = self.config.path.clone();
        let new_config = Configuration::load(&config_path).map_err(|source| ReloadError::Config {
            path: config_path,
            source,
        })?;
        self.plugin_loader.load(&new_config.plugins, &mut self.registry)?;
        validate_full(&new_config, &self.registry)?;

        let mut new_clients: BTreeMap<String, Arc<SourceClient<T>>> = BTreeMap::new();
        for (name, new_source) in &new_config.gerrits {
            let reused = self.clients.get(name).filter(|old| {
                let probe = SourceClient::<T>::new(new_source);
                old.same_connection_as(&probe)
            });
            match reused {
                Some(old) => {
                    new_clients.insert(name.clone(), old.clone());
                }
                None => {
                    new_clients.insert(name.clone(), Arc::new(SourceClient::new(new_source)));
                }
            }
        }

        for (name, old_client) in &self.clients {
            let carried_over = new_clients.get(name).is_some_and(|c| Arc::ptr_eq(c, old_client));
            if !carried_over {
                old_client.shutdown();
            }
        }

        self.clients = new_clients;
        self.config = new_config;
        Ok(())
    }
}

impl<T> CommandRunner for Engine<T>
where
    T: SshTransport + Default + 'static,
{
    fn run_command(&self, source_name: &str, command: &str) -> Result<Vec<String>, String> {
        let client = self
            .clients
            .get(source_name)
            .ok_or_else(|| format!("unknown source `{source_name}`"))?;
        Ok(client.run_command(command))
    }
}

/// Validate every binding's `target` (via the universal prelude) and
/// variant-specific config, against a fully-loaded registry.
fn validate_full(config: &Configuration, registry: &ActionRegistry) -> Result<(), ReloadError> {
    for source in config.gerrits.values() {
        let bindings = source.events.values().flatten().chain(source.startup.iter());
        for binding in bindings {
            let action = registry
                .get(&binding.action)
                .ok_or_else(|| ReloadError::UnknownAction(binding.action.clone()))?;
            validate_config(action.as_ref(), config, binding)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
