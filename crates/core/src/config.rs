// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The parsed, validated configuration model (C5).
//!
//! Building a [`Configuration`] never leaves partially-validated state: YAML
//! parsing, regex compilation, and the `events`/`startup` binding shape are
//! all resolved in [`Configuration::load`] before anything else sees it.
//! Validating bindings against a concrete action registry is a separate
//! step ([`Configuration::validate_bindings`]) because the registry isn't
//! known until plugins have been loaded.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;

const DEFAULT_PORT: u16 = 29418;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid regex `{pattern}` in {context}: {source}")]
    Regex {
        pattern: String,
        context: String,
        #[source]
        source: regex::Error,
    },
    #[error("source `{0}` has no `{1}` key")]
    MissingKey(String, &'static str),
}

/// A single entry under a source's `events` or `startup` list.
#[derive(Debug, Clone)]
pub struct ActionBinding {
    pub action: String,
    pub target: String,
    pub branch_re: Option<Regex>,
    /// Action-specific keys (`projects`, `branches`, …) not otherwise typed.
    pub extra: Value,
}

/// One configured Gerrit source ("gerrit config block").
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub key_filename: PathBuf,
    pub project_re: Regex,
    /// Event kind → ordered list of bindings, in the order declared.
    pub events: BTreeMap<String, Vec<ActionBinding>>,
    pub startup: Vec<ActionBinding>,
}

/// The full parsed configuration: every source plus the plugin list.
///
/// `gerrits` is a `BTreeMap` so iteration order is lexicographic by source
/// name — the engine relies on this for fair, reproducible polling order
/// rather than sorting on every loop iteration.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub gerrits: BTreeMap<String, Source>,
    pub plugins: Vec<String>,
    pub path: PathBuf,
    pub mtime: SystemTime,
}

impl Configuration {
    /// Parse and validate a configuration file, recording its current mtime.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mtime = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let config = Self::parse(&text)?;
        Ok(Self {
            path: path.to_path_buf(),
            mtime,
            ..config
        })
    }

    /// Parse configuration YAML text, without touching the filesystem.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(text)?;
        let mut gerrits = BTreeMap::new();
        for entry in raw.gerrits {
            let (name, raw_source) = entry
                .into_iter()
                .next()
                .ok_or_else(|| ConfigError::MissingKey("<gerrit entry>".to_string(), "name"))?;
            let source = build_source(&name, raw_source)?;
            gerrits.insert(name, source);
        }
        Ok(Configuration {
            gerrits,
            plugins: raw.plugins,
            path: PathBuf::new(),
            mtime: SystemTime::UNIX_EPOCH,
        })
    }

    /// `true` iff the on-disk mtime is strictly newer than the one recorded
    /// at the last successful load.
    pub fn file_has_changed(&self) -> bool {
        match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(current) => current > self.mtime,
            Err(_) => false,
        }
    }

    /// Validate every binding's `action` against a registry of known names.
    ///
    /// Separate from [`Self::load`] because the action registry depends on
    /// plugins that are themselves named by this configuration.
    pub fn validate_bindings(
        &self,
        is_registered: impl Fn(&str) -> bool,
    ) -> Result<(), BindingValidationError> {
        for source in self.gerrits.values() {
            for bindings in source.events.values() {
                for binding in bindings {
                    self.validate_one(source, binding, &is_registered)?;
                }
            }
            for binding in &source.startup {
                self.validate_one(source, binding, &is_registered)?;
            }
        }
        Ok(())
    }

    fn validate_one(
        &self,
        source: &Source,
        binding: &ActionBinding,
        is_registered: &impl Fn(&str) -> bool,
    ) -> Result<(), BindingValidationError> {
        if !self.gerrits.contains_key(&binding.target) {
            return Err(BindingValidationError::UnknownTarget {
                source: source.name.clone(),
                target: binding.target.clone(),
            });
        }
        if !is_registered(&binding.action) {
            return Err(BindingValidationError::UnknownAction {
                source: source.name.clone(),
                action: binding.action.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindingValidationError {
    #[error("source `{source}` has a binding targeting unknown source `{target}`")]
    UnknownTarget { source: String, target: String },
    #[error("source `{source}` has a binding for unregistered action `{action}`")]
    UnknownAction { source: String, action: String },
}

fn build_source(name: &str, raw: RawSource) -> Result<Source, ConfigError> {
    let project_re = Regex::new(&raw.project_pattern).map_err(|e| ConfigError::Regex {
        pattern: raw.project_pattern.clone(),
        context: format!("source `{name}` project-pattern"),
        source: e,
    })?;

    let mut events: BTreeMap<String, Vec<ActionBinding>> = BTreeMap::new();
    for raw_binding in raw.events {
        let event_type = raw_binding
            .event_type
            .clone()
            .ok_or_else(|| ConfigError::MissingKey(name.to_string(), "type"))?;
        let binding = build_binding(name, &raw_binding)?;
        events.entry(event_type).or_default().push(binding);
    }

    let startup = raw
        .startup
        .iter()
        .map(|b| build_binding(name, b))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Source {
        name: name.to_string(),
        host: raw.host,
        port: raw.port,
        username: raw.username,
        key_filename: raw.key_filename,
        project_re,
        events,
        startup,
    })
}

fn build_binding(source_name: &str, raw: &RawBinding) -> Result<ActionBinding, ConfigError> {
    let branch_re = raw
        .branch_pattern
        .as_ref()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| ConfigError::Regex {
                pattern: pattern.clone(),
                context: format!("source `{source_name}` branch-pattern"),
                source: e,
            })
        })
        .transpose()?;
    Ok(ActionBinding {
        action: raw.action.clone(),
        target: raw.target.clone(),
        branch_re,
        extra: raw.extra.clone(),
    })
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    plugins: Vec<String>,
    gerrits: Vec<BTreeMap<String, RawSource>>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    username: String,
    key_filename: PathBuf,
    #[serde(rename = "project-pattern")]
    project_pattern: String,
    #[serde(default)]
    events: Vec<RawBinding>,
    #[serde(default)]
    startup: Vec<RawBinding>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Deserialize, Clone)]
struct RawBinding {
    #[serde(rename = "type", default)]
    event_type: Option<String>,
    action: String,
    target: String,
    #[serde(rename = "branch-pattern", default)]
    branch_pattern: Option<String>,
    #[serde(flatten)]
    extra: Value,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
