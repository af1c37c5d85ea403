// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git+SSH helper (C2's git half).
//!
//! `SyncBranch` and `SyncReviewCode` have no way to ask the Gerrit SSH
//! session to move a ref between two servers, so they shell out to `git`
//! instead, the same way the original actions did. Each source gets its own
//! disposable wrapper script so `git`'s `GIT_SSH` can point at the right
//! private key without touching the user's `~/.ssh/config`.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use zoidbergd_core::config::Source;

use crate::subprocess::{run_with_timeout, GIT_COMMAND_TIMEOUT};

#[derive(Debug, thiserror::Error)]
pub enum GitSshError {
    #[error("failed to write ssh wrapper script at {path}: {source}")]
    WrapperScript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("git {command} failed for {project}: {message}")]
    CommandFailed {
        command: String,
        project: String,
        message: String,
    },
}

/// Drives `git clone|fetch|push` through a one-shot `GIT_SSH` wrapper,
/// scoped to a single scratch directory.
pub struct GitSsh {
    scratch_dir: PathBuf,
}

impl GitSsh {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// The scratch checkout directory for `project` cloned off `source`.
    pub fn working_dir(&self, source: &Source, project: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{}-{}-tmp", source.host, project.replace('/', "_")))
    }

    /// Clone `project` off `source` at `branch` and leave the checkout at
    /// [`working_dir`](Self::working_dir).
    pub fn clone_project(&self, source: &Source, project: &str, branch: &str) -> Result<PathBuf, GitSshError> {
        let wrapper = self.ensure_ssh_wrapper(source)?;
        let url = git_ssh_url(source, project);
        let dir = self.working_dir(source, project);
        self.run(None, &wrapper, project, &["clone", &url, &dir.to_string_lossy()])?;
        self.run(Some(&dir), &wrapper, project, &["checkout", branch])?;
        self.run(Some(&dir), &wrapper, project, &["pull"])?;
        Ok(dir)
    }

    /// Fetch `refspec` from `source` into the repo checked out at `dir`.
    pub fn fetch(&self, dir: &Path, source: &Source, project: &str, refspec: &str) -> Result<(), GitSshError> {
        let wrapper = self.ensure_ssh_wrapper(source)?;
        let url = git_ssh_url(source, project);
        self.run(Some(dir), &wrapper, project, &["fetch", &url, refspec])
    }

    /// Push `refspec` to `target`'s `project`, from the repo checked out at `dir`.
    pub fn push(
        &self,
        dir: &Path,
        target: &Source,
        project: &str,
        refspec: &str,
        force: bool,
    ) -> Result<(), GitSshError> {
        let wrapper = self.ensure_ssh_wrapper(target)?;
        let url = git_ssh_url(target, project);
        let mut args = vec!["push", &url, refspec];
        if force {
            args.push("--force");
        }
        self.run(Some(dir), &wrapper, project, &args)
    }

    /// Remove a scratch checkout.
    pub fn cleanup(&self, dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    fn ensure_ssh_wrapper(&self, source: &Source) -> Result<PathBuf, GitSshError> {
        fs::create_dir_all(&self.scratch_dir).map_err(|source_err| GitSshError::WrapperScript {
            path: self.scratch_dir.clone(),
            source: source_err,
        })?;
        let path = self.scratch_dir.join(format!(".tmp_ssh_{}", source.host));
        let script = format!("#!/bin/sh\nexec ssh -i {} \"$@\"\n", source.key_filename.display());
        fs::write(&path, script).map_err(|source_err| GitSshError::WrapperScript {
            path: path.clone(),
            source: source_err,
        })?;
        let mut perms = fs::metadata(&path)
            .map_err(|source_err| GitSshError::WrapperScript {
                path: path.clone(),
                source: source_err,
            })?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).map_err(|source_err| GitSshError::WrapperScript {
            path: path.clone(),
            source: source_err,
        })?;
        Ok(path)
    }

    fn run(&self, dir: Option<&Path>, ssh_wrapper: &Path, project: &str, args: &[&str]) -> Result<(), GitSshError> {
        let mut cmd = Command::new("git");
        cmd.args(args).env("GIT_SSH", ssh_wrapper);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        let description = format!("git {}", args[0]);
        let output = run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, &description).map_err(|message| GitSshError::CommandFailed {
            command: args[0].to_string(),
            project: project.to_string(),
            message,
        })?;
        if !output.status.success() {
            return Err(GitSshError::CommandFailed {
                command: args[0].to_string(),
                project: project.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

fn git_ssh_url(source: &Source, project: &str) -> String {
    format!("ssh://{}@{}:{}/{}", source.username, source.host, source.port, project)
}

#[cfg(test)]
#[path = "gitssh_tests.rs"]
mod tests;
