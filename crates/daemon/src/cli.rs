// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "zoidbergd", about = "Bridges Gerrit instances via stream-events and pluggable actions")]
pub struct Args {
    /// Config YAML path.
    #[arg(short, long, default_value = "./etc/zoidberg.yaml")]
    pub config: PathBuf,

    /// Verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// File to log to. Defaults to stdout.
    #[arg(long)]
    pub logfile: Option<PathBuf>,

    /// Scratch directory for `SyncBranch`/`SyncReviewCode`'s throwaway git
    /// checkouts and SSH wrapper scripts. Defaults to the process working
    /// directory, matching where `./.tmp_ssh_<host>` and
    /// `./<host>-<project>-tmp` land with no override.
    #[arg(long, default_value_os_t = PathBuf::from("."))]
    pub scratch_dir: PathBuf,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
