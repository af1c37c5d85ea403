// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::fs::PermissionsExt;
use zoidbergd_core::Configuration;

fn sample_source() -> Source {
    let cfg = Configuration::parse(
        r#"
gerrits:
  - master:
      host: gerrit.example.com
      username: zoidberg
      key_filename: /etc/zoidberg/master.key
      project-pattern: ".*"
"#,
    )
    .unwrap();
    cfg.gerrits["master"].clone()
}

#[test]
fn working_dir_combines_host_and_sanitized_project_name() {
    let git = GitSsh::new("/tmp/zoidbergd-scratch");
    let dir = git.working_dir(&sample_source(), "team/widgets");
    assert_eq!(dir.file_name().unwrap(), "gerrit.example.com-team_widgets-tmp");
}

#[test]
fn ensure_ssh_wrapper_writes_an_executable_script_pointing_at_the_key() {
    let tmp = tempfile::tempdir().unwrap();
    let git = GitSsh::new(tmp.path());
    let source = sample_source();
    let wrapper = git.ensure_ssh_wrapper(&source).unwrap();

    let contents = std::fs::read_to_string(&wrapper).unwrap();
    assert!(contents.contains("/etc/zoidberg/master.key"));

    let mode = std::fs::metadata(&wrapper).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn clone_of_an_unreachable_host_surfaces_a_command_failed_error() {
    let tmp = tempfile::tempdir().unwrap();
    let git = GitSsh::new(tmp.path());
    let mut unreachable = sample_source();
    unreachable.host = "127.0.0.1".to_string();
    unreachable.port = 1;
    let err = git.clone_project(&unreachable, "widgets", "master").unwrap_err();
    assert!(matches!(err, GitSshError::CommandFailed { command, .. } if command == "clone"));
}
