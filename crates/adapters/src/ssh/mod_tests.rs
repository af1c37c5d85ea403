// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn connect_error_message_names_host_and_port() {
    let err = SshError::Connect {
        host: "gerrit.example.com".to_string(),
        port: 29418,
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
    };
    assert!(err.to_string().contains("gerrit.example.com:29418"));
}

#[test]
fn not_connected_has_a_stable_message() {
    assert_eq!(SshError::NotConnected.to_string(), "not connected");
}
