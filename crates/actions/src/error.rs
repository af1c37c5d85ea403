// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use zoidbergd_core::ActionError;

pub(crate) fn execution_error(action: &str, message: impl std::fmt::Display) -> ActionError {
    ActionError::Execution {
        action: action.to_string(),
        message: message.to_string(),
    }
}
