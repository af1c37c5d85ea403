// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwards a review comment from its originating source to the
//! corresponding change on another Gerrit instance, via `gerrit review`.
//!
//! Guards against re-propagating its own output: a comment whose first line
//! already carries this action's header (author name/email followed by
//! `(<source> gerrit)`) is dropped rather than forwarded again.

use zoidbergd_core::{Action, ActionBinding, ActionError, CommandRunner, Configuration, Event, Source};

use crate::error::execution_error;

pub struct PropagateCommentAction;

impl Action for PropagateCommentAction {
    fn name(&self) -> &'static str {
        "zoidberg.PropagateComment"
    }

    fn do_run(
        &self,
        event: &Event,
        _cfg: &Configuration,
        binding: &ActionBinding,
        source: &Source,
        commands: &dyn CommandRunner,
    ) -> Result<(), ActionError> {
        let patch_set = event
            .patch_set
            .as_ref()
            .ok_or_else(|| execution_error(self.name(), "event has no patchSet"))?;
        let author = event.author.as_ref().ok_or_else(|| execution_error(self.name(), "event has no author"))?;
        let comment = event.comment.as_deref().ok_or_else(|| execution_error(self.name(), "event has no comment"))?;

        let user_header = format!("{} ({})", author.name, author.email);
        let message_header = format!("{user_header} - ({} gerrit)", source.name);

        let incoming_header = comment.lines().next().unwrap_or_default();
        if incoming_header.starts_with(&user_header) && incoming_header.ends_with("gerrit)") {
            return Ok(());
        }

        let message = format!("{message_header}\n\n--------\n\n{comment}");
        let command = format!("review {} -m \"{}\"", patch_set.revision, message);
        commands
            .run_command(&binding.target, &command)
            .map(|_| ())
            .map_err(|error| execution_error(self.name(), error))
    }
}

#[cfg(test)]
#[path = "propagate_comment_tests.rs"]
mod tests;
