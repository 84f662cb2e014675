//! Externalize command - move string literals of a file to the resource file.
//!
//! Without `--id`, every plain literal containing letters is externalized.
//! Keys are generated from the key prefix.

use anyhow::Result;
use tracing::debug;

use super::helper::{finish, select_ids};
use super::super::{args::ExternalizeCommand, context::CliContext, exit_status::ExitStatus};
use crate::core::model::SubstitutionState;

pub fn externalize(cmd: ExternalizeCommand) -> Result<ExitStatus> {
    let target = &cmd.target;
    let ctx = CliContext::new(&target.common)?;

    let mut options = ctx.session_options()?;
    if let Some(prefix) = &cmd.key_prefix {
        options.key_prefix = prefix.clone();
    }
    let mut session = ctx.open_with(&target.file, options)?;

    let ids = select_ids(&session, &cmd.ids)?;
    debug!(count = ids.len(), "externalizing substitutions");
    for id in ids {
        session.set_state(id, SubstitutionState::Externalized)?;
    }

    finish(&ctx, session, target.apply)
}
