use anyhow::Result;

use super::helper::{finish, select_ids};
use super::super::{args::IgnoreCommand, context::CliContext, exit_status::ExitStatus};
use crate::core::model::SubstitutionState;

/// Tag literals so they are no longer reported.
pub fn ignore(cmd: IgnoreCommand) -> Result<ExitStatus> {
    let ctx = CliContext::new(&cmd.target.common)?;
    let mut session = ctx.open(&cmd.target.file)?;

    for id in select_ids(&session, &cmd.ids)? {
        session.set_state(id, SubstitutionState::Ignored)?;
    }

    finish(&ctx, session, cmd.target.apply)
}
