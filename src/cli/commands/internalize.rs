use anyhow::{Result, bail};

use super::helper::finish;
use super::super::{args::InternalizeCommand, context::CliContext, exit_status::ExitStatus};
use crate::core::model::SubstitutionState;

/// Inline externalized strings. Keys no other file owns are removed from the
/// resource file.
pub fn internalize(cmd: InternalizeCommand) -> Result<ExitStatus> {
    let ctx = CliContext::new(&cmd.target.common)?;
    let mut session = ctx.open(&cmd.target.file)?;

    let externalized: Vec<(usize, Option<String>)> = session
        .substitutions()
        .iter()
        .filter(|s| s.state() == SubstitutionState::Externalized)
        .map(|s| (s.id, s.key().map(str::to_string)))
        .collect();

    for key in &cmd.keys {
        if !externalized.iter().any(|(_, k)| k.as_deref() == Some(key.as_str())) {
            bail!(
                "key '{}' is not referenced by {}",
                key,
                session.source_path().display()
            );
        }
    }

    for (id, key) in externalized {
        let selected = cmd.keys.is_empty()
            || key.as_ref().is_some_and(|k| cmd.keys.contains(k));
        if selected {
            session.set_state(id, SubstitutionState::Internalized)?;
        }
    }

    finish(&ctx, session, cmd.target.apply)
}
