use anyhow::{Result, bail};

use super::helper::finish;
use super::super::{args::RenameKeyCommand, context::CliContext, exit_status::ExitStatus};

/// Rename a key at every reference in the file and in the resource file.
pub fn rename_key(cmd: RenameKeyCommand) -> Result<ExitStatus> {
    let ctx = CliContext::new(&cmd.target.common)?;
    let mut session = ctx.open(&cmd.target.file)?;

    let ids: Vec<usize> = session
        .substitutions()
        .iter()
        .filter(|s| s.is_externalized() && s.key() == Some(cmd.old.as_str()))
        .map(|s| s.id)
        .collect();
    if ids.is_empty() {
        bail!(
            "key '{}' is not referenced by {}",
            cmd.old,
            session.source_path().display()
        );
    }

    for id in ids {
        session.set_key(id, Some(cmd.new.clone()))?;
    }

    finish(&ctx, session, cmd.target.apply)
}
