use anyhow::Result;
use colored::Colorize;

use super::super::{args::ShowCommand, context::CliContext, exit_status::ExitStatus, report};

pub fn show(cmd: ShowCommand) -> Result<ExitStatus> {
    let ctx = CliContext::new(&cmd.common)?;
    let session = ctx.open(&cmd.file)?;
    report::print_substitutions(&session);

    if !session.accessor_exists() {
        let message = format!(
            "{} does not exist yet and will be created on the first externalization",
            session.accessor().handle.path.display()
        );
        println!("{}", message.dimmed());
    }
    Ok(ExitStatus::Success)
}
