use anyhow::Result;

mod args;
mod commands;
mod context;
mod exit_status;
pub mod report;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    match args.command {
        Some(Command::Check(cmd)) => commands::check::check(cmd, verbose),
        Some(Command::Show(cmd)) => commands::show::show(cmd),
        Some(Command::Externalize(cmd)) => commands::externalize::externalize(cmd),
        Some(Command::Internalize(cmd)) => commands::internalize::internalize(cmd),
        Some(Command::Ignore(cmd)) => commands::ignore::ignore(cmd),
        Some(Command::RenameKey(cmd)) => commands::rename_key::rename_key(cmd),
        Some(Command::Apply(cmd)) => commands::apply::apply(cmd),
        Some(Command::Init) => commands::init::init(),
        None => Ok(ExitStatus::Success),
    }
}
