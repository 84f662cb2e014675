//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Report string literals that are neither externalized nor tagged
//! - `show`: List the substitutions of a source file
//! - `externalize`: Move string literals to the resource file
//! - `internalize`: Inline externalized strings again
//! - `ignore`: Tag string literals as intentionally inline
//! - `rename-key`: Rename a resource key
//! - `apply`: Apply a JSON edit plan to a source file
//! - `init`: Initialize the configuration file
//!
//! Mutating commands preview their changes unless `--apply` is given.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::accessor::AccessorKind;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::Show(cmd)) => cmd.common.verbose,
            Some(Command::Externalize(cmd)) => cmd.target.common.verbose,
            Some(Command::Internalize(cmd)) => cmd.target.common.verbose,
            Some(Command::Ignore(cmd)) => cmd.target.common.verbose,
            Some(Command::RenameKey(cmd)) => cmd.target.common.verbose,
            Some(Command::Apply(cmd)) => cmd.target.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Directory the config file is searched from (default: current directory)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Accessor class name (overrides config file)
    #[arg(long)]
    pub accessor_name: Option<String>,

    /// Accessor file, relative to the source root (overrides config file)
    #[arg(long)]
    pub accessor_path: Option<PathBuf>,

    /// Kind of accessor to create (overrides config file)
    #[arg(long, value_enum)]
    pub mode: Option<AccessorKind>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments of commands that refactor one source file.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Source file to refactor
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Write the changes (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Files to check (default: all source files under the source root)
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Source file to inspect
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ExternalizeCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Only externalize these substitutions (ids as listed by `show`)
    #[arg(long = "id")]
    pub ids: Vec<usize>,

    /// Prefix of generated keys (overrides config file)
    #[arg(long)]
    pub key_prefix: Option<String>,
}

#[derive(Debug, Args)]
pub struct InternalizeCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Keys to inline (default: all keys referenced by the file)
    pub keys: Vec<String>,
}

#[derive(Debug, Args)]
pub struct IgnoreCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Only tag these substitutions (ids as listed by `show`)
    #[arg(long = "id")]
    pub ids: Vec<usize>,
}

#[derive(Debug, Args)]
pub struct RenameKeyCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Current key
    pub old: String,

    /// New key
    pub new: String,
}

#[derive(Debug, Args)]
pub struct ApplyCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// JSON file describing the substitution edits
    #[arg(long)]
    pub plan: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report string literals that are neither externalized nor tagged
    Check(CheckCommand),
    /// List the substitutions of a source file
    Show(ShowCommand),
    /// Move string literals of a file to the resource file
    Externalize(ExternalizeCommand),
    /// Inline externalized strings of a file again
    Internalize(InternalizeCommand),
    /// Tag string literals of a file as intentionally inline
    Ignore(IgnoreCommand),
    /// Rename a resource key used by a file
    RenameKey(RenameKeyCommand),
    /// Apply a JSON edit plan to a file
    Apply(ApplyCommand),
    /// Initialize a new .nlsrc.json configuration file
    Init,
}
