use std::{io, path::PathBuf};

use thiserror::Error;

use super::session::SessionState;

/// Errors raised by the refactoring engine.
///
/// Validation problems with user input (bad keys, patterns) are not errors;
/// they are collected on a [`RefactoringStatus`](crate::status::RefactoringStatus).
#[derive(Debug, Error)]
pub enum NlsError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete {}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} was modified since it was read", path.display())]
    Stale { path: PathBuf },

    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("edits overlap at byte {offset}")]
    OverlappingEdits { offset: usize },

    #[error("edit at byte {offset} does not fit the text")]
    InvalidEdit { offset: usize },

    #[error("no substitution with id {0}")]
    UnknownSubstitution(usize),

    #[error("cannot {operation} a session that is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("refactoring was cancelled")]
    Cancelled,
}
