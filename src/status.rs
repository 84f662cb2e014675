//! Validation results of a refactoring.

use std::fmt;

use crate::core::edit::Region;

/// Severity of a status entry, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
    /// The refactoring cannot run at all.
    Fatal,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLevel::Info => write!(f, "info"),
            StatusLevel::Warning => write!(f, "warning"),
            StatusLevel::Error => write!(f, "error"),
            StatusLevel::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub level: StatusLevel,
    pub message: String,
    /// Substitution the entry is about.
    pub substitution: Option<usize>,
    /// Source region the entry points at.
    pub region: Option<Region>,
}

/// Accumulated validation entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefactoringStatus {
    entries: Vec<StatusEntry>,
}

impl RefactoringStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.entries.push(StatusEntry {
            level,
            message: message.into(),
            substitution: None,
            region: None,
        });
    }

    /// Add an entry about one substitution.
    pub fn add_for(
        &mut self,
        level: StatusLevel,
        message: impl Into<String>,
        substitution: usize,
        region: Region,
    ) {
        self.entries.push(StatusEntry {
            level,
            message: message.into(),
            substitution: Some(substitution),
            region: Some(region),
        });
    }

    pub fn add_info(&mut self, message: impl Into<String>) {
        self.add(StatusLevel::Info, message);
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.add(StatusLevel::Warning, message);
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.add(StatusLevel::Error, message);
    }

    pub fn add_fatal(&mut self, message: impl Into<String>) {
        self.add(StatusLevel::Fatal, message);
    }

    pub fn merge(&mut self, other: RefactoringStatus) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Most severe level, or `None` when there are no entries.
    pub fn severity(&self) -> Option<StatusLevel> {
        self.entries.iter().map(|e| e.level).max()
    }

    pub fn has_fatal(&self) -> bool {
        self.severity() == Some(StatusLevel::Fatal)
    }

    /// True for errors and fatal errors.
    pub fn has_error(&self) -> bool {
        self.severity() >= Some(StatusLevel::Error)
    }

    pub fn is_ok(&self) -> bool {
        self.severity() <= Some(StatusLevel::Info)
    }
}
