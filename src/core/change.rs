//! File changes produced by a session, their preview, and their undo.
//!
//! Every change remembers the snapshot it was computed against. Before
//! anything is written the whole batch is checked against the store, so a
//! file modified behind the session's back stops the refactoring before the
//! first write.

use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use thiserror::Error;
use tracing::info;

use super::{
    NlsError,
    edit::{AppliedEdits, TextEdit, apply_edits, sort_edits},
    session::CancellationToken,
    store::FileStore,
};
use crate::utils::LineIndex;

#[enum_dispatch(Change)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Edit(EditFileChange),
    Create(CreateFileChange),
    Delete(DeleteFileChange),
}

#[enum_dispatch]
pub trait Change {
    fn path(&self) -> &Path;

    /// Check that the file is still in the state the change was computed against.
    fn is_valid(&self, store: &dyn FileStore) -> Result<(), NlsError>;

    /// Write the change and return the change that reverts it.
    fn perform(&self, store: &mut dyn FileStore) -> Result<FileChange, NlsError>;

    /// Contents before and after the change.
    fn preview(&self) -> ChangePreview;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePreview {
    pub path: PathBuf,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Changed lines of an edited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based first line in the original text.
    pub line: usize,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

/// A batch of edits to an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFileChange {
    path: PathBuf,
    original: String,
    edits: Vec<TextEdit>,
    applied: AppliedEdits,
}

impl EditFileChange {
    /// Fails if the edits overlap or do not fit `original`.
    pub fn new(path: PathBuf, original: String, edits: Vec<TextEdit>) -> Result<Self, NlsError> {
        let applied = apply_edits(&original, &edits)?;
        Ok(Self {
            path,
            original,
            edits,
            applied,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn result(&self) -> &str {
        &self.applied.text
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Groups of changed lines, edits on adjacent lines merged.
    pub fn hunks(&self) -> Vec<Hunk> {
        let old_index = LineIndex::new(&self.original);
        let mut hunks = Vec::new();
        // (old start, old end, delta before the group, delta of the group)
        let mut groups: Vec<(usize, usize, isize, isize)> = Vec::new();
        let mut delta: isize = 0;

        for edit in sort_edits(&self.edits) {
            let start = old_index.line_start_of(edit.region.offset);
            let end = old_index.line_end_with_delimiter(edit.region.end());
            let change = edit.text.len() as isize - edit.region.len as isize;
            match groups.last_mut() {
                Some(group) if start <= group.1 => {
                    group.1 = group.1.max(end);
                    group.3 += change;
                }
                _ => groups.push((start, end, delta, change)),
            }
            delta += change;
        }

        for (start, end, before_delta, group_delta) in groups {
            let new_start = (start as isize + before_delta) as usize;
            let new_end = (end as isize + before_delta + group_delta) as usize;
            hunks.push(Hunk {
                line: old_index.line_of(start),
                before: self.original[start..end].lines().map(str::to_string).collect(),
                after: self.applied.text[new_start..new_end]
                    .lines()
                    .map(str::to_string)
                    .collect(),
            });
        }
        hunks
    }
}

impl Change for EditFileChange {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self, store: &dyn FileStore) -> Result<(), NlsError> {
        match store.read(&self.path)? {
            Some(current) if current == self.original => Ok(()),
            _ => Err(NlsError::Stale {
                path: self.path.clone(),
            }),
        }
    }

    fn perform(&self, store: &mut dyn FileStore) -> Result<FileChange, NlsError> {
        self.is_valid(store)?;
        store.write(&self.path, &self.applied.text)?;
        info!(path = %self.path.display(), edits = self.edits.len(), "updated file");
        let undo = EditFileChange {
            path: self.path.clone(),
            original: self.applied.text.clone(),
            edits: self.applied.inverse.clone(),
            applied: AppliedEdits {
                text: self.original.clone(),
                inverse: self.edits.clone(),
            },
        };
        Ok(undo.into())
    }

    fn preview(&self) -> ChangePreview {
        ChangePreview {
            path: self.path.clone(),
            before: Some(self.original.clone()),
            after: Some(self.applied.text.clone()),
        }
    }
}

/// A file that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFileChange {
    path: PathBuf,
    contents: String,
}

impl CreateFileChange {
    pub fn new(path: PathBuf, contents: String) -> Self {
        Self { path, contents }
    }
}

impl Change for CreateFileChange {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self, store: &dyn FileStore) -> Result<(), NlsError> {
        if store.exists(&self.path) {
            return Err(NlsError::AlreadyExists {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    fn perform(&self, store: &mut dyn FileStore) -> Result<FileChange, NlsError> {
        self.is_valid(store)?;
        store.write(&self.path, &self.contents)?;
        info!(path = %self.path.display(), "created file");
        Ok(DeleteFileChange::new(self.path.clone(), self.contents.clone()).into())
    }

    fn preview(&self) -> ChangePreview {
        ChangePreview {
            path: self.path.clone(),
            before: None,
            after: Some(self.contents.clone()),
        }
    }
}

/// Removal of a file with known contents. Only produced as an undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFileChange {
    path: PathBuf,
    expected: String,
}

impl DeleteFileChange {
    pub fn new(path: PathBuf, expected: String) -> Self {
        Self { path, expected }
    }
}

impl Change for DeleteFileChange {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_valid(&self, store: &dyn FileStore) -> Result<(), NlsError> {
        match store.read(&self.path)? {
            Some(current) if current == self.expected => Ok(()),
            _ => Err(NlsError::Stale {
                path: self.path.clone(),
            }),
        }
    }

    fn perform(&self, store: &mut dyn FileStore) -> Result<FileChange, NlsError> {
        self.is_valid(store)?;
        store.delete(&self.path)?;
        info!(path = %self.path.display(), "deleted file");
        Ok(CreateFileChange::new(self.path.clone(), self.expected.clone()).into())
    }

    fn preview(&self) -> ChangePreview {
        ChangePreview {
            path: self.path.clone(),
            before: Some(self.expected.clone()),
            after: None,
        }
    }
}

/// Write failure in the middle of a composite change.
#[derive(Debug, Error)]
#[error("refactoring stopped after writing {} file(s)", .undo.len())]
pub struct PerformFailure {
    #[source]
    pub error: NlsError,
    /// Reverts the files written before the failure.
    pub undo: CompositeChange,
}

/// Ordered file changes performed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeChange {
    pub name: String,
    changes: Vec<FileChange>,
}

impl CompositeChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            changes: Vec::new(),
        }
    }

    pub fn add(&mut self, change: impl Into<FileChange>) {
        self.changes.push(change.into());
    }

    pub fn changes(&self) -> &[FileChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn is_valid(&self, store: &dyn FileStore) -> Result<(), NlsError> {
        self.changes.iter().try_for_each(|c| c.is_valid(store))
    }

    /// Check every change, then perform them in order.
    ///
    /// Nothing is written if a check fails. On a write failure the returned
    /// error carries the undo for the files already written.
    pub fn perform(
        &self,
        store: &mut dyn FileStore,
        cancel: &CancellationToken,
    ) -> Result<CompositeChange, PerformFailure> {
        let mut undo = CompositeChange::new(format!("Undo {}", self.name));
        let fail = |error, undo: CompositeChange| PerformFailure { error, undo };

        if cancel.is_cancelled() {
            return Err(fail(NlsError::Cancelled, undo));
        }
        if let Err(error) = self.is_valid(store) {
            return Err(fail(error, undo));
        }

        for change in &self.changes {
            if cancel.is_cancelled() {
                return Err(fail(NlsError::Cancelled, undo));
            }
            match change.perform(store) {
                Ok(inverse) => undo.changes.insert(0, inverse),
                Err(error) => return Err(fail(error, undo)),
            }
        }
        Ok(undo)
    }
}
