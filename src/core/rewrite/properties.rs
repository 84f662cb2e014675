//! Resource file edits.

use std::collections::BTreeSet;

use crate::core::{
    edit::TextEdit,
    model::{Substitution, initially_owned, owner, touched_keys},
    properties::PropertyFile,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesUpdate {
    Unchanged,
    /// Edits against the existing file.
    Edit(Vec<TextEdit>),
    /// Contents of a file that does not exist yet.
    Create(String),
}

/// Key-level diff of `subs` against the resource file.
///
/// For each key touched by a property change, the owner is the externalized
/// substitution with the lowest id. A key with an owner is inserted or its
/// value replaced; a key without one is removed if it was externalized
/// before. A renamed key is rewritten in place, keeping its comments. The
/// value of an entry this file did not own is never replaced.
pub fn properties_update(file: Option<&PropertyFile>, subs: &[&Substitution]) -> PropertiesUpdate {
    let touched = touched_keys(subs.iter().copied(), Substitution::has_property_file_change);
    if touched.is_empty() {
        return PropertiesUpdate::Unchanged;
    }

    let Some(file) = file else {
        let pairs: Vec<(String, String)> = touched
            .iter()
            .filter_map(|key| {
                owner(subs.iter().copied(), key)
                    .map(|o| (key.clone(), o.value_or_empty().to_string()))
            })
            .collect();
        if pairs.is_empty() {
            return PropertiesUpdate::Unchanged;
        }
        return PropertiesUpdate::Create(PropertyFile::render(&pairs, "\n"));
    };

    let mut edits = file.edits();
    let mut renamed: BTreeSet<&str> = BTreeSet::new();
    for (old, new, value) in renames(file, subs) {
        if renamed.contains(old) || renamed.contains(new) {
            continue;
        }
        edits.replace(old, new, value);
        renamed.extend([old, new]);
    }

    for key in touched.iter().filter(|k| !renamed.contains(k.as_str())) {
        match (owner(subs.iter().copied(), key), file.entry(key)) {
            (Some(owner), None) => edits.insert(key, owner.value_or_empty()),
            (Some(owner), Some(entry)) => {
                if let Some(value) = owner.value()
                    && value != entry.value
                    && initially_owned(subs.iter().copied(), key)
                {
                    edits.replace(key, key, value);
                }
            }
            (None, Some(_)) if initially_owned(subs.iter().copied(), key) => {
                edits.remove(key);
            }
            (None, _) => {}
        }
    }

    let edits = edits.finish();
    if edits.is_empty() {
        PropertiesUpdate::Unchanged
    } else {
        PropertiesUpdate::Edit(edits)
    }
}

/// Key renames that can rewrite an entry in place: the old key loses its
/// last user and the new key has no entry yet. Yields `(old, new, value)`.
fn renames<'a>(
    file: &PropertyFile,
    subs: &[&'a Substitution],
) -> Vec<(&'a str, &'a str, &'a str)> {
    subs.iter()
        .copied()
        .filter(|s| s.is_key_rename() && s.was_externalized() && s.is_externalized())
        .filter_map(|s| Some((s.id, s.initial_key()?, s.key()?, s.value_or_empty())))
        .filter(|(id, old, new, _)| {
            file.entry(old).is_some()
                && file.entry(new).is_none()
                && owner(subs.iter().copied(), old).is_none()
                && owner(subs.iter().copied(), new).is_some_and(|o| o.id == *id)
        })
        .map(|(_, old, new, value)| (old, new, value))
        .collect()
}
