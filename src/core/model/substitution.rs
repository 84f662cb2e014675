use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::accessor::AccessorBinding;
use crate::core::edit::Region;
use crate::core::scan::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionState {
    /// The value lives in the resource file and is referenced by key.
    Externalized,
    /// A tagged literal, excluded from externalization.
    Ignored,
    /// A plain literal.
    Internalized,
}

impl fmt::Display for SubstitutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstitutionState::Externalized => write!(f, "externalized"),
            SubstitutionState::Ignored => write!(f, "ignored"),
            SubstitutionState::Internalized => write!(f, "internalized"),
        }
    }
}

/// A source reference to an accessor: a lookup call or a field access.
#[derive(Debug, Clone)]
pub struct AccessorReference {
    pub binding: Arc<AccessorBinding>,
    /// The whole reference expression.
    pub region: Region,
    /// The receiver identifier.
    pub receiver: Region,
}

impl PartialEq for AccessorReference {
    fn eq(&self, other: &Self) -> bool {
        self.binding.handle == other.binding.handle
    }
}

impl Eq for AccessorReference {}

/// One literal of the source and what should happen to it.
///
/// The `initial_*` fields hold the state found by the scanner and are never
/// changed; the diff predicates compare them with the current fields.
#[derive(Debug, Clone)]
pub struct Substitution {
    /// Scan order. Among externalized substitutions sharing a key, the one
    /// with the lowest id owns the resource entry and accessor field.
    pub id: usize,
    state: SubstitutionState,
    initial_state: SubstitutionState,
    key: Option<String>,
    initial_key: Option<String>,
    value: Option<String>,
    initial_value: Option<String>,
    literal: Literal,
    accessor: Option<AccessorReference>,
    new_accessor_name: Option<String>,
}

impl Substitution {
    pub fn new(
        id: usize,
        state: SubstitutionState,
        key: Option<String>,
        value: Option<String>,
        literal: Literal,
        accessor: Option<AccessorReference>,
    ) -> Self {
        Self {
            id,
            state,
            initial_state: state,
            initial_key: key.clone(),
            key,
            initial_value: value.clone(),
            value,
            literal,
            accessor,
            new_accessor_name: None,
        }
    }

    pub fn state(&self) -> SubstitutionState {
        self.state
    }

    pub fn initial_state(&self) -> SubstitutionState {
        self.initial_state
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn initial_key(&self) -> Option<&str> {
        self.initial_key.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn initial_value(&self) -> Option<&str> {
        self.initial_value.as_deref()
    }

    /// The value, or an empty string if it is unknown.
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    pub fn accessor(&self) -> Option<&AccessorReference> {
        self.accessor.as_ref()
    }

    pub fn new_accessor_name(&self) -> Option<&str> {
        self.new_accessor_name.as_deref()
    }

    pub fn set_state(&mut self, state: SubstitutionState) {
        self.state = state;
    }

    pub fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    pub fn set_new_accessor_name(&mut self, name: Option<String>) {
        self.new_accessor_name = name;
    }

    pub fn is_externalized(&self) -> bool {
        self.state == SubstitutionState::Externalized
    }

    pub fn was_externalized(&self) -> bool {
        self.initial_state == SubstitutionState::Externalized
    }

    pub fn has_state_changed(&self) -> bool {
        self.state != self.initial_state
    }

    pub fn is_key_rename(&self) -> bool {
        self.initial_key.is_some() && self.initial_key != self.key
    }

    pub fn is_value_rename(&self) -> bool {
        self.initial_value.is_some() && self.initial_value != self.value
    }

    pub fn is_accessor_rename(&self) -> bool {
        match (&self.accessor, &self.new_accessor_name) {
            (Some(reference), Some(name)) => reference.binding.handle.name != *name,
            _ => false,
        }
    }

    pub fn has_source_change(&self) -> bool {
        if self.has_state_changed() {
            return true;
        }
        self.is_externalized()
            && (self.initial_key.is_none() || self.is_key_rename() || self.is_accessor_rename())
    }

    pub fn has_property_file_change(&self) -> bool {
        if !self.was_externalized() && !self.is_externalized() {
            return false;
        }
        if self.has_state_changed() {
            return true;
        }
        self.is_externalized()
            && (self.initial_value.is_none() || self.is_value_rename() || self.is_key_rename())
    }

    pub fn has_accessor_class_change(&self) -> bool {
        if !self.was_externalized() && !self.is_externalized() {
            return false;
        }
        self.has_state_changed() || self.is_key_rename()
    }

    pub fn has_any_change(&self) -> bool {
        self.has_source_change() || self.has_property_file_change() || self.has_accessor_class_change()
    }

    /// True if another externalized substitution uses the same key for a
    /// different value.
    pub fn is_conflicting(&self, all: &[Substitution]) -> bool {
        if !self.is_externalized() {
            return false;
        }
        all.iter().any(|other| {
            other.id != self.id
                && other.is_externalized()
                && other.key == self.key
                && other.value_or_empty() != self.value_or_empty()
        })
    }
}

/// Next free numeric key given the keys of all other externalized
/// substitutions and the `reserved` keys already in the resource file.
///
/// Keys are compared with `prefix` stripped; non-numeric keys are ignored.
/// Yields `0` if there is no numeric key, `min - 1` if the smallest is
/// positive, and `max + 1` otherwise.
pub fn next_key(
    subs: &[Substitution],
    exclude_id: usize,
    prefix: &str,
    reserved: &[String],
) -> String {
    let numbers: Vec<i64> = subs
        .iter()
        .filter(|s| s.id != exclude_id && s.is_externalized())
        .filter_map(|s| s.key())
        .chain(reserved.iter().map(String::as_str))
        .filter_map(|key| key.strip_prefix(prefix))
        .filter_map(|n| n.parse::<i64>().ok())
        .collect();

    let next = match (numbers.iter().min(), numbers.iter().max()) {
        (Some(&min), _) if min > 0 => min - 1,
        (_, Some(&max)) => max + 1,
        _ => 0,
    };
    format!("{}{}", prefix, next)
}

/// Assign a key to `id` if it is externalized and has none.
pub fn generate_key(subs: &mut [Substitution], id: usize, prefix: &str, reserved: &[String]) {
    let key = next_key(subs, id, prefix, reserved);
    if let Some(sub) = subs.iter_mut().find(|s| s.id == id)
        && sub.is_externalized()
        && sub.key.is_none()
    {
        sub.key = Some(key);
    }
}

/// Assign keys, in id order, to all newly externalized substitutions without one.
pub fn generate_keys(subs: &mut [Substitution], prefix: &str, reserved: &[String]) {
    let ids: Vec<usize> = subs
        .iter()
        .filter(|s| s.is_externalized() && s.has_state_changed() && s.key.is_none())
        .map(|s| s.id)
        .collect();
    for id in ids {
        generate_key(subs, id, prefix, reserved);
    }
}

/// The substitution owning `key`: the externalized one with the lowest id.
pub fn owner<'a>(
    subs: impl IntoIterator<Item = &'a Substitution>,
    key: &str,
) -> Option<&'a Substitution> {
    subs.into_iter()
        .filter(|s| s.is_externalized() && s.key() == Some(key))
        .min_by_key(|s| s.id)
}

/// True if some substitution was externalized with `key` before any edits.
pub fn initially_owned<'a>(subs: impl IntoIterator<Item = &'a Substitution>, key: &str) -> bool {
    subs.into_iter()
        .any(|s| s.was_externalized() && s.initial_key() == Some(key))
}

/// Keys, old and new, of the substitutions matching `changed`.
pub fn touched_keys<'a>(
    subs: impl IntoIterator<Item = &'a Substitution>,
    changed: impl Fn(&Substitution) -> bool,
) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for sub in subs.into_iter().filter(|s| changed(*s)) {
        if sub.was_externalized()
            && let Some(key) = sub.initial_key()
        {
            keys.insert(key.to_string());
        }
        if sub.is_externalized()
            && let Some(key) = sub.key()
        {
            keys.insert(key.to_string());
        }
    }
    keys
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::core::edit::Region;
    use crate::core::model::substitution::*;
    use crate::core::scan::{Literal, LiteralKind};
    use SubstitutionState::*;

    pub(crate) fn literal(value: &str) -> Literal {
        Literal {
            kind: LiteralKind::String { quote: '"' },
            value: value.to_string(),
            region: Region::new(0, value.len() + 2),
            line: 1,
            index: 0,
            tag: None,
            tag_anchor: Some(value.len() + 2),
        }
    }

    pub(crate) fn sub(id: usize, state: SubstitutionState, key: Option<&str>, value: &str) -> Substitution {
        Substitution::new(
            id,
            state,
            key.map(str::to_string),
            Some(value.to_string()),
            literal(value),
            None,
        )
    }

    fn externalized(keys: &[&str]) -> Vec<Substitution> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| sub(i, Externalized, Some(k), "v"))
            .collect()
    }

    #[test]
    fn test_next_key() {
        assert_eq!(next_key(&externalized(&["2", "5", "7"]), 99, "", &[]), "1");
        assert_eq!(next_key(&externalized(&[]), 99, "", &[]), "0");
        assert_eq!(next_key(&externalized(&["0", "1"]), 99, "", &[]), "2");
        assert_eq!(next_key(&externalized(&["title", "3"]), 99, "", &[]), "2");
        assert_eq!(
            next_key(&externalized(&["App.0", "App.4"]), 99, "App.", &[]),
            "App.5"
        );
    }

    #[test]
    fn test_next_key_skips_resource_file_keys() {
        let reserved = vec!["0".to_string(), "title".to_string()];
        assert_eq!(next_key(&externalized(&[]), 99, "", &reserved), "1");
        assert_eq!(next_key(&externalized(&["4"]), 99, "", &reserved), "5");

        let reserved = vec!["App.3".to_string(), "3".to_string()];
        assert_eq!(next_key(&externalized(&[]), 99, "App.", &reserved), "App.2");
    }

    #[test]
    fn test_generate_keys_in_id_order() {
        let mut subs = vec![
            sub(0, Internalized, None, "a"),
            sub(1, Externalized, Some("3"), "b"),
            sub(2, Internalized, None, "c"),
        ];
        subs[0].set_state(Externalized);
        subs[2].set_state(Externalized);
        generate_keys(&mut subs, "", &[]);
        assert_eq!(subs[0].key(), Some("2"));
        assert_eq!(subs[2].key(), Some("1"));
        assert_eq!(subs[1].key(), Some("3"));
    }

    #[test]
    fn test_predicates_for_new_externalization() {
        let mut s = sub(0, Internalized, None, "Hello");
        assert!(!s.has_any_change());

        s.set_state(Externalized);
        s.set_key(Some("greeting".to_string()));
        assert!(s.has_state_changed());
        assert!(s.has_source_change());
        assert!(s.has_property_file_change());
        assert!(s.has_accessor_class_change());
        assert!(!s.is_key_rename());
    }

    #[test]
    fn test_predicates_for_key_rename() {
        let mut s = sub(0, Externalized, Some("old"), "v");
        s.set_key(Some("new".to_string()));
        assert!(s.is_key_rename());
        assert!(s.has_source_change());
        assert!(s.has_property_file_change());
        assert!(s.has_accessor_class_change());
    }

    #[test]
    fn test_predicates_for_value_edit() {
        let mut s = sub(0, Externalized, Some("k"), "v");
        s.set_value(Some("w".to_string()));
        assert!(s.is_value_rename());
        assert!(!s.has_source_change());
        assert!(s.has_property_file_change());
        assert!(!s.has_accessor_class_change());
    }

    #[test]
    fn test_predicates_between_inline_states() {
        let mut s = sub(0, Internalized, None, "v");
        s.set_state(Ignored);
        assert!(s.has_source_change());
        assert!(!s.has_property_file_change());
        assert!(!s.has_accessor_class_change());
    }

    #[test]
    fn test_missing_value_needs_property_change() {
        let s = Substitution::new(0, Externalized, Some("k".into()), None, literal("k"), None);
        assert!(s.has_property_file_change());
        assert!(!s.has_source_change());
    }

    #[test]
    fn test_conflicts() {
        let subs = vec![
            sub(0, Externalized, Some("k"), "one"),
            sub(1, Externalized, Some("k"), "two"),
            sub(2, Externalized, Some("j"), "one"),
        ];
        assert!(subs[0].is_conflicting(&subs));
        assert!(subs[1].is_conflicting(&subs));
        assert!(!subs[2].is_conflicting(&subs));

        let same = vec![
            sub(0, Externalized, Some("k"), "one"),
            sub(1, Externalized, Some("k"), "one"),
        ];
        assert!(!same[0].is_conflicting(&same));
    }

    #[test]
    fn test_owner_is_lowest_id() {
        let mut subs = vec![
            sub(3, Externalized, Some("k"), "v"),
            sub(1, Externalized, Some("k"), "v"),
        ];
        assert_eq!(owner(&subs, "k").map(|s| s.id), Some(1));
        subs[1].set_state(Internalized);
        assert_eq!(owner(&subs, "k").map(|s| s.id), Some(3));
        assert!(initially_owned(&subs, "k"));
    }
}
