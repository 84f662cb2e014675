//! Initial substitution states derived from a scan.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::substitution::{AccessorReference, Substitution, SubstitutionState};
use crate::core::{
    accessor::{AccessorBinding, AccessorKind},
    properties::PropertyFile,
    scan::{LiteralKind, ScanResult},
};

/// Resolved receivers and loaded resource files of one source file.
#[derive(Debug, Default)]
pub struct Hints {
    /// Receiver name to accessor binding.
    bindings: HashMap<String, Arc<AccessorBinding>>,
    /// Resource file path to its contents.
    bundles: HashMap<PathBuf, PropertyFile>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binding(&mut self, receiver: impl Into<String>, binding: Arc<AccessorBinding>) {
        self.bindings.insert(receiver.into(), binding);
    }

    pub fn add_bundle(&mut self, path: PathBuf, file: PropertyFile) {
        self.bundles.insert(path, file);
    }

    pub fn binding(&self, receiver: &str) -> Option<&Arc<AccessorBinding>> {
        self.bindings.get(receiver)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Arc<AccessorBinding>> {
        self.bindings.values()
    }

    /// Receiver names with their bindings.
    pub fn receivers(&self) -> impl Iterator<Item = (&str, &Arc<AccessorBinding>)> {
        self.bindings.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    pub fn bundle(&self, binding: &AccessorBinding) -> Option<&PropertyFile> {
        self.bundles.get(&binding.bundle_path())
    }

    fn value(&self, binding: &AccessorBinding, key: &str) -> Option<String> {
        self.bundle(binding)
            .and_then(|file| file.get(key))
            .map(str::to_string)
    }
}

/// Turn every scanned element into a substitution, numbered in scan order.
///
/// - the key literal of a call on a resolved lookup accessor is externalized,
///   with its value taken from the accessor's resource file;
/// - a field of a resolved fields accessor declaring that field is
///   externalized, other field references are skipped;
/// - any other literal is ignored when tagged, internalized otherwise.
pub fn build_substitutions(scan: &ScanResult, hints: &Hints) -> Vec<Substitution> {
    let mut subs = Vec::new();
    for literal in scan.literals() {
        let id = subs.len();
        match &literal.kind {
            LiteralKind::String { .. } => {
                let call = scan.call_for(literal.region).and_then(|call| {
                    hints
                        .binding(&call.receiver)
                        .filter(|b| b.kind == AccessorKind::Lookup)
                        .map(|binding| (call, binding))
                });
                if let Some((call, binding)) = call {
                    subs.push(Substitution::new(
                        id,
                        SubstitutionState::Externalized,
                        Some(literal.value.clone()),
                        hints.value(binding, &literal.value),
                        literal.clone(),
                        Some(AccessorReference {
                            binding: binding.clone(),
                            region: call.call,
                            receiver: call.receiver_region,
                        }),
                    ));
                    continue;
                }

                let state = if literal.tag.is_some() {
                    SubstitutionState::Ignored
                } else {
                    SubstitutionState::Internalized
                };
                subs.push(Substitution::new(
                    id,
                    state,
                    None,
                    Some(literal.value.clone()),
                    literal.clone(),
                    None,
                ));
            }
            LiteralKind::AccessorField {
                receiver,
                receiver_region,
                reference,
            } => {
                let Some(binding) = hints.binding(receiver).filter(|b| {
                    b.kind == AccessorKind::Fields && b.key_fields.contains(&literal.value)
                }) else {
                    continue;
                };
                subs.push(Substitution::new(
                    id,
                    SubstitutionState::Externalized,
                    Some(literal.value.clone()),
                    hints.value(binding, &literal.value),
                    literal.clone(),
                    Some(AccessorReference {
                        binding: binding.clone(),
                        region: *reference,
                        receiver: *receiver_region,
                    }),
                ));
            }
        }
    }
    subs
}
