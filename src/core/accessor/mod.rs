//! Accessor classes: the generated classes that resolve keys at runtime.
//!
//! A [`AccessorKind::Lookup`] accessor exposes a static method called with a
//! key string, a [`AccessorKind::Fields`] accessor declares one static field
//! per key that a runtime helper fills in.

mod creator;
mod inspect;
mod modifier;
mod resolver;

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use creator::*;
pub use inspect::*;
pub use modifier::*;
pub use resolver::*;

use super::store::FileStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    /// `Messages.getString("key")`
    #[default]
    Lookup,
    /// `Messages.key`
    Fields,
}

/// Identity of an accessor class: its file and class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle {
    pub path: PathBuf,
    pub name: String,
}

/// A resolved accessor class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorBinding {
    pub handle: TypeHandle,
    /// Resource file base name, relative to the accessor's directory.
    pub bundle_name: String,
    pub kind: AccessorKind,
    /// Declared key fields. Empty for lookup accessors.
    pub key_fields: BTreeSet<String>,
}

impl AccessorBinding {
    /// Path of the resource file backing this accessor.
    pub fn bundle_path(&self) -> PathBuf {
        bundle_path(&self.handle.path, &self.bundle_name)
    }
}

/// `<accessor dir>/<bundle_name>.properties`
pub fn bundle_path(accessor_path: &Path, bundle_name: &str) -> PathBuf {
    let dir = accessor_path.parent().unwrap_or(Path::new(""));
    normalize_path(&dir.join(format!("{}.properties", bundle_name)))
}

/// Resolve `.` and `..` components without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

const MODULE_EXTENSIONS: [&str; 5] = ["ts", "tsx", "js", "jsx", "mjs"];

/// Resolve a relative module specifier imported from `from`.
///
/// Tries the specifier as written, then with each module extension, then as
/// a directory index. Bare package specifiers are not resolved.
pub fn resolve_module_path(store: &dyn FileStore, from: &Path, specifier: &str) -> Option<PathBuf> {
    if !specifier.starts_with('.') {
        return None;
    }
    let base_dir = from.parent().unwrap_or(Path::new(""));
    let resolved = normalize_path(&base_dir.join(specifier));

    if resolved.extension().is_some() && store.exists(&resolved) {
        return Some(resolved);
    }
    for ext in MODULE_EXTENSIONS {
        let with_ext = resolved.with_extension(ext);
        if store.exists(&with_ext) {
            return Some(with_ext);
        }
    }
    for ext in MODULE_EXTENSIONS {
        let index_path = resolved.join(format!("index.{}", ext));
        if store.exists(&index_path) {
            return Some(index_path);
        }
    }
    None
}

/// Module specifier for importing `target` from a file at `from`.
pub fn import_specifier(from: &Path, target: &Path) -> String {
    let parts_of = |path: &Path| -> Vec<String> {
        normalize_path(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect()
    };
    let from_dir = parts_of(from.parent().unwrap_or(Path::new("")));
    let target = parts_of(target);

    let common = from_dir
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();
    let mut parts = if common < from_dir.len() {
        vec!["..".to_string(); from_dir.len() - common]
    } else {
        vec![".".to_string()]
    };
    parts.extend_from_slice(&target[common..]);
    parts.join("/")
}
