use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    AccessorBinding, AccessorKind, TypeHandle, inspect_accessor, normalize_path,
    resolve_module_path,
};
use crate::core::{NlsError, cache::LruCache, scan::ImportBinding, store::FileStore};

const CACHE_CAPACITY: usize = 64;

/// A receiver of accessor calls or field references in a source file.
#[derive(Debug, Clone, Copy)]
pub struct AccessorRef<'a> {
    /// Local name of the receiver.
    pub name: &'a str,
    /// The import binding `name`, if any.
    pub import: Option<&'a ImportBinding>,
    /// The file the reference occurs in.
    pub from: &'a Path,
}

/// Maps receivers in source files to accessor classes.
pub trait AccessorResolver {
    fn resolve(
        &mut self,
        store: &dyn FileStore,
        reference: &AccessorRef<'_>,
    ) -> Result<Option<Arc<AccessorBinding>>, NlsError>;

    /// Binding for the class `name` declared in `path`, if the file exists.
    fn resolve_declaration(
        &mut self,
        store: &dyn FileStore,
        path: &Path,
        name: Option<&str>,
    ) -> Result<Option<Arc<AccessorBinding>>, NlsError>;
}

/// Where the configured accessor lives when a receiver is not imported.
#[derive(Debug, Clone)]
pub struct AccessorDefaults {
    pub name: String,
    pub path: PathBuf,
    pub bundle_name: String,
    pub kind: AccessorKind,
}

/// Resolves receivers by reading and inspecting accessor files.
///
/// Inspected files are cached by path and class name. Parse errors in an
/// accessor file leave the receiver unresolved.
pub struct FileAccessorResolver {
    defaults: AccessorDefaults,
    cache: LruCache<(PathBuf, String), Option<Arc<AccessorBinding>>>,
}

impl FileAccessorResolver {
    pub fn new(defaults: AccessorDefaults) -> Self {
        Self {
            defaults,
            cache: LruCache::new(CACHE_CAPACITY),
        }
    }

    fn load(
        &mut self,
        store: &dyn FileStore,
        path: &Path,
        name: Option<&str>,
    ) -> Result<Option<Arc<AccessorBinding>>, NlsError> {
        let path = normalize_path(path);
        let cache_key = (path.clone(), name.unwrap_or("default").to_string());
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached.clone());
        }

        let binding = match store.read(&path)? {
            None => None,
            Some(text) => match inspect_accessor(&text, &path.to_string_lossy(), name) {
                Ok(Some(class)) => Some(Arc::new(AccessorBinding {
                    handle: TypeHandle {
                        path: path.clone(),
                        name: class.name,
                    },
                    bundle_name: class
                        .bundle_name
                        .unwrap_or_else(|| self.defaults.bundle_name.clone()),
                    kind: class.kind,
                    key_fields: class.fields.into_iter().map(|f| f.name).collect(),
                })),
                Ok(None) => None,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot inspect accessor");
                    None
                }
            },
        };
        debug!(
            path = %path.display(),
            resolved = binding.is_some(),
            "loaded accessor"
        );
        self.cache.insert(cache_key, binding.clone());
        Ok(binding)
    }
}

impl AccessorResolver for FileAccessorResolver {
    fn resolve(
        &mut self,
        store: &dyn FileStore,
        reference: &AccessorRef<'_>,
    ) -> Result<Option<Arc<AccessorBinding>>, NlsError> {
        match reference.import {
            Some(import) => {
                let Some(path) = resolve_module_path(store, reference.from, &import.specifier)
                else {
                    return Ok(None);
                };
                let name = match import.imported.as_str() {
                    "default" | "*" => None,
                    imported => Some(imported),
                };
                self.load(store, &path, name)
            }
            None if reference.name == self.defaults.name => {
                let path = self.defaults.path.clone();
                let name = self.defaults.name.clone();
                self.load(store, &path, Some(&name))
            }
            None => Ok(None),
        }
    }

    fn resolve_declaration(
        &mut self,
        store: &dyn FileStore,
        path: &Path,
        name: Option<&str>,
    ) -> Result<Option<Arc<AccessorBinding>>, NlsError> {
        self.load(store, path, name)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::accessor::*;
    use crate::core::scan::ImportBinding;
    use crate::core::store::MemoryStore;
    use pretty_assertions::assert_eq;

    const LOOKUP: &str = r#"export class Messages {
    static BUNDLE_NAME = "app";
    static getString(key) { return key; }
}
"#;

    fn resolver() -> FileAccessorResolver {
        FileAccessorResolver::new(AccessorDefaults {
            name: "Messages".to_string(),
            path: PathBuf::from("src/Messages.js"),
            bundle_name: "messages".to_string(),
            kind: AccessorKind::Lookup,
        })
    }

    #[test]
    fn test_resolve_configured_accessor() {
        let store = MemoryStore::new().with_file("src/Messages.js", LOOKUP);
        let mut resolver = resolver();
        let reference = AccessorRef {
            name: "Messages",
            import: None,
            from: Path::new("src/App.js"),
        };

        let binding = resolver.resolve(&store, &reference).unwrap().unwrap();
        assert_eq!(binding.handle.path, PathBuf::from("src/Messages.js"));
        assert_eq!(binding.handle.name, "Messages");
        assert_eq!(binding.bundle_path(), PathBuf::from("src/app.properties"));
    }

    #[test]
    fn test_resolve_imported_alias() {
        let store = MemoryStore::new().with_file("src/i18n/Messages.ts", LOOKUP);
        let mut resolver = resolver();
        let import = ImportBinding {
            local: "M".to_string(),
            imported: "Messages".to_string(),
            specifier: "../i18n/Messages.js".to_string(),
        };
        let reference = AccessorRef {
            name: "M",
            import: Some(&import),
            from: Path::new("src/ui/App.ts"),
        };

        let binding = resolver.resolve(&store, &reference).unwrap().unwrap();
        assert_eq!(binding.handle.path, PathBuf::from("src/i18n/Messages.ts"));
    }

    #[test]
    fn test_unknown_receiver_and_missing_file() {
        let store = MemoryStore::new();
        let mut resolver = resolver();
        let other = AccessorRef {
            name: "Other",
            import: None,
            from: Path::new("src/App.js"),
        };
        assert!(resolver.resolve(&store, &other).unwrap().is_none());

        let configured = AccessorRef {
            name: "Messages",
            ..other
        };
        assert!(resolver.resolve(&store, &configured).unwrap().is_none());
    }

    #[test]
    fn test_unparsable_accessor_is_unresolved() {
        let store = MemoryStore::new().with_file("src/Messages.js", "class {{{");
        let mut resolver = resolver();
        let binding = resolver
            .resolve_declaration(&store, Path::new("src/Messages.js"), Some("Messages"))
            .unwrap();
        assert!(binding.is_none());
    }
}
