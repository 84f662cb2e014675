//! One refactoring of one source file.
//!
//! `Scanning -> Modeled -> Validated -> ChangeBuilt -> Performed | Cancelled`
//!
//! All files are read in [`RefactoringSession::open`] and written only in
//! [`RefactoringSession::perform`]. Editing a substitution moves the session
//! back to `Modeled`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use super::{
    NlsError,
    accessor::{
        AccessorBinding, AccessorDefaults, AccessorKind, AccessorRef, AccessorResolver,
        AccessorTemplate, FileAccessorResolver, TypeHandle, accessor_field_edits, accessor_keys,
        create_accessor, import_specifier, inspect_accessor, normalize_path,
    },
    change::{CompositeChange, CreateFileChange, EditFileChange, PerformFailure},
    model::{
        Hints, Substitution, SubstitutionState, build_substitutions, generate_key,
        initially_owned,
    },
    properties::PropertyFile,
    rewrite::{
        KEY_PLACEHOLDER, PropertiesUpdate, SourceRewriteOptions, import_edit, properties_update,
        source_edits,
    },
    scan::{LiteralKind, ScanOptions, ScanResult, TagFormat, scan},
    store::FileStore,
};
use crate::status::{RefactoringStatus, StatusLevel};
use crate::utils::detect_line_delimiter;

/// Characters a key may not contain.
const BANNED_KEY_CHARS: [char; 7] = [' ', ':', '"', '\\', '\'', '?', '='];

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Scanning,
    Modeled,
    Validated,
    ChangeBuilt,
    Performed,
    Cancelled,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Scanning => "scanning",
            SessionState::Modeled => "modeled",
            SessionState::Validated => "validated",
            SessionState::ChangeBuilt => "built",
            SessionState::Performed => "performed",
            SessionState::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Shared flag to stop a session from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Class name of the accessor new externalizations go to.
    pub accessor_name: String,
    pub accessor_path: PathBuf,
    /// Bundle name used when the accessor does not declare one.
    pub bundle_name: String,
    /// Kind of accessor to create when it does not exist.
    pub kind: AccessorKind,
    pub pattern: String,
    /// Prefix of generated keys.
    pub key_prefix: String,
    pub tag_format: TagFormat,
    pub runtime_import: Option<String>,
    pub indent: String,
    /// Import the accessor into the source file when it is not imported yet.
    pub add_import: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            accessor_name: "Messages".to_string(),
            accessor_path: PathBuf::from("Messages.js"),
            bundle_name: "messages".to_string(),
            kind: AccessorKind::Lookup,
            pattern: "getString(${key})".to_string(),
            key_prefix: String::new(),
            tag_format: TagFormat::default(),
            runtime_import: None,
            indent: "    ".to_string(),
            add_import: true,
        }
    }
}

impl SessionOptions {
    fn accessor_defaults(&self) -> AccessorDefaults {
        AccessorDefaults {
            name: self.accessor_name.clone(),
            path: self.accessor_path.clone(),
            bundle_name: self.bundle_name.clone(),
            kind: self.kind,
        }
    }
}

/// The accessor new externalizations are bound to.
#[derive(Debug, Clone)]
struct Target {
    binding: Arc<AccessorBinding>,
    exists: bool,
    /// Name the source file refers to the accessor by.
    receiver: String,
    /// The source file already references the accessor.
    referenced: bool,
}

pub struct RefactoringSession {
    source_path: PathBuf,
    source: String,
    scan: ScanResult,
    options: SessionOptions,
    subs: Vec<Substitution>,
    target: Target,
    /// Resource file contents by path, `None` if the file does not exist.
    bundles: HashMap<PathBuf, Option<PropertyFile>>,
    /// Contents of existing fields accessors, by path.
    accessor_sources: HashMap<PathBuf, String>,
    state: SessionState,
    status: RefactoringStatus,
    change: Option<CompositeChange>,
    cancel: CancellationToken,
}

impl RefactoringSession {
    /// Scan `source_path` and build its substitutions.
    pub fn open(
        store: &dyn FileStore,
        source_path: impl Into<PathBuf>,
        options: SessionOptions,
    ) -> Result<Self, NlsError> {
        let mut resolver = FileAccessorResolver::new(options.accessor_defaults());
        Self::open_with_resolver(store, source_path, options, &mut resolver)
    }

    pub fn open_with_resolver(
        store: &dyn FileStore,
        source_path: impl Into<PathBuf>,
        options: SessionOptions,
        resolver: &mut dyn AccessorResolver,
    ) -> Result<Self, NlsError> {
        let source_path = normalize_path(&source_path.into());
        let source = store
            .read(&source_path)?
            .ok_or_else(|| NlsError::Read {
                path: source_path.clone(),
                source: io::ErrorKind::NotFound.into(),
            })?;

        let scan_options = ScanOptions {
            tag_format: options.tag_format.clone(),
            accessor_name: options.accessor_name.clone(),
        };
        let scan = scan(&source, &source_path.to_string_lossy(), &scan_options)?;

        let mut hints = Hints::new();
        for receiver in receivers(&scan) {
            let reference = AccessorRef {
                name: &receiver,
                import: scan.import_for(&receiver),
                from: &source_path,
            };
            if let Some(binding) = resolver.resolve(store, &reference)? {
                hints.add_binding(receiver, binding);
            }
        }

        let target = resolve_target(store, resolver, &options, &hints)?;

        let mut bindings: Vec<Arc<AccessorBinding>> = hints.bindings().cloned().collect();
        bindings.push(target.binding.clone());

        let mut bundles = HashMap::new();
        let mut accessor_sources = HashMap::new();
        for binding in &bindings {
            let bundle_path = binding.bundle_path();
            if !bundles.contains_key(&bundle_path) {
                let file = store.read(&bundle_path)?.map(|text| PropertyFile::parse(&text));
                if let Some(file) = &file {
                    hints.add_bundle(bundle_path.clone(), file.clone());
                }
                bundles.insert(bundle_path, file);
            }
            let accessor_path = &binding.handle.path;
            if binding.kind == AccessorKind::Fields
                && !accessor_sources.contains_key(accessor_path)
                && let Some(text) = store.read(accessor_path)?
            {
                accessor_sources.insert(accessor_path.clone(), text);
            }
        }

        let subs = build_substitutions(&scan, &hints);
        debug!(
            file = %source_path.display(),
            substitutions = subs.len(),
            accessor = %target.binding.handle.path.display(),
            "opened session"
        );

        Ok(Self {
            source_path,
            source,
            scan,
            options,
            subs,
            target,
            bundles,
            accessor_sources,
            state: SessionState::Modeled,
            status: RefactoringStatus::new(),
            change: None,
            cancel: CancellationToken::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The accessor new externalizations go to.
    pub fn accessor(&self) -> &AccessorBinding {
        &self.target.binding
    }

    pub fn accessor_exists(&self) -> bool {
        self.target.exists
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.subs
    }

    pub fn substitution(&self, id: usize) -> Result<&Substitution, NlsError> {
        self.subs
            .iter()
            .find(|s| s.id == id)
            .ok_or(NlsError::UnknownSubstitution(id))
    }

    /// True if any substitution differs from its initial state.
    pub fn has_changes(&self) -> bool {
        self.subs.iter().any(Substitution::has_any_change)
    }

    /// Status of the last validation.
    pub fn status(&self) -> &RefactoringStatus {
        &self.status
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resource file of the accessor new externalizations go to, if it exists.
    pub fn properties(&self) -> Option<&PropertyFile> {
        self.bundles
            .get(&self.target.binding.bundle_path())
            .and_then(Option::as_ref)
    }

    fn bundle_for(&self, sub: &Substitution) -> Option<&PropertyFile> {
        let binding = sub
            .accessor()
            .map(|a| a.binding.as_ref())
            .unwrap_or(self.target.binding.as_ref());
        self.bundles.get(&binding.bundle_path()).and_then(Option::as_ref)
    }

    /// Keys already present in the target resource file.
    fn bundle_keys(&self) -> Vec<String> {
        self.properties()
            .map(|file| file.entries().iter().map(|e| e.key.clone()).collect())
            .unwrap_or_default()
    }

    fn edit(&mut self, id: usize) -> Result<&mut Substitution, NlsError> {
        self.ensure_open("edit")?;
        self.state = SessionState::Modeled;
        self.change = None;
        self.subs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(NlsError::UnknownSubstitution(id))
    }

    /// Change the state of a substitution. Externalizing one without a key
    /// generates a key.
    pub fn set_state(&mut self, id: usize, state: SubstitutionState) -> Result<(), NlsError> {
        let sub = self.edit(id)?;
        sub.set_state(state);
        let needs_key = state == SubstitutionState::Externalized && sub.key().is_none();
        if needs_key {
            let reserved = self.bundle_keys();
            generate_key(&mut self.subs, id, &self.options.key_prefix, &reserved);
        }
        Ok(())
    }

    pub fn set_key(&mut self, id: usize, key: Option<String>) -> Result<(), NlsError> {
        self.edit(id)?.set_key(key);
        Ok(())
    }

    pub fn set_value(&mut self, id: usize, value: Option<String>) -> Result<(), NlsError> {
        self.edit(id)?.set_value(value);
        Ok(())
    }

    /// Rename the receiver of every reference to the target accessor.
    pub fn rename_accessor(&mut self, name: Option<String>) -> Result<(), NlsError> {
        self.ensure_open("edit")?;
        self.state = SessionState::Modeled;
        self.change = None;
        let handle = self.target.binding.handle.clone();
        for sub in &mut self.subs {
            if sub.accessor().is_some_and(|a| a.binding.handle == handle) {
                sub.set_new_accessor_name(name.clone());
            }
        }
        Ok(())
    }

    /// Check the edited model.
    ///
    /// Only "nothing to do" is fatal; invalid keys are errors, questionable
    /// ones warnings.
    pub fn validate(&mut self) -> Result<&RefactoringStatus, NlsError> {
        self.ensure_open("validate")?;
        let mut status = RefactoringStatus::new();

        if !self.has_changes() {
            status.add_fatal("no substitution has changed");
            self.status = status;
            self.state = SessionState::Validated;
            return Ok(&self.status);
        }

        let uses_pattern = self.subs.iter().any(|s| {
            s.is_externalized()
                && s.has_source_change()
                && self.kind_of(s) == AccessorKind::Lookup
        });
        if uses_pattern {
            validate_pattern(&self.options.pattern, &mut status);
        }

        let mut conflicts: HashSet<&str> = HashSet::new();
        for sub in self.subs.iter().filter(|s| s.is_externalized() && s.has_any_change()) {
            let region = sub.literal().region;
            let Some(key) = sub.key() else {
                status.add_for(StatusLevel::Error, "missing key", sub.id, region);
                continue;
            };
            for (level, message) in key_problems(key, self.kind_of(sub)) {
                status.add_for(level, message, sub.id, region);
            }
            if sub.is_conflicting(&self.subs) && conflicts.insert(key) {
                status.add_for(
                    StatusLevel::Warning,
                    format!("key '{}' is used with different values", key),
                    sub.id,
                    region,
                );
            }
            if sub.has_property_file_change()
                && !initially_owned(&self.subs, key)
                && let Some(existing) = self.bundle_for(sub).and_then(|f| f.get(key))
                && existing != sub.value_or_empty()
            {
                status.add_for(
                    StatusLevel::Warning,
                    format!(
                        "key '{}' already exists in the resource file with value \"{}\"",
                        key, existing
                    ),
                    sub.id,
                    region,
                );
            }
        }

        for sub in self.subs.iter().filter(|s| {
            s.has_state_changed() && s.state() != SubstitutionState::Internalized
        }) {
            let literal = sub.literal();
            let stays_string =
                !sub.is_externalized() || self.kind_of(sub) == AccessorKind::Lookup;
            if stays_string && literal.tag.is_none() && literal.tag_anchor.is_none() {
                status.add_for(
                    StatusLevel::Warning,
                    format!("line {} ends inside JSX text, no tag is added", literal.line),
                    sub.id,
                    literal.region,
                );
            }
        }

        let externalizes_to_target = self.subs.iter().any(|s| {
            s.is_externalized() && s.has_state_changed() && s.accessor().is_none()
        });
        if externalizes_to_target {
            let bundle_path = self.target.binding.bundle_path();
            if self.bundles.get(&bundle_path).is_none_or(Option::is_none) {
                status.add_warning(format!(
                    "resource file {} will be created",
                    bundle_path.display()
                ));
            }
            if !self.target.exists {
                status.add_info(format!(
                    "accessor {} will be created",
                    self.target.binding.handle.path.display()
                ));
            }
        }

        debug!(severity = ?status.severity(), entries = status.entries().len(), "validated");
        self.status = status;
        self.state = SessionState::Validated;
        Ok(&self.status)
    }

    /// Compute the file changes of the validated model, in order: accessor
    /// creation, source edits, resource files, accessor field edits.
    pub fn build_change(&mut self) -> Result<&CompositeChange, NlsError> {
        if self.state != SessionState::Validated && self.state != SessionState::ChangeBuilt {
            return Err(NlsError::InvalidState {
                operation: "build a change for",
                state: self.state,
            });
        }

        let mut change = CompositeChange::new(format!(
            "Externalize strings in {}",
            self.source_path.display()
        ));

        let groups = self.groups();
        let target_handle = &self.target.binding.handle;

        if !self.target.exists
            && let Some(group) = groups.get(target_handle)
            && group.iter().any(|s| s.is_externalized())
        {
            let keys = accessor_keys(group.iter().copied());
            let binding = &self.target.binding;
            let template = AccessorTemplate {
                class_name: &binding.handle.name,
                bundle_name: &binding.bundle_name,
                kind: binding.kind,
                method: lookup_method(&self.options.pattern),
                runtime_import: self.options.runtime_import.as_deref(),
                indent: &self.options.indent,
                delimiter: detect_line_delimiter(&self.source),
                tag_format: &self.options.tag_format,
            };
            change.add(CreateFileChange::new(
                binding.handle.path.clone(),
                create_accessor(&template, keys.keys().copied()),
            ));
        }

        let rewrite = SourceRewriteOptions {
            kind: self.target.binding.kind,
            accessor_name: &self.target.receiver,
            pattern: &self.options.pattern,
            tag_format: &self.options.tag_format,
        };
        let mut edits = source_edits(&self.source, &self.scan, &self.subs, &rewrite);
        if self.needs_import() {
            let statement = format!(
                "import {{ {} }} from \"{}\";",
                self.target.binding.handle.name,
                import_specifier(&self.source_path, &self.target.binding.handle.path)
            );
            edits.push(import_edit(&self.source, &self.scan, &statement));
        }
        if !edits.is_empty() {
            change.add(EditFileChange::new(
                self.source_path.clone(),
                self.source.clone(),
                edits,
            )?);
        }

        for (handle, group) in &groups {
            let Some(binding) = self.binding_for(handle) else {
                continue;
            };
            let bundle_path = binding.bundle_path();
            let file = self.bundles.get(&bundle_path).and_then(Option::as_ref);
            match properties_update(file, group) {
                PropertiesUpdate::Unchanged => {}
                PropertiesUpdate::Create(text) => {
                    change.add(CreateFileChange::new(bundle_path, text));
                }
                PropertiesUpdate::Edit(edits) => {
                    let original = file.map(|f| f.text().to_string()).unwrap_or_default();
                    change.add(EditFileChange::new(bundle_path, original, edits)?);
                }
            }
        }

        for (handle, group) in &groups {
            let Some(binding) = self.binding_for(handle) else {
                continue;
            };
            if binding.kind != AccessorKind::Fields {
                continue;
            }
            let Some(text) = self.accessor_sources.get(&handle.path) else {
                continue;
            };
            let Some(class) =
                inspect_accessor(text, &handle.path.to_string_lossy(), Some(&handle.name))?
            else {
                continue;
            };
            let edits = accessor_field_edits(text, &class, group, &self.options.indent);
            if !edits.is_empty() {
                change.add(EditFileChange::new(handle.path.clone(), text.clone(), edits)?);
            }
        }

        debug!(files = change.len(), "built change");
        self.state = SessionState::ChangeBuilt;
        Ok(self.change.insert(change))
    }

    /// Write the built change. Returns the change that undoes it.
    pub fn perform(&mut self, store: &mut dyn FileStore) -> Result<CompositeChange, PerformFailure> {
        let change = match (&self.change, self.state) {
            (Some(change), SessionState::ChangeBuilt) => change,
            _ => {
                return Err(PerformFailure {
                    error: NlsError::InvalidState {
                        operation: "perform",
                        state: self.state,
                    },
                    undo: CompositeChange::default(),
                });
            }
        };

        match change.perform(store, &self.cancel) {
            Ok(undo) => {
                self.state = SessionState::Performed;
                Ok(undo)
            }
            Err(failure) => {
                if matches!(failure.error, NlsError::Cancelled) {
                    self.state = SessionState::Cancelled;
                }
                Err(failure)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.state = SessionState::Cancelled;
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), NlsError> {
        match self.state {
            SessionState::Performed | SessionState::Cancelled => Err(NlsError::InvalidState {
                operation,
                state: self.state,
            }),
            _ if self.cancel.is_cancelled() => Err(NlsError::Cancelled),
            _ => Ok(()),
        }
    }

    fn kind_of(&self, sub: &Substitution) -> AccessorKind {
        sub.accessor()
            .map(|a| a.binding.kind)
            .unwrap_or(self.target.binding.kind)
    }

    fn binding_for(&self, handle: &TypeHandle) -> Option<&AccessorBinding> {
        if *handle == self.target.binding.handle {
            return Some(&self.target.binding);
        }
        self.subs
            .iter()
            .filter_map(|s| s.accessor())
            .map(|a| a.binding.as_ref())
            .find(|b| b.handle == *handle)
    }

    /// Substitutions by the accessor they belong to. Literals that are not
    /// externalized yet belong to the target accessor.
    fn groups(&self) -> BTreeMap<TypeHandle, Vec<&Substitution>> {
        let mut groups: BTreeMap<TypeHandle, Vec<&Substitution>> = BTreeMap::new();
        for sub in &self.subs {
            let handle = sub
                .accessor()
                .map(|a| a.binding.handle.clone())
                .unwrap_or_else(|| self.target.binding.handle.clone());
            groups.entry(handle).or_default().push(sub);
        }
        groups
    }

    fn needs_import(&self) -> bool {
        let adds_reference = self.subs.iter().any(|s| {
            s.is_externalized() && s.has_state_changed() && s.accessor().is_none()
        });
        self.options.add_import
            && adds_reference
            && !self.target.referenced
            && self.scan.import_for(&self.target.receiver).is_none()
            && self.target.binding.handle.path != self.source_path
    }
}

/// Receivers of accessor calls and field references in the scan.
fn receivers(scan: &ScanResult) -> Vec<String> {
    let mut names: Vec<String> = scan.calls().iter().map(|c| c.receiver.clone()).collect();
    names.extend(scan.literals().filter_map(|l| match &l.kind {
        LiteralKind::AccessorField { receiver, .. } => Some(receiver.clone()),
        LiteralKind::String { .. } => None,
    }));
    names.sort();
    names.dedup();
    names
}

fn resolve_target(
    store: &dyn FileStore,
    resolver: &mut dyn AccessorResolver,
    options: &SessionOptions,
    hints: &Hints,
) -> Result<Target, NlsError> {
    let declared = resolver.resolve_declaration(
        store,
        &options.accessor_path,
        Some(&options.accessor_name),
    )?;
    let exists = declared.is_some();
    let binding = declared.unwrap_or_else(|| {
        Arc::new(AccessorBinding {
            handle: TypeHandle {
                path: normalize_path(&options.accessor_path),
                name: options.accessor_name.clone(),
            },
            bundle_name: options.bundle_name.clone(),
            kind: options.kind,
            key_fields: Default::default(),
        })
    });

    let (receiver, referenced) = match hint_receiver(hints, &binding.handle, &options.accessor_name)
    {
        Some(name) => (name, true),
        None => (options.accessor_name.clone(), false),
    };
    Ok(Target {
        binding,
        exists,
        receiver,
        referenced,
    })
}

/// Name the source already uses for `handle`, preferring `preferred`.
fn hint_receiver(hints: &Hints, handle: &TypeHandle, preferred: &str) -> Option<String> {
    let names: Vec<&str> = hints
        .receivers()
        .filter(|(_, b)| b.handle == *handle)
        .map(|(name, _)| name)
        .collect();
    if names.contains(&preferred) {
        return Some(preferred.to_string());
    }
    names.into_iter().min().map(str::to_string)
}

/// Method name of a lookup pattern: the text before `(`.
fn lookup_method(pattern: &str) -> &str {
    let name = pattern.split('(').next().unwrap_or_default().trim();
    if name.is_empty() { "getString" } else { name }
}

fn validate_pattern(pattern: &str, status: &mut RefactoringStatus) {
    if pattern.trim().is_empty() {
        status.add_error("substitution pattern is empty");
        return;
    }
    match pattern.matches(KEY_PLACEHOLDER).count() {
        0 => status.add_warning(format!(
            "substitution pattern does not contain {}",
            KEY_PLACEHOLDER
        )),
        1 => {}
        _ => status.add_warning(format!(
            "substitution pattern contains {} more than once",
            KEY_PLACEHOLDER
        )),
    }
}

/// Problems with a key, by severity.
pub fn key_problems(key: &str, kind: AccessorKind) -> Vec<(StatusLevel, String)> {
    let mut problems = Vec::new();
    if key.is_empty() {
        problems.push((StatusLevel::Error, "key is empty".to_string()));
        return problems;
    }
    if let Some(c) = key.chars().find(|c| BANNED_KEY_CHARS.contains(c)) {
        problems.push((
            StatusLevel::Error,
            format!("key '{}' contains invalid character {:?}", key, c),
        ));
    }
    if kind == AccessorKind::Fields && !IDENTIFIER_REGEX.is_match(key) {
        problems.push((
            StatusLevel::Error,
            format!("key '{}' is not a valid field name", key),
        ));
    }
    if key.starts_with(['#', '!']) {
        problems.push((
            StatusLevel::Warning,
            format!("key '{}' starts with a comment character", key),
        ));
    }
    problems
}
