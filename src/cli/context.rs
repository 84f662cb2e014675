use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{debug, warn};

use super::args::CommonArgs;
use crate::{
    config::{Config, load_config},
    core::{
        accessor::normalize_path,
        file_scanner::scan_files,
        session::{RefactoringSession, SessionOptions},
        store::DiskStore,
    },
};

/// Configuration of one CLI invocation.
///
/// Priority: CLI arguments, then `.nlsrc.json`, then built-in defaults.
pub struct CliContext {
    pub config: Config,
    /// Directory source files are scanned in.
    pub source_dir: PathBuf,
    pub store: DiskStore,
}

impl CliContext {
    pub fn new(common: &CommonArgs) -> Result<Self> {
        let root_dir = common
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let config_result = load_config(&root_dir)?;
        if !config_result.from_file {
            debug!("no .nlsrc.json found, using default configuration");
        }
        let mut config = config_result.config;

        if let Some(name) = &common.accessor_name {
            config.accessor_name = name.clone();
        }
        if let Some(path) = &common.accessor_path {
            config.accessor_path = path.to_string_lossy().to_string();
        }
        if let Some(mode) = common.mode {
            config.mode = mode;
        }
        config.validate()?;

        let mut source_dir = normalize_path(&root_dir.join(&config.source_root));
        if source_dir.as_os_str().is_empty() {
            source_dir = PathBuf::from(".");
        }
        Ok(Self {
            config,
            source_dir,
            store: DiskStore,
        })
    }

    pub fn session_options(&self) -> Result<SessionOptions> {
        self.config.session_options(&self.source_dir)
    }

    /// Open a session on `file`, which must be a file on disk.
    pub fn open(&self, file: &Path) -> Result<RefactoringSession> {
        self.open_with(file, self.session_options()?)
    }

    pub fn open_with(&self, file: &Path, options: SessionOptions) -> Result<RefactoringSession> {
        if !file.is_file() {
            bail!("{} is not a file", file.display());
        }
        Ok(RefactoringSession::open(&self.store, file, options)?)
    }

    /// Source files to check: `files` if given, else every file the config
    /// selects under the source directory.
    pub fn files(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        if !files.is_empty() {
            return files.iter().map(|f| normalize_path(f)).collect();
        }
        let scan = scan_files(
            &self.source_dir,
            &self.config.includes,
            &self.config.ignores,
            self.config.ignore_test_files,
        );
        if scan.skipped_count > 0 {
            warn!(count = scan.skipped_count, "paths skipped due to access errors");
        }
        scan.files.into_iter().map(|f| normalize_path(&f)).collect()
    }
}
