use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{
    accessor::{AccessorKind, normalize_path},
    rewrite::KEY_PLACEHOLDER,
    scan::{DEFAULT_TAG_POSTFIX, DEFAULT_TAG_PREFIX, TagFormat},
    session::SessionOptions,
};

pub const CONFIG_FILE_NAME: &str = ".nlsrc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.test.mjs",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/*.spec.mjs",
    "**/__tests__/**",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_accessor_name")]
    pub accessor_name: String,
    /// Accessor file, relative to the source root.
    #[serde(default = "default_accessor_path")]
    pub accessor_path: String,
    #[serde(default = "default_bundle_name")]
    pub bundle_name: String,
    #[serde(default)]
    pub mode: AccessorKind,
    #[serde(default = "default_substitution_pattern")]
    pub substitution_pattern: String,
    #[serde(default)]
    pub key_prefix: String,
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
    #[serde(default = "default_tag_postfix")]
    pub tag_postfix: String,
    /// Module a new accessor imports its runtime helper from.
    #[serde(default)]
    pub runtime_import: Option<String>,
    #[serde(default = "default_indent")]
    pub indent: String,
    #[serde(default = "default_add_import")]
    pub add_import: bool,
}

fn default_ignores() -> Vec<String> {
    ["**/node_modules/**", "**/dist/**"].map(String::from).to_vec()
}

fn default_ignore_test_files() -> bool {
    true
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_accessor_name() -> String {
    "Messages".to_string()
}

fn default_accessor_path() -> String {
    "src/Messages.js".to_string()
}

fn default_bundle_name() -> String {
    "messages".to_string()
}

fn default_substitution_pattern() -> String {
    format!("getString({})", KEY_PLACEHOLDER)
}

fn default_tag_prefix() -> String {
    DEFAULT_TAG_PREFIX.to_string()
}

fn default_tag_postfix() -> String {
    DEFAULT_TAG_POSTFIX.to_string()
}

fn default_indent() -> String {
    "    ".to_string()
}

fn default_add_import() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            ignore_test_files: default_ignore_test_files(),
            source_root: default_source_root(),
            accessor_name: default_accessor_name(),
            accessor_path: default_accessor_path(),
            bundle_name: default_bundle_name(),
            mode: AccessorKind::default(),
            substitution_pattern: default_substitution_pattern(),
            key_prefix: String::new(),
            tag_prefix: default_tag_prefix(),
            tag_postfix: default_tag_postfix(),
            runtime_import: None,
            indent: default_indent(),
            add_import: default_add_import(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Glob patterns must parse, the accessor name must be set and the tag
    /// prefix may not be empty.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }
        if self.accessor_name.trim().is_empty() {
            bail!("'accessorName' must not be empty");
        }
        if self.tag_prefix.is_empty() {
            bail!("'tagPrefix' must not be empty");
        }
        self.tag_format()?;
        Ok(())
    }

    pub fn tag_format(&self) -> Result<TagFormat> {
        TagFormat::new(&self.tag_prefix, &self.tag_postfix).with_context(|| {
            format!(
                "Invalid tag format '{}n{}'",
                self.tag_prefix, self.tag_postfix
            )
        })
    }

    /// Session options with the accessor path resolved against `source_root`.
    pub fn session_options(&self, source_root: &Path) -> Result<SessionOptions> {
        Ok(SessionOptions {
            accessor_name: self.accessor_name.clone(),
            accessor_path: normalize_path(&source_root.join(&self.accessor_path)),
            bundle_name: self.bundle_name.clone(),
            kind: self.mode,
            pattern: self.substitution_pattern.clone(),
            key_prefix: self.key_prefix.clone(),
            tag_format: self.tag_format()?,
            runtime_import: self.runtime_import.clone(),
            indent: self.indent.clone(),
            add_import: self.add_import,
        })
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.includes.is_empty());
        assert_eq!(config.accessor_name, "Messages");
        assert_eq!(config.mode, AccessorKind::Lookup);
        assert_eq!(config.substitution_pattern, "getString(${key})");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{
              "includes": ["src"],
              "mode": "fields",
              "keyPrefix": "app.",
              "runtimeImport": "nls-runtime"
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.includes, vec!["src"]);
        assert_eq!(config.mode, AccessorKind::Fields);
        assert_eq!(config.key_prefix, "app.");
        assert_eq!(config.runtime_import.as_deref(), Some("nls-runtime"));
        assert_eq!(config.ignores, default_ignores());
        assert_eq!(config.bundle_name, "messages");
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("ui");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        assert_eq!(find_config_file(&sub_dir), Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(find_config_file(dir.path()).is_none());

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.accessor_path, "src/Messages.js");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "accessorName": "Strings", "tagPrefix": "$NLS-" }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.accessor_name, "Strings");
        assert_eq!(result.config.tag_format().unwrap().render(2), "//$NLS-2$");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("ignores"));

        let config = Config {
            includes: vec!["src/**/[invalid".to_string()],
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("includes"));

        let config = Config {
            includes: vec!["app/[locale]".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = Config {
            accessor_name: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "ignores": ["[invalid"] }"#).unwrap();
        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_session_options() {
        let config = Config {
            mode: AccessorKind::Fields,
            ..Default::default()
        };
        let options = config.session_options(Path::new("web")).unwrap();
        assert_eq!(options.accessor_path, PathBuf::from("web/src/Messages.js"));
        assert_eq!(options.kind, AccessorKind::Fields);
        assert_eq!(options.tag_format, TagFormat::default());
    }

    #[test]
    fn test_default_config_json_uses_camel_case() {
        let json = default_config_json().unwrap();
        assert!(json.contains("\"accessorName\": \"Messages\""));
        assert!(json.contains("\"substitutionPattern\": \"getString(${key})\""));
        assert!(json.contains("\"addImport\": true"));
    }
}
