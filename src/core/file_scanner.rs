use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::TEST_FILE_PATTERNS;

const SOURCE_EXTENSIONS: [&str; 5] = ["ts", "tsx", "js", "jsx", "mjs"];

/// Patterns without `*` or `?` are literal paths, so `app/[id]` needs no escaping.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Source files found under the include paths, sorted.
pub struct FileScan {
    pub files: BTreeSet<PathBuf>,
    pub skipped_count: usize,
}

pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    ignore_test_files: bool,
) -> FileScan {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => warn!(pattern = %p, error = %e, "invalid ignore pattern"),
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    if ignore_test_files {
        glob_patterns.extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
    }

    let dirs_to_scan: Vec<PathBuf> = if includes.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            let path = base_dir.join(inc);
            if is_glob_pattern(inc) {
                match glob(&path.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|e| e.is_dir())),
                    Err(e) => warn!(pattern = %inc, error = %e, "invalid include pattern"),
                }
            } else if path.exists() {
                paths.push(path);
            } else {
                warn!(path = %path.display(), "include path does not exist");
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    warn!(error = %e, "cannot access path");
                    continue;
                }
            };
            let path = entry.path();
            if literal_ignore_paths.iter().any(|ignore| path.starts_with(ignore)) {
                continue;
            }
            let path_str = path.to_string_lossy();
            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }
            if path.is_file() && is_source_file(path) {
                files.insert(path.to_path_buf());
            }
        }
    }

    FileScan {
        files,
        skipped_count,
    }
}

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::core::file_scanner::*;

    fn names(scan: &FileScan) -> Vec<String> {
        scan.files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_source_files() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("app.js")).unwrap();
        File::create(dir.path().join("utils.mjs")).unwrap();
        File::create(dir.path().join("messages.properties")).unwrap();

        let result = scan_files(dir.path(), &[], &[], false);
        assert_eq!(names(&result), vec!["app.js", "utils.mjs"]);
    }

    #[test]
    fn test_scan_ignores_globs_and_literal_paths() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("generated")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        File::create(src.join("App.tsx")).unwrap();
        File::create(src.join("App.stories.tsx")).unwrap();
        File::create(src.join("generated").join("types.ts")).unwrap();
        File::create(dir.path().join("node_modules").join("lib.js")).unwrap();

        let result = scan_files(
            dir.path(),
            &[],
            &[
                "src/generated".to_owned(),
                "**/*.stories.tsx".to_owned(),
                "**/node_modules/**".to_owned(),
            ],
            false,
        );
        assert_eq!(names(&result), vec!["App.tsx"]);
    }

    #[test]
    fn test_scan_with_includes() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src").join("ui")).unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        File::create(dir.path().join("src").join("ui").join("view.js")).unwrap();
        File::create(dir.path().join("lib").join("util.js")).unwrap();

        let result = scan_files(
            dir.path(),
            &["src".to_owned(), "src/ui".to_owned(), "missing".to_owned()],
            &[],
            false,
        );
        assert_eq!(names(&result), vec!["view.js"]);

        let result = scan_files(dir.path(), &["*".to_owned()], &[], false);
        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn test_scan_skips_test_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("__tests__")).unwrap();
        File::create(dir.path().join("app.js")).unwrap();
        File::create(dir.path().join("app.test.js")).unwrap();
        File::create(dir.path().join("__tests__").join("helper.js")).unwrap();

        assert_eq!(names(&scan_files(dir.path(), &[], &[], true)), vec!["app.js"]);
        assert_eq!(scan_files(dir.path(), &[], &[], false).files.len(), 3);
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("src/*"));
        assert!(is_glob_pattern("file?.js"));
        assert!(!is_glob_pattern("app/[locale]"));
    }
}
