use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::ResolveError;

/// Find the first file whose name matches the glob pattern, rooted at `dir`.
/// Matching is against file names only. Order is deterministic: non-recursive
/// search sorts the directory listing by name, recursive search walks
/// depth-first with sorted siblings.
pub fn find_first(dir: &Path, pattern: &str, recursive: bool) -> Result<PathBuf, ResolveError> {
    let compiled = Pattern::new(pattern).map_err(|err| ResolveError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })?;

    let matched = if recursive {
        find_recursive(dir, &compiled)
    } else {
        find_flat(dir, &compiled)
    };

    matched.ok_or_else(|| ResolveError::NoFileMatch {
        pattern: pattern.to_string(),
        dir: dir.to_path_buf(),
    })
}

fn find_flat(dir: &Path, pattern: &Pattern) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;

    let mut matches: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| {
            entry
                .file_type()
                .map(|file_type| file_type.is_file())
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .filter(|path| matches_name(path, pattern))
        .collect();

    matches.sort();
    matches.into_iter().next()
}

fn find_recursive(dir: &Path, pattern: &Pattern) -> Option<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .find(|path| matches_name(path, pattern))
}

fn matches_name(path: &Path, pattern: &Pattern) -> bool {
    path.file_name()
        .map(|name| pattern.matches(&name.to_string_lossy()))
        .unwrap_or(false)
}
