/*!
 * Discovery of version-controlled project roots
 *
 * Best-effort, bounded search for directories that directly contain a
 * `.git` directory. Once a root is found its subtree is not scanned
 * further; unreadable directories are skipped with a warning.
 */

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::warn;

/// Default depth bound for repository discovery
pub const DEFAULT_SCAN_DEPTH: usize = 5;

/// Find repository roots under `root`, at most `max_depth` levels deep.
///
/// The result is sorted and free of duplicates. Depth exhaustion halts
/// descent silently; this is a discovery scan, not a display tree.
pub fn find_repositories(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut repos = scan_level(root, 0, max_depth);
    repos.sort();
    repos.dedup();
    repos
}

fn scan_level(dir: &Path, depth: usize, max_depth: usize) -> Vec<PathBuf> {
    if depth > max_depth {
        return Vec::new();
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "cannot read directory, skipping");
            return Vec::new();
        }
    };

    let mut has_git = false;
    let mut subdirs = Vec::new();

    for entry in entries.filter_map(|e| e.ok()) {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == ".git" {
            has_git = true;
        } else if name != "node_modules" && !name.starts_with('.') {
            subdirs.push(entry.path());
        }
    }

    if has_git {
        // Repository root found; its subdirectories are not scanned
        // independently.
        return vec![dir.to_path_buf()];
    }

    subdirs
        .par_iter()
        .map(|subdir| scan_level(subdir, depth + 1, max_depth))
        .reduce(Vec::new, |mut acc, mut found| {
            acc.append(&mut found);
            acc
        })
}
