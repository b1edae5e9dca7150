/*!
 * Recursive directory snapshot builder
 *
 * Builds an ordered tree of typed nodes for display. Traversal failures
 * below the root never abort the walk: they are recorded on the offending
 * node and siblings continue normally. Each level fans sibling processing
 * out across the rayon pool, joins the results and sorts them, so the
 * output ordering is independent of scheduling.
 */

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::warn;

use crate::error::Result;
use crate::repos;
use crate::types::{sort_children, DirectoryNode, ErrorNode, FileNode, Node, SymlinkNode};
use crate::utils::validate_directory;

/// Default depth bound for display trees
pub const DEFAULT_MAX_DEPTH: usize = 15;

/// Options for building a display tree
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Depth bound; nodes beyond it are truncated and flagged, not omitted
    pub max_depth: usize,
    /// Lowercase names excluded at any depth (exact match)
    pub ignored_items: HashSet<String>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ignored_items: [".git", "node_modules"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl TreeOptions {
    fn is_ignored(&self, name: &str) -> bool {
        self.ignored_items.contains(&name.to_lowercase())
    }
}

/// Build a display tree rooted at `root`.
///
/// Never fails: inability to read the root itself is recorded as `error` on
/// the returned directory-typed node. Callers gate user-supplied roots
/// through [`validate_directory`] first for a typed failure instead.
pub fn build_tree(root: &Path, options: &TreeOptions) -> DirectoryNode {
    build_level(root, options, 0)
}

fn build_level(dir: &Path, options: &TreeOptions, depth: usize) -> DirectoryNode {
    let name = node_name(dir);

    if depth > options.max_depth {
        warn!(path = %dir.display(), max_depth = options.max_depth, "max depth reached");
        return DirectoryNode {
            name,
            path: dir.to_path_buf(),
            error: Some("Max depth reached".to_string()),
            children: Vec::new(),
        };
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %dir.display(), error = %err, "cannot read directory");
            return DirectoryNode {
                name,
                path: dir.to_path_buf(),
                error: Some(format!("Cannot read directory: {}", err)),
                children: Vec::new(),
            };
        }
    };

    let mut pending = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let entry_name = entry.file_name().to_string_lossy().to_string();
                if options.is_ignored(&entry_name) {
                    continue;
                }
                pending.push((entry_name, entry));
            }
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "skipping unreadable entry");
            }
        }
    }

    let mut children: Vec<Node> = pending
        .into_par_iter()
        .filter_map(|(entry_name, entry)| process_entry(entry_name, entry, options, depth))
        .collect();
    sort_children(&mut children);

    DirectoryNode {
        name,
        path: dir.to_path_buf(),
        error: None,
        children,
    }
}

/// Classify one directory entry. Entry kinds other than directory, file and
/// symlink are silently omitted.
fn process_entry(
    name: String,
    entry: fs::DirEntry,
    options: &TreeOptions,
    depth: usize,
) -> Option<Node> {
    let path = entry.path();
    let file_type = match entry.file_type() {
        Ok(file_type) => file_type,
        Err(err) => {
            return Some(Node::Error(ErrorNode {
                name,
                path,
                error: format!("Processing error: {}", err),
            }))
        }
    };

    if file_type.is_dir() {
        Some(Node::Directory(build_level(&path, options, depth + 1)))
    } else if file_type.is_file() {
        Some(Node::File(FileNode { name, path }))
    } else if file_type.is_symlink() {
        match fs::read_link(&path) {
            Ok(target) => Some(Node::Symlink(SymlinkNode {
                name,
                path,
                target: Some(target),
                error: None,
            })),
            Err(err) => Some(Node::Symlink(SymlinkNode {
                name,
                path,
                target: None,
                error: Some(format!("Cannot read link: {}", err)),
            })),
        }
    } else {
        None
    }
}

fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Local filesystem implementation of the source seam.
#[derive(Debug, Clone)]
pub struct LocalSource {
    /// Options applied to display trees
    pub tree: TreeOptions,
    /// Depth bound for repository discovery
    pub scan_depth: usize,
}

impl LocalSource {
    /// Create a source with the default tree and scan policies.
    pub fn new() -> Self {
        Self {
            tree: TreeOptions::default(),
            scan_depth: repos::DEFAULT_SCAN_DEPTH,
        }
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::types::SourceProvider for LocalSource {
    fn build_tree(&self, root: &Path) -> Result<Node> {
        validate_directory(root)?;
        Ok(Node::Directory(build_tree(root, &self.tree)))
    }

    fn find_repositories(&self, root: &Path) -> Result<Vec<PathBuf>> {
        validate_directory(root)?;
        Ok(repos::find_repositories(root, self.scan_depth))
    }
}
