/*!
 * Core node types for directory snapshots
 *
 * A snapshot is a tree of tagged nodes, each variant carrying only the
 * fields meaningful to it. The serialized form is the shape consumed by
 * UI layers: `{"type": "directory", "name": ..., "children": [...]}`.
 */

use std::cmp::Ordering;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;

/// Represents a directory entry in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryNode {
    /// Directory name (base name of path)
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    /// Failure reason when the directory exists but could not be traversed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Sorted children; empty when the directory is empty or unreadable
    pub children: Vec<Node>,
}

/// Represents a file entry in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    /// File name
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
}

/// Represents a symbolic link in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymlinkNode {
    /// Link name
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    /// Resolved link destination, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    /// Failure reason when the link could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Placeholder for an entry that could not be classified or processed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorNode {
    /// Entry name
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    /// Failure reason
    pub error: String,
}

/// A generic snapshot node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Directory node
    Directory(DirectoryNode),
    /// File node
    File(FileNode),
    /// Symbolic link node
    Symlink(SymlinkNode),
    /// Unprocessable entry
    Error(ErrorNode),
}

impl Node {
    /// Display name of the node
    pub fn name(&self) -> &str {
        match self {
            Node::Directory(n) => &n.name,
            Node::File(n) => &n.name,
            Node::Symlink(n) => &n.name,
            Node::Error(n) => &n.name,
        }
    }

    /// Whether this node is a directory
    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }
}

/// Sort children deterministically: directories first, then case-insensitive
/// lexicographic by name, raw name as tiebreak. Called after sibling results
/// are joined so that concurrency never affects output ordering.
pub fn sort_children(children: &mut [Node]) {
    children.sort_by(|a, b| {
        match (a.is_directory(), b.is_directory()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let name_a = a.name().to_lowercase();
        let name_b = b.name().to_lowercase();
        name_a.cmp(&name_b).then_with(|| a.name().cmp(b.name()))
    });
}

/// Seam between local roots and alternate-source roots.
///
/// The crate ships the local filesystem implementation; a remote collaborator
/// implements the same trait and yields the same node shape, so callers can
/// merge results from either source transparently.
pub trait SourceProvider {
    /// Build a display tree rooted at `root`.
    fn build_tree(&self, root: &std::path::Path) -> Result<Node>;

    /// Discover version-controlled project roots under `root`.
    fn find_repositories(&self, root: &std::path::Path) -> Result<Vec<PathBuf>>;
}
