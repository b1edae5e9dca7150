/*!
 * repoconsole - core engine of a repository browser and exporter
 *
 * Builds display trees of local project directories, reads file content
 * with size and binary guards, discovers Git repository roots, summarizes
 * repository statistics, and exports filtered project snapshots into a
 * single Markdown, XML or plain-outline document.
 */

pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod report;
pub mod repos;
pub mod stats;
pub mod tree;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use content::{read_file_content, read_file_content_with_limit};
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportOptions, ExportReport, Exporter};
pub use report::Reporter;
pub use repos::find_repositories;
pub use stats::{analyze, analyze_repository, RepoStatsSummary};
pub use tree::{build_tree, LocalSource, TreeOptions};
pub use types::{DirectoryNode, ErrorNode, FileNode, Node, SourceProvider, SymlinkNode};
pub use utils::{format_bytes, validate_directory};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
