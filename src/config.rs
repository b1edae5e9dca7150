/*!
 * Command-line interface for repoconsole
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::content;
use crate::error::{Error, Result};
use crate::export::{ExportFormat, ExportOptions};
use crate::repos;
use crate::tree;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(
    name = "repoconsole",
    version = env!("CARGO_PKG_VERSION"),
    about = "Browse, inspect and export local project trees",
    long_about = "Browses local project trees, reads file content safely, discovers Git \
repositories, summarizes repository statistics, and exports a filtered snapshot of a \
project into a single document (Markdown, XML or a plain-text outline)."
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a directory snapshot as an outline or JSON
    Tree {
        /// Target directory
        #[clap(default_value = ".")]
        path: PathBuf,

        /// Maximum traversal depth
        #[clap(long, default_value_t = tree::DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Comma-separated names to ignore at any depth
        #[clap(long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Emit the node graph as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print a file's text content
    Cat {
        /// Target file
        path: PathBuf,

        /// Size ceiling in bytes
        #[clap(long, default_value_t = content::DEFAULT_MAX_VIEW_SIZE)]
        max_size: u64,
    },

    /// Export filtered project contents into a single document
    Export {
        /// Project directory
        path: PathBuf,

        /// Destination file
        output: PathBuf,

        /// Target format
        #[clap(long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,

        /// JSON file holding a complete export options object
        #[clap(long)]
        options: Option<PathBuf>,

        /// Comma-separated allow-list, replacing the default
        #[clap(long, value_delimiter = ',')]
        allow: Vec<String>,

        /// Comma-separated ignore-list, replacing the default
        #[clap(long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Per-file size ceiling in bytes
        #[clap(long)]
        max_file_size: Option<u64>,
    },

    /// Discover Git repositories under a directory
    Repos {
        /// Starting directory (defaults to the home directory)
        path: Option<PathBuf>,

        /// Maximum search depth
        #[clap(long, default_value_t = repos::DEFAULT_SCAN_DEPTH)]
        max_depth: usize,
    },

    /// Summarize repository statistics
    Stats {
        /// Target directory
        #[clap(default_value = ".")]
        path: PathBuf,

        /// Emit the summary as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Resolve export options from an optional JSON file plus flag overrides.
///
/// The JSON shape is the complete options object a UI caller would hand
/// over; flags replace the corresponding list wholesale.
pub fn resolve_export_options(
    options_file: Option<&Path>,
    allow: &[String],
    ignore: &[String],
    max_file_size: Option<u64>,
) -> Result<ExportOptions> {
    let mut options = match options_file {
        Some(path) => {
            let data = fs::read_to_string(path).map_err(|e| Error::from_io(e, path))?;
            serde_json::from_str(&data)
                .map_err(|e| Error::Config(format!("Invalid options file {}: {}", path.display(), e)))?
        }
        None => ExportOptions::default(),
    };

    if !allow.is_empty() {
        options.allowed_extensions = allow.iter().map(|s| s.to_lowercase()).collect();
    }
    if !ignore.is_empty() {
        options.ignored_items = ignore.iter().map(|s| s.to_lowercase()).collect();
    }
    if let Some(max) = max_file_size {
        options.max_file_size = max;
    }

    Ok(options)
}
