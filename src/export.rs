/*!
 * Project content export
 *
 * Walks a directory depth-first and streams matched file contents plus
 * structure into a single destination document (markdown, XML or a plain
 * outline). The destination is opened once and closed exactly once on
 * every exit path; per-item failures are recorded as skips with inline
 * markers and never abort the walk.
 */

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use glob_match::glob_match;
use indicatif::ProgressBar;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::utils::{
    excessive_nul_bytes, format_bytes, latin1_to_string, relative_slash,
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_IGNORED_ITEMS,
};

/// Default per-file ceiling for export content
pub const DEFAULT_MAX_EXPORT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Target serialization shape
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    ValueEnum,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Path markers and fenced code blocks per file
    Markdown,
    /// Well-formed document with nested directory/file elements
    Xml,
    /// Indented plain-text outline, no content
    Structure,
}

/// Configuration for one export invocation; immutable during the walk.
///
/// Deserializable from JSON so a caller can hand over the complete options
/// object. All entries are expected in lowercase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Dotted extensions and full lowercase filenames eligible for content
    pub allowed_extensions: HashSet<String>,
    /// Names and glob patterns excluded at any depth
    pub ignored_items: Vec<String>,
    /// Per-file byte ceiling beyond which a file is skipped
    pub max_file_size: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignored_items: DEFAULT_IGNORED_ITEMS.iter().map(|s| s.to_string()).collect(),
            max_file_size: DEFAULT_MAX_EXPORT_FILE_SIZE,
        }
    }
}

impl ExportOptions {
    /// Match a bare item name against the ignore patterns, case-insensitively.
    pub fn is_ignored(&self, name_lower: &str) -> bool {
        self.ignored_items
            .iter()
            .any(|pattern| glob_match(&pattern.to_lowercase(), name_lower))
    }

    /// A file is eligible when its dotted extension or its full lowercase
    /// name appears in the allow-list.
    pub fn is_allowed(&self, name_lower: &str) -> bool {
        if self.allowed_extensions.contains(name_lower) {
            return true;
        }
        Path::new(name_lower)
            .extension()
            .map(|ext| {
                self.allowed_extensions
                    .contains(&format!(".{}", ext.to_string_lossy()))
            })
            .unwrap_or(false)
    }
}

/// Accumulated statistics for one export walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Files whose content (or name, for the outline format) was written
    pub files_processed: usize,
    /// Files and directories skipped for any reason
    pub files_skipped: usize,
    /// Total size of processed files
    pub total_bytes: u64,
}

impl ExportReport {
    /// Human-readable summary of the finished walk.
    pub fn summary(&self) -> String {
        format!(
            "Processed: {} files, Skipped: {}, Total Size: {}.",
            self.files_processed,
            self.files_skipped,
            format_bytes(self.total_bytes)
        )
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Exporter for project contents
pub struct Exporter {
    /// Target format
    format: ExportFormat,
    /// Filtering policy and size ceiling
    options: ExportOptions,
    /// Progress bar, incremented per eligible file
    progress: Arc<ProgressBar>,
}

impl Exporter {
    /// Create a new exporter.
    pub fn new(format: ExportFormat, options: ExportOptions, progress: Arc<ProgressBar>) -> Self {
        Self {
            format,
            options,
            progress,
        }
    }

    /// Export the tree under `base` into `destination`.
    ///
    /// Fails only when the destination cannot be opened or a write to it
    /// fails; everything below `base` is handled best-effort. The
    /// destination handle is dropped on every exit path.
    pub fn export(&self, base: &Path, destination: &Path) -> Result<ExportReport> {
        let file = File::create(destination).map_err(|e| Error::from_io(e, destination))?;
        let mut out = BufWriter::new(file);
        let mut report = ExportReport::default();

        self.write_header(&mut out, base)?;
        self.walk(base, base, &mut out, 0, &mut report)?;
        self.write_footer(&mut out)?;
        out.flush()?;

        Ok(report)
    }

    fn write_header<W: Write>(&self, out: &mut W, base: &Path) -> Result<()> {
        match self.format {
            ExportFormat::Markdown => {}
            ExportFormat::Xml => write!(
                out,
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project root=\"{}\">\n",
                escape(base.to_string_lossy().as_ref())
            )?,
            ExportFormat::Structure => write!(
                out,
                "Structure export for: {}\n{}\n",
                base.display(),
                "=".repeat(40)
            )?,
        }
        Ok(())
    }

    fn write_footer<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.format == ExportFormat::Xml {
            writeln!(out, "</project>")?;
        }
        Ok(())
    }

    /// Depth-first, pre-order walk with sequential writes. Entries are
    /// ordered directories first, then files, then case-insensitively by
    /// name within each group.
    fn walk<W: Write>(
        &self,
        base: &Path,
        dir: &Path,
        out: &mut W,
        depth: usize,
        report: &mut ExportReport,
    ) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).collect::<Vec<_>>(),
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
                report.files_skipped += 1;
                let rel = relative_slash(base, dir);
                match self.format {
                    ExportFormat::Markdown => {
                        write!(out, "\n--- Error reading directory: {} ({}) ---\n", rel, err)?
                    }
                    ExportFormat::Xml => writeln!(
                        out,
                        "{}<error type=\"directory\" path=\"{}\">{}</error>",
                        indent(depth + 1),
                        escape(&rel),
                        escape(&err.to_string())
                    )?,
                    ExportFormat::Structure => writeln!(
                        out,
                        "{}|-- [Error reading directory: {} ({})]",
                        indent(depth + 1),
                        rel,
                        err
                    )?,
                }
                return Ok(());
            }
        };

        let mut sorted: Vec<(u8, String, PathBuf)> = entries
            .iter()
            .map(|entry| {
                let rank = match entry.file_type() {
                    Ok(t) if t.is_dir() => 0,
                    Ok(t) if t.is_file() => 1,
                    // Entries that cannot be classified take the file path,
                    // where the failing stat is recorded as a skip with an
                    // inline marker.
                    Err(_) => 1,
                    Ok(_) => 2,
                };
                let name = entry.file_name().to_string_lossy().to_string();
                (rank, name, entry.path())
            })
            .collect();
        sorted.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
                .then_with(|| a.1.cmp(&b.1))
        });

        for (rank, name, path) in sorted {
            let name_lower = name.to_lowercase();
            if self.options.is_ignored(&name_lower) {
                continue;
            }
            let rel = relative_slash(base, &path);
            match rank {
                0 => self.export_directory(base, &path, &name, &rel, out, depth, report)?,
                1 => self.export_file(&path, &name, &name_lower, &rel, out, depth, report)?,
                // Symlinks and special files are not exported.
                _ => {}
            }
        }
        Ok(())
    }

    fn export_directory<W: Write>(
        &self,
        base: &Path,
        path: &Path,
        name: &str,
        rel: &str,
        out: &mut W,
        depth: usize,
        report: &mut ExportReport,
    ) -> Result<()> {
        match self.format {
            // Markdown carries directory structure in the file path markers.
            ExportFormat::Markdown => {}
            ExportFormat::Xml => writeln!(
                out,
                "{}<directory name=\"{}\" path=\"{}\">",
                indent(depth + 1),
                escape(name),
                escape(rel)
            )?,
            ExportFormat::Structure => writeln!(out, "{}|-- {}/", indent(depth), name)?,
        }

        self.walk(base, path, out, depth + 1, report)?;

        if self.format == ExportFormat::Xml {
            writeln!(out, "{}</directory>", indent(depth + 1))?;
        }
        Ok(())
    }

    fn export_file<W: Write>(
        &self,
        path: &Path,
        name: &str,
        name_lower: &str,
        rel: &str,
        out: &mut W,
        depth: usize,
        report: &mut ExportReport,
    ) -> Result<()> {
        if !self.options.is_allowed(name_lower) {
            report.files_skipped += 1;
            return Ok(());
        }

        self.progress.inc(1);
        self.progress.set_message(name.to_string());

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping file, stat failed");
                report.files_skipped += 1;
                match self.format {
                    ExportFormat::Markdown => {
                        write!(out, "\n--- Error accessing file: {} ({}) ---\n", rel, err)?
                    }
                    ExportFormat::Xml => writeln!(
                        out,
                        "{}<file name=\"{}\" path=\"{}\" error=\"Stat Error: {}\"/>",
                        indent(depth + 1),
                        escape(name),
                        escape(rel),
                        escape(&err.to_string())
                    )?,
                    ExportFormat::Structure => {
                        writeln!(out, "{}|-- {} [Error: {}]", indent(depth), name, err)?
                    }
                }
                return Ok(());
            }
        };

        let size = metadata.len();
        if size > self.options.max_file_size {
            warn!(path = %path.display(), size, "skipping large file");
            report.files_skipped += 1;
            match self.format {
                ExportFormat::Markdown => write!(
                    out,
                    "\n--- Skipped large file: {} ({}) ---\n",
                    rel,
                    format_bytes(size)
                )?,
                ExportFormat::Xml => writeln!(
                    out,
                    "{}<file name=\"{}\" path=\"{}\" error=\"File too large ({})\"/>",
                    indent(depth + 1),
                    escape(name),
                    escape(rel),
                    format_bytes(size)
                )?,
                ExportFormat::Structure => {
                    writeln!(out, "{}|-- {} [Skipped: Too Large]", indent(depth), name)?
                }
            }
            return Ok(());
        }

        // The outline format lists the name only and never decodes content;
        // the file still counts as processed and its size contributes to
        // the total.
        if self.format == ExportFormat::Structure {
            writeln!(out, "{}|-- {}", indent(depth), name)?;
            report.files_processed += 1;
            report.total_bytes += size;
            return Ok(());
        }

        let decoded = match fs::read(path) {
            Ok(bytes) => decode_for_export(bytes),
            Err(err) => Err(err.to_string()),
        };
        let content = match decoded {
            Ok(content) => content,
            Err(reason) => {
                warn!(path = %path.display(), %reason, "skipping file");
                report.files_skipped += 1;
                if self.format == ExportFormat::Markdown {
                    write!(out, "\n--- {}: {} ---\n", reason, rel)?;
                } else {
                    writeln!(
                        out,
                        "{}<file name=\"{}\" path=\"{}\" error=\"{}\"/>",
                        indent(depth + 1),
                        escape(name),
                        escape(rel),
                        escape(&reason)
                    )?;
                }
                return Ok(());
            }
        };

        if self.format == ExportFormat::Markdown {
            let extension = Path::new(name_lower)
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            write!(
                out,
                "\n--- File: {} ---\n```{}\n{}\n```\n--- End File: {} ---\n",
                rel, extension, content, rel
            )?;
        } else {
            writeln!(
                out,
                "{}<file name=\"{}\" path=\"{}\" size=\"{}\">",
                indent(depth + 1),
                escape(name),
                escape(rel),
                size
            )?;
            write!(out, "{}<content><![CDATA[", indent(depth + 2))?;
            // A literal CDATA terminator inside content would close the
            // section early; split it across two sections.
            out.write_all(content.replace("]]>", "]]]]><![CDATA[>").as_bytes())?;
            writeln!(out, "]]></content>")?;
            writeln!(out, "{}</file>", indent(depth + 1))?;
        }

        report.files_processed += 1;
        report.total_bytes += size;
        Ok(())
    }
}

/// Decode export content: UTF-8 first, latin1 fallback with the NUL-density
/// heuristic. Returns the skip reason on binary content.
fn decode_for_export(bytes: Vec<u8>) -> std::result::Result<String, String> {
    match String::from_utf8(bytes) {
        Ok(text) => {
            if text.contains('\0') {
                return Err("Skipped: Binary content detected".to_string());
            }
            Ok(text)
        }
        Err(err) => {
            let bytes = err.into_bytes();
            if excessive_nul_bytes(&bytes) {
                return Err("Skipped: Binary content detected (latin1)".to_string());
            }
            Ok(latin1_to_string(&bytes))
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
