/*!
 * Repository statistics: entry counts, aggregate size, language histogram
 */

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

/// Static extension-to-language lookup table
pub static LANGUAGE_EXTENSIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("js", "JavaScript"),
        ("jsx", "JavaScript (React)"),
        ("ts", "TypeScript"),
        ("tsx", "TypeScript (React)"),
        ("py", "Python"),
        ("java", "Java"),
        ("cpp", "C++"),
        ("c", "C"),
        ("cs", "C#"),
        ("go", "Go"),
        ("rb", "Ruby"),
        ("php", "PHP"),
        ("html", "HTML"),
        ("css", "CSS"),
        ("scss", "SCSS"),
        ("json", "JSON"),
        ("md", "Markdown"),
        ("sql", "SQL"),
        ("sh", "Shell"),
        ("bat", "Batch"),
        ("ps1", "PowerShell"),
        ("vue", "Vue"),
        ("svelte", "Svelte"),
        ("rs", "Rust"),
        ("swift", "Swift"),
        ("kt", "Kotlin"),
        ("dart", "Dart"),
        ("ex", "Elixir"),
        ("elm", "Elm"),
        ("lua", "Lua"),
        ("r", "R"),
        ("scala", "Scala"),
        ("pl", "Perl"),
        ("h", "C/C++ Header"),
        ("yml", "YAML"),
        ("yaml", "YAML"),
        ("toml", "TOML"),
        ("xml", "XML"),
        ("gradle", "Gradle"),
        ("dockerfile", "Dockerfile"),
    ])
});

/// One entry of the language histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageStat {
    /// Language display name
    pub name: String,
    /// Number of files with a matching extension
    pub count: usize,
    /// Share of all counted files, rounded to whole percent
    pub percentage: u32,
}

/// Summary statistics for one repository
#[derive(Debug, Clone, Serialize)]
pub struct RepoStatsSummary {
    /// Total file count
    pub files: usize,
    /// Total directory count
    pub directories: usize,
    /// Human-formatted aggregate size
    pub size: String,
    /// Histogram of detected languages, descending by count
    pub languages: Vec<LanguageStat>,
}

/// Analyze a repository rooted at `root` or produce the remote placeholder.
///
/// Remote roots are serviced by an external collaborator; their statistics
/// are not computed here.
pub fn analyze_repository(root: &Path, remote: bool) -> RepoStatsSummary {
    if remote {
        return RepoStatsSummary {
            files: 0,
            directories: 0,
            size: "N/A (remote)".to_string(),
            languages: Vec::new(),
        };
    }
    analyze(root)
}

/// Walk `root` tallying files, directories, total size and languages.
///
/// Dot-entries and `node_modules` directories are skipped. Errors below the
/// root are logged and that subtree's contribution is omitted.
pub fn analyze(root: &Path) -> RepoStatsSummary {
    let mut files = 0usize;
    let mut directories = 0usize;
    let mut total_size = 0u64;
    let mut languages: HashMap<&'static str, usize> = HashMap::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry.file_name()));

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(root = %root.display(), error = %err, "error during analysis, omitting subtree");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        if entry.file_type().is_dir() {
            directories += 1;
        } else if entry.file_type().is_file() {
            files += 1;
            match entry.metadata() {
                Ok(metadata) => total_size += metadata.len(),
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "cannot stat file");
                }
            }
            if let Some(language) = detect_language(&entry.file_name().to_string_lossy()) {
                *languages.entry(language).or_insert(0) += 1;
            }
        }
    }

    RepoStatsSummary {
        files,
        directories,
        size: format_size(total_size),
        languages: language_stats(languages, files),
    }
}

fn is_skipped(name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}

/// Look up a file's language by its lowercase extension.
pub fn detect_language(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename).extension()?.to_string_lossy().to_lowercase();
    LANGUAGE_EXTENSIONS.get(extension.as_str()).copied()
}

fn language_stats(languages: HashMap<&'static str, usize>, files: usize) -> Vec<LanguageStat> {
    if files == 0 {
        return Vec::new();
    }
    let mut stats: Vec<LanguageStat> = languages
        .into_iter()
        .map(|(name, count)| LanguageStat {
            name: name.to_string(),
            count,
            percentage: (count as f64 / files as f64 * 100.0).round() as u32,
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    stats
}

/// Format an aggregate size: base-1024 units, no decimals for whole-number
/// byte and kilobyte values, one decimal place otherwise.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let precision = if unit <= 1 && size.fract() == 0.0 { 0 } else { 1 };
    format!("{:.*} {}", precision, size, UNITS[unit])
}
