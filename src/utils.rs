/*!
 * Utility functions for repoconsole
 */

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// Validate that a path exists and is a directory.
///
/// This gate runs before any traversal begins on a user-supplied root.
pub fn validate_directory(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| Error::from_io(e, path))?;
    if !metadata.is_dir() {
        return Err(Error::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Format a human-readable byte size (base 1024, one decimal place,
/// whole values printed without the trailing `.0`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let mut formatted = format!("{:.1}", value);
    if let Some(trimmed) = formatted.strip_suffix(".0") {
        formatted = trimmed.to_string();
    }
    format!("{} {}", formatted, UNITS[exponent])
}

/// Decode bytes as latin1, mapping every byte to the Unicode scalar of the
/// same value. Never fails; the result may be visually imperfect.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Binary heuristic for fallback-decoded content: more than 10% NUL bytes.
pub fn excessive_nul_bytes(bytes: &[u8]) -> bool {
    let nuls = bytes.iter().filter(|&&b| b == 0).count();
    nuls * 10 > bytes.len()
}

/// Render `path` relative to `base` using forward slashes on every platform.
/// Falls back to the full path when `path` is not under `base`.
pub fn relative_slash(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Default allow-list for content export: dotted extensions plus full
/// lowercase names of recognized extensionless files.
pub static DEFAULT_ALLOWED_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Web and scripting
        ".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".json", ".jsonc", ".json5", ".html",
        ".htm", ".xhtml", ".xml", ".xaml", ".svg", ".vue", ".svelte", ".css", ".scss", ".sass",
        ".less", ".styl",
        // Documents
        ".md", ".markdown", ".txt", ".rtf", ".tex", ".bib",
        // Configuration
        ".yaml", ".yml", ".toml", ".ini", ".cfg", ".conf", ".properties", ".env", ".pem", ".key",
        ".crt", ".csr",
        // JVM / Python / Ruby
        ".py", ".pyw", ".rb", ".rbw", ".java", ".kt", ".kts", ".groovy",
        // C family
        ".c", ".cpp", ".cxx", ".h", ".hpp", ".hxx", ".cs", ".fs", ".fsi", ".fsx",
        // Systems and mobile
        ".go", ".rs", ".swift", ".mm", ".m", ".php", ".pl", ".pm",
        // Shells
        ".sh", ".bash", ".zsh", ".fish", ".bat", ".cmd", ".ps1", ".psm1",
        // Data and query
        ".sql", ".ddl", ".dml", ".pgsql", ".mysql", ".sqlite", ".graphql", ".gql",
        // Misc languages
        ".r", ".lua", ".scala", ".sc", ".dart", ".vb", ".vbs", ".asm", ".s", ".clj", ".cljs",
        ".cljc", ".edn", ".erl", ".hrl", ".ex", ".exs", ".hs", ".lhs", ".feature",
        // Templates
        ".liquid", ".mustache", ".hbs", ".ejs", ".pug", ".jade", ".haml", ".slim", ".njk",
        // Infrastructure
        ".dockerfile", ".tf", ".tfvars", ".hcl", ".http", ".rest",
        // Tooling dotfiles
        ".gitignore", ".gitattributes", ".editorconfig", ".npmrc", ".yarnrc", ".babelrc",
        ".eslintrc", ".prettierrc", ".stylelintrc",
        // Project files
        ".csproj", ".vbproj", ".sln", ".vcxproj", ".pbxproj",
        // Full filenames for extensionless but recognized files
        "dockerfile", "docker-compose.yml", "docker-compose.yaml", "vagrantfile", "makefile",
        "gemfile", "rakefile", "build.gradle", "settings.gradle", "pom.xml", "project.json",
        "package.json", "composer.json", "requirements.txt", "pipfile", "pyproject.toml",
        "cargo.toml",
    ]
});

/// Default ignore-list for content export: names and glob patterns excluded
/// at any depth, matched against the bare item name.
pub static DEFAULT_IGNORED_ITEMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version control and dependencies
        ".git", "node_modules", "bower_components", "vendor",
        // Build output
        "dist", "build", "out", "target", "bin", "obj", "Release", "Debug",
        // Coverage and caches
        "coverage", ".nyc_output", "tmp", ".temp", ".cache", ".idea", ".vscode", ".history",
        // OS noise
        ".DS_Store", "Thumbs.db",
        // Logs, locks, editor swap
        "*.log", "*.lock", "*.swp", "*.swo", "*~",
        // Compiled objects
        "*.pyc", "*.pyo", "__pycache__", "*.class", "*.jar", "*.war", "*.o", "*.obj", "*.so",
        "*.dylib", "*.dll", "*.lib", "*.a", "*.exe", "*.app",
        // Archives and images
        "*.zip", "*.tar", "*.gz", "*.bz2", "*.xz", "*.rar", "*.7z", "*.dmg", "*.iso",
        // Media
        "*.mp3", "*.wav", "*.ogg", "*.flac", "*.mp4", "*.avi", "*.mov", "*.mkv",
        // Pictures and fonts
        "*.jpg", "*.jpeg", "*.png", "*.gif", "*.bmp", "*.tiff", "*.webp", "*.ico", "*.eot",
        "*.ttf", "*.woff", "*.woff2",
        // Binary documents
        "*.pdf", "*.doc", "*.docx", "*.xls", "*.xlsx", "*.ppt", "*.pptx", "*.psd",
        // Lockfiles
        "package-lock.json", "yarn.lock", "pnpm-lock.yaml", "composer.lock", "Gemfile.lock",
        "Cargo.lock", "poetry.lock",
    ]
});
