/*!
 * Tests for repoconsole functionality
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use quick_xml::events::Event;
use quick_xml::Reader;
use tempfile::tempdir;

use crate::content::{read_file_content, read_file_content_with_limit};
use crate::error::{Error, Result};
use crate::export::{ExportFormat, ExportOptions, Exporter};
use crate::repos::find_repositories;
use crate::stats::{analyze, analyze_repository, detect_language, format_size};
use crate::tree::{build_tree, LocalSource, TreeOptions};
use crate::types::{Node, SourceProvider};
use crate::utils::{format_bytes, validate_directory};

fn exporter(format: ExportFormat, options: ExportOptions) -> Exporter {
    Exporter::new(format, options, Arc::new(ProgressBar::hidden()))
}

fn export_options(allow: &[&str], ignore: &[&str]) -> ExportOptions {
    ExportOptions {
        allowed_extensions: allow.iter().map(|s| s.to_string()).collect(),
        ignored_items: ignore.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

// Helper to create a small project fixture with nested directories.
fn setup_project_fixture() -> io::Result<tempfile::TempDir> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::create_dir_all(root.join("src").join("util"))?;
    writeln!(File::create(root.join("src").join("main.js"))?, "console.log('main');")?;
    writeln!(
        File::create(root.join("src").join("util").join("helper.js"))?,
        "module.exports = {{}};"
    )?;
    writeln!(File::create(root.join("README.md"))?, "# Fixture")?;

    Ok(temp_dir)
}

#[test]
fn test_tree_children_sorted() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::create_dir(root.join("beta"))?;
    fs::create_dir(root.join("Alpha"))?;
    File::create(root.join("Zed.txt"))?;
    File::create(root.join("apple.txt"))?;
    File::create(root.join("Midfile.txt"))?;

    let tree = build_tree(root, &TreeOptions::default());
    assert!(tree.error.is_none());

    let names: Vec<&str> = tree.children.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Alpha", "beta", "apple.txt", "Midfile.txt", "Zed.txt"]);

    assert!(tree.children[0].is_directory());
    assert!(tree.children[1].is_directory());
    assert!(!tree.children[2].is_directory());
    Ok(())
}

#[test]
fn test_tree_max_depth_truncation() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::create_dir_all(root.join("a").join("b").join("c"))?;
    File::create(root.join("shallow.txt"))?;

    let options = TreeOptions {
        max_depth: 1,
        ..Default::default()
    };
    let tree = build_tree(root, &options);

    // The shallow sibling is unaffected.
    assert!(tree
        .children
        .iter()
        .any(|c| c.name() == "shallow.txt"));

    let a = match &tree.children[0] {
        Node::Directory(dir) => dir,
        other => panic!("expected directory, got {:?}", other),
    };
    assert_eq!(a.name, "a");
    assert!(a.error.is_none());

    let b = match &a.children[0] {
        Node::Directory(dir) => dir,
        other => panic!("expected directory, got {:?}", other),
    };
    assert_eq!(b.name, "b");
    assert_eq!(b.error.as_deref(), Some("Max depth reached"));
    assert!(b.children.is_empty());
    Ok(())
}

#[test]
fn test_tree_ignores_named_entries() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::create_dir(root.join(".git"))?;
    fs::create_dir(root.join("node_modules"))?;
    fs::create_dir(root.join("NODE_MODULES2"))?;
    File::create(root.join("kept.txt"))?;

    let tree = build_tree(root, &TreeOptions::default());
    let names: Vec<&str> = tree.children.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["NODE_MODULES2", "kept.txt"]);

    // The ignore set matches case-insensitively.
    let mut options = TreeOptions::default();
    options.ignored_items.insert("node_modules2".to_string());
    let tree = build_tree(root, &options);
    let names: Vec<&str> = tree.children.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["kept.txt"]);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_tree_symlink_target() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    File::create(root.join("original.txt"))?;
    std::os::unix::fs::symlink(root.join("original.txt"), root.join("link.txt"))?;

    let tree = build_tree(root, &TreeOptions::default());
    let link = tree
        .children
        .iter()
        .find(|c| c.name() == "link.txt")
        .expect("symlink node present");

    match link {
        Node::Symlink(link) => {
            assert_eq!(link.target.as_deref(), Some(root.join("original.txt").as_path()));
            assert!(link.error.is_none());
        }
        other => panic!("expected symlink, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_tree_unreadable_root_captured_as_error() {
    let tree = build_tree(Path::new("/definitely/not/a/real/path"), &TreeOptions::default());
    assert!(tree.error.as_deref().unwrap_or("").starts_with("Cannot read directory"));
    assert!(tree.children.is_empty());
}

#[test]
fn test_find_repositories_stops_at_repository_root() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    // Nested .git folders: only the outer root must be reported.
    fs::create_dir_all(root.join("outer").join(".git"))?;
    fs::create_dir_all(root.join("outer").join("inner").join(".git"))?;
    fs::create_dir_all(root.join("other").join(".git"))?;

    // Hidden and dependency directories are not descended into.
    fs::create_dir_all(root.join(".hidden").join("repo").join(".git"))?;
    fs::create_dir_all(root.join("node_modules").join("dep").join(".git"))?;

    let repos = find_repositories(root, 5);
    assert_eq!(repos, vec![root.join("other"), root.join("outer")]);
    Ok(())
}

#[test]
fn test_find_repositories_depth_limit() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::create_dir_all(root.join("a").join("b").join(".git"))?;

    assert!(find_repositories(root, 1).is_empty());
    assert_eq!(find_repositories(root, 2), vec![root.join("a").join("b")]);
    Ok(())
}

#[test]
fn test_local_source_validates_then_delegates() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::write(root.join("kept.txt"), "x")?;
    fs::create_dir_all(root.join("project").join(".git"))?;

    let source = LocalSource::new();

    let node = source.build_tree(root).unwrap();
    match &node {
        Node::Directory(dir) => {
            assert!(dir.error.is_none());
            assert!(dir.children.iter().any(|c| c.name() == "kept.txt"));
        }
        other => panic!("expected directory, got {:?}", other),
    }
    assert_eq!(
        source.find_repositories(root).unwrap(),
        vec![root.join("project")]
    );

    // Invalid roots fail with the typed taxonomy instead of an error node.
    let missing = root.join("missing");
    assert!(matches!(
        source.build_tree(&missing).unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        source.find_repositories(&missing).unwrap_err(),
        Error::NotFound(_)
    ));
    Ok(())
}

#[test]
fn test_read_empty_file() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("empty.txt");
    File::create(&path)?;

    assert_eq!(read_file_content(&path).unwrap(), "");
    Ok(())
}

#[test]
fn test_read_too_large() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("big.txt");
    fs::write(&path, vec![b'x'; 100])?;

    let err = read_file_content_with_limit(&path, 50).unwrap_err();
    match &err {
        Error::TooLarge { actual, max, .. } => {
            assert_eq!(*actual, 100);
            assert_eq!(*max, 50);
        }
        other => panic!("expected TooLarge, got {:?}", other),
    }
    // The message carries both sizes, human-formatted.
    let message = err.to_string();
    assert!(message.contains("100 Bytes"), "message was: {}", message);
    assert!(message.contains("50 Bytes"), "message was: {}", message);
    Ok(())
}

#[test]
fn test_read_binary_content() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("binary.dat");
    fs::write(&path, b"abc\0def")?;

    assert!(matches!(
        read_file_content(&path).unwrap_err(),
        Error::BinaryContent(_)
    ));
    Ok(())
}

#[test]
fn test_read_latin1_fallback() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("latin1.txt");
    // "café" in latin1; invalid as UTF-8.
    fs::write(&path, b"caf\xe9")?;

    assert_eq!(read_file_content(&path).unwrap(), "café");
    Ok(())
}

#[test]
fn test_read_latin1_fallback_rejects_nul_heavy_content() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("nulls.dat");
    // Invalid UTF-8 with well over 10% NUL bytes.
    fs::write(&path, b"\xff\x00\x00\x00\x00A")?;

    assert!(matches!(
        read_file_content(&path).unwrap_err(),
        Error::BinaryContent(_)
    ));
    Ok(())
}

#[test]
fn test_read_missing_and_directory_paths() -> io::Result<()> {
    let temp_dir = tempdir()?;

    assert!(matches!(
        read_file_content(&temp_dir.path().join("missing.txt")).unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        read_file_content(temp_dir.path()).unwrap_err(),
        Error::IsADirectory(_)
    ));
    Ok(())
}

#[test]
fn test_validate_directory() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let file_path = temp_dir.path().join("plain.txt");
    File::create(&file_path)?;

    assert!(validate_directory(temp_dir.path()).is_ok());
    assert!(matches!(
        validate_directory(&temp_dir.path().join("nope")).unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        validate_directory(&file_path).unwrap_err(),
        Error::NotADirectory(_)
    ));
    Ok(())
}

#[test]
fn test_export_markdown_filtering_and_counts() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::write(root.join("a.js"), "0123456789")?;
    fs::write(root.join("b.bin"), b"BINDATA")?;
    fs::create_dir(root.join("node_modules"))?;
    fs::write(root.join("node_modules").join("c.js"), "ignored()")?;

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.md");
    let options = export_options(&[".js"], &["node_modules"]);
    let report = exporter(ExportFormat::Markdown, options).export(root, &output)?;

    assert_eq!(report.files_processed, 1);
    assert!(report.files_skipped >= 1);
    assert_eq!(report.total_bytes, 10);

    let written = fs::read_to_string(&output)?;
    assert!(written.contains("--- File: a.js ---"));
    assert!(written.contains("```js\n0123456789\n```"));
    assert!(written.contains("--- End File: a.js ---"));
    // Disallowed and ignored entries leave no trace in the output.
    assert!(!written.contains("b.bin"));
    assert!(!written.contains("BINDATA"));
    assert!(!written.contains("c.js"));
    Ok(())
}

#[test]
fn test_export_ignore_globs_skip_silently() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::write(root.join("a.js"), "kept")?;
    fs::write(root.join("debug.log"), "noise")?;
    fs::write(root.join("c.txt"), "disallowed")?;

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.md");
    let options = export_options(&[".js"], &["*.log"]);
    let report = exporter(ExportFormat::Markdown, options).export(root, &output)?;

    assert_eq!(report.files_processed, 1);
    // The ignored log file is excluded entirely; only the disallowed
    // extension counts as skipped.
    assert_eq!(report.files_skipped, 1);

    let written = fs::read_to_string(&output)?;
    assert!(!written.contains("debug.log"));
    Ok(())
}

#[test]
fn test_export_too_large_marker() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::write(root.join("big.js"), vec![b'x'; 2048])?;

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.md");
    let options = ExportOptions {
        max_file_size: 1024,
        ..export_options(&[".js"], &[])
    };
    let report = exporter(ExportFormat::Markdown, options).export(root, &output)?;

    assert_eq!(report.files_processed, 0);
    assert_eq!(report.files_skipped, 1);

    let written = fs::read_to_string(&output)?;
    assert!(written.contains("--- Skipped large file: big.js (2 KB) ---"));
    Ok(())
}

#[test]
fn test_export_binary_marker() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::write(root.join("blob.js"), b"a\0b\0c")?;

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.md");
    let report =
        exporter(ExportFormat::Markdown, export_options(&[".js"], &[])).export(root, &output)?;

    assert_eq!(report.files_processed, 0);
    assert_eq!(report.files_skipped, 1);

    let written = fs::read_to_string(&output)?;
    assert!(written.contains("--- Skipped: Binary content detected: blob.js ---"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_export_stat_error_marker() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::create_dir(root.join("locked"))?;
    fs::write(root.join("locked").join("a.js"), "x")?;
    // Drop search permission: names still list, stat on them fails.
    fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o644))?;
    if fs::metadata(root.join("locked").join("a.js")).is_ok() {
        // Elevated processes bypass permission checks; nothing to observe.
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.md");
    let report =
        exporter(ExportFormat::Markdown, export_options(&[".js"], &[])).export(root, &output);
    fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755))?;
    let report = report?;

    assert_eq!(report.files_processed, 0);
    assert_eq!(report.files_skipped, 1);

    let written = fs::read_to_string(&output)?;
    assert!(
        written.contains("--- Error accessing file: locked/a.js ("),
        "output was: {}",
        written
    );
    Ok(())
}

#[test]
fn test_export_xml_is_well_formed_despite_cdata_terminator() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::write(root.join("evil.js"), "before ]]> after")?;
    fs::write(root.join("a&b.js"), "amp")?;

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.xml");
    let report =
        exporter(ExportFormat::Xml, export_options(&[".js"], &[])).export(root, &output)?;
    assert_eq!(report.files_processed, 2);

    let written = fs::read_to_string(&output)?;
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(written.contains("<project root="));
    assert!(written.trim_end().ends_with("</project>"));
    assert!(written.contains("]]]]><![CDATA[>"));
    assert!(written.contains("name=\"a&amp;b.js\""));

    // The document must still parse as well-formed XML.
    let mut reader = Reader::from_str(&written);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => panic!("exported XML is not well-formed: {}", err),
        }
    }
    Ok(())
}

#[test]
fn test_export_xml_directory_nesting() -> Result<()> {
    let temp_dir = setup_project_fixture()?;
    let root = temp_dir.path();

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.xml");
    let options = export_options(&[".js", ".md"], &[]);
    let report = exporter(ExportFormat::Xml, options).export(root, &output)?;
    assert_eq!(report.files_processed, 3);

    let written = fs::read_to_string(&output)?;
    assert!(written.contains("<directory name=\"src\" path=\"src\">"));
    assert!(written.contains("<file name=\"helper.js\" path=\"src/util/helper.js\""));
    Ok(())
}

// Parse an outline export back into (relative path, is_directory) pairs.
fn parse_structure(output: &str) -> Vec<(String, bool)> {
    let mut stack: Vec<String> = Vec::new();
    let mut parsed = Vec::new();
    for line in output.lines().skip(2) {
        if line.is_empty() {
            continue;
        }
        let trimmed = line.trim_start_matches(' ');
        let depth = (line.len() - trimmed.len()) / 2;
        let entry = trimmed.strip_prefix("|-- ").expect("outline prefix");
        let is_dir = entry.ends_with('/');
        stack.truncate(depth);
        stack.push(entry.trim_end_matches('/').to_string());
        parsed.push((stack.join("/"), is_dir));
    }
    parsed
}

#[test]
fn test_export_structure_roundtrip() -> Result<()> {
    let temp_dir = setup_project_fixture()?;
    let root = temp_dir.path();

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.txt");
    let options = export_options(&[".js", ".md"], &[]);
    let report = exporter(ExportFormat::Structure, options).export(root, &output)?;

    // Names only, but files still count as processed with their sizes.
    assert_eq!(report.files_processed, 3);
    assert!(report.total_bytes > 0);

    let written = fs::read_to_string(&output)?;
    assert!(written.starts_with(&format!("Structure export for: {}", root.display())));
    assert!(!written.contains("console.log"));

    let parsed = parse_structure(&written);
    assert_eq!(
        parsed,
        vec![
            ("src".to_string(), true),
            ("src/util".to_string(), true),
            ("src/util/helper.js".to_string(), false),
            ("src/main.js".to_string(), false),
            ("README.md".to_string(), false),
        ]
    );
    Ok(())
}

#[test]
fn test_export_structure_lists_undecodable_files() -> Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    // The outline format never decodes content, so bytes that markdown and
    // XML would reject as binary are listed like any other file.
    fs::write(root.join("blob.js"), b"a\0\xff\0b")?;

    let out_dir = tempdir()?;
    let output = out_dir.path().join("export.txt");
    let report =
        exporter(ExportFormat::Structure, export_options(&[".js"], &[])).export(root, &output)?;

    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_skipped, 0);
    assert_eq!(report.total_bytes, 5);

    let written = fs::read_to_string(&output)?;
    assert!(written.contains("|-- blob.js"));
    Ok(())
}

#[test]
fn test_stats_language_histogram() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    fs::create_dir(root.join("src"))?;
    for name in ["one.js", "two.js", "src/three.js"] {
        fs::write(root.join(name), "x")?;
    }
    for name in ["a.py", "src/b.py"] {
        fs::write(root.join(name), "y")?;
    }
    // Skipped subtrees contribute nothing.
    fs::create_dir(root.join("node_modules"))?;
    fs::write(root.join("node_modules").join("dep.js"), "z")?;
    fs::write(root.join(".hidden.js"), "z")?;

    let summary = analyze(root);
    assert_eq!(summary.files, 5);
    assert_eq!(summary.directories, 1);
    assert_eq!(summary.size, "5 B");

    assert_eq!(summary.languages.len(), 2);
    assert_eq!(summary.languages[0].name, "JavaScript");
    assert_eq!(summary.languages[0].count, 3);
    assert_eq!(summary.languages[0].percentage, 60);
    assert_eq!(summary.languages[1].name, "Python");
    assert_eq!(summary.languages[1].count, 2);
    assert_eq!(summary.languages[1].percentage, 40);
    Ok(())
}

#[test]
fn test_analyze_repository_remote_placeholder() -> io::Result<()> {
    // Remote roots are serviced elsewhere; the summary is a placeholder
    // and the path is never touched.
    let summary = analyze_repository(Path::new("/definitely/not/a/real/path"), true);
    assert_eq!(summary.files, 0);
    assert_eq!(summary.directories, 0);
    assert_eq!(summary.size, "N/A (remote)");
    assert!(summary.languages.is_empty());

    // Local roots go through the ordinary analysis.
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join("one.js"), "x")?;
    let summary = analyze_repository(temp_dir.path(), false);
    assert_eq!(summary.files, 1);
    assert_eq!(summary.languages[0].name, "JavaScript");
    Ok(())
}

#[test]
fn test_detect_language() {
    assert_eq!(detect_language("index.js"), Some("JavaScript"));
    assert_eq!(detect_language("Main.RS"), Some("Rust"));
    assert_eq!(detect_language("README"), None);
    assert_eq!(detect_language("photo.unknownext"), None);
}

#[test]
fn test_format_size() {
    assert_eq!(format_size(0), "0 B");
    assert_eq!(format_size(512), "512 B");
    assert_eq!(format_size(1024), "1 KB");
    assert_eq!(format_size(1536), "1.5 KB");
    assert_eq!(format_size(1024 * 1024), "1.0 MB");
}

#[test]
fn test_format_bytes() {
    assert_eq!(format_bytes(0), "0 Bytes");
    assert_eq!(format_bytes(500), "500 Bytes");
    assert_eq!(format_bytes(1024), "1 KB");
    assert_eq!(format_bytes(1536), "1.5 KB");
    assert_eq!(format_bytes(10 * 1024 * 1024), "10 MB");
}

#[test]
fn test_export_options_from_json() {
    let options: ExportOptions = serde_json::from_str(
        r#"{"allowedExtensions": [".js"], "ignoredItems": ["node_modules"], "maxFileSize": 1024}"#,
    )
    .expect("valid options JSON");

    assert!(options.allowed_extensions.contains(".js"));
    assert_eq!(options.ignored_items, vec!["node_modules"]);
    assert_eq!(options.max_file_size, 1024);

    // Omitted fields fall back to the documented defaults.
    let partial: ExportOptions = serde_json::from_str(r#"{"maxFileSize": 42}"#).unwrap();
    assert_eq!(partial.max_file_size, 42);
    assert!(partial.allowed_extensions.contains(".rs"));
    assert!(partial.ignored_items.iter().any(|p| p == "*.log"));
}

#[test]
fn test_default_export_options() {
    let options = ExportOptions::default();
    assert!(options.allowed_extensions.contains(".js"));
    assert!(options.allowed_extensions.contains("dockerfile"));
    assert!(options.ignored_items.iter().any(|p| p == "node_modules"));
    assert_eq!(options.max_file_size, 10 * 1024 * 1024);

    // Full-filename allow entries match extensionless files.
    assert!(options.is_allowed("dockerfile"));
    assert!(options.is_allowed("main.rs"));
    assert!(!options.is_allowed("blob.bin"));
    assert!(options.is_ignored("node_modules"));
    assert!(options.is_ignored("debug.log"));
    assert!(!options.is_ignored("src"));
}

#[test]
fn test_node_json_shape() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    fs::write(root.join("file.txt"), "hi")?;

    let tree = build_tree(root, &TreeOptions::default());
    let json = serde_json::to_string(&Node::Directory(tree)).unwrap();

    assert!(json.contains(r#""type":"directory""#));
    assert!(json.contains(r#""type":"file""#));
    assert!(json.contains(r#""name":"file.txt""#));
    // Absent optional fields are omitted, not serialized as null.
    assert!(!json.contains(r#""error""#));
    Ok(())
}
