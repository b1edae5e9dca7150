/*!
 * Command-line driver for repoconsole
 */

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use repoconsole::config::{resolve_export_options, Args, Command};
use repoconsole::error::{Error, Result};
use repoconsole::export::Exporter;
use repoconsole::report::Reporter;
use repoconsole::types::{DirectoryNode, Node};
use repoconsole::utils::validate_directory;
use repoconsole::{content, find_repositories, stats, tree};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Tree {
            path,
            max_depth,
            ignore,
            json,
        } => {
            validate_directory(&path)?;
            let mut options = tree::TreeOptions {
                max_depth,
                ..Default::default()
            };
            if !ignore.is_empty() {
                options.ignored_items = ignore.iter().map(|s| s.to_lowercase()).collect();
            }
            let root = tree::build_tree(&path, &options);
            if json {
                let serialized = serde_json::to_string_pretty(&Node::Directory(root))
                    .map_err(|e| Error::Config(format!("Cannot serialize tree: {}", e)))?;
                println!("{}", serialized);
            } else {
                print_tree(&root);
            }
        }

        Command::Cat { path, max_size } => {
            let text = content::read_file_content_with_limit(&path, max_size)?;
            print!("{}", text);
        }

        Command::Export {
            path,
            output,
            format,
            options,
            allow,
            ignore,
            max_file_size,
        } => {
            validate_directory(&path)?;
            let export_options =
                resolve_export_options(options.as_deref(), &allow, &ignore, max_file_size)?;

            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {pos} files {wide_msg:.dim}")
                    .expect("valid progress template"),
            );
            progress.enable_steady_tick(std::time::Duration::from_millis(100));

            let exporter = Exporter::new(format, export_options, Arc::new(progress.clone()));
            let start = Instant::now();
            let report = exporter.export(&path, &output)?;
            progress.finish_and_clear();

            println!("{}", report.summary());
            println!(
                "\n{}",
                Reporter::new().export_report(&output, format, &report, start.elapsed())
            );
        }

        Command::Repos { path, max_depth } => {
            let root = match path {
                Some(path) => path,
                None => dirs::home_dir()
                    .ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?,
            };
            validate_directory(&root)?;
            let repositories = find_repositories(&root, max_depth);
            if repositories.is_empty() {
                println!("No repositories found under {}", root.display());
            }
            for repository in &repositories {
                println!("{}", repository.display());
            }
        }

        Command::Stats { path, json } => {
            validate_directory(&path)?;
            let summary = stats::analyze(&path);
            if json {
                let serialized = serde_json::to_string_pretty(&summary)
                    .map_err(|e| Error::Config(format!("Cannot serialize summary: {}", e)))?;
                println!("{}", serialized);
            } else {
                println!("{}", Reporter::new().stats_report(&path, &summary));
            }
        }
    }

    Ok(())
}

fn print_tree(root: &DirectoryNode) {
    match &root.error {
        Some(error) => println!("{}/ [{}]", root.name, error),
        None => println!("{}/", root.name),
    }
    for child in &root.children {
        print_node(child, 0);
    }
}

fn print_node(node: &Node, depth: usize) {
    let prefix = format!("{}|-- ", "  ".repeat(depth));
    match node {
        Node::Directory(dir) => {
            match &dir.error {
                Some(error) => println!("{}{}/ [{}]", prefix, dir.name, error),
                None => println!("{}{}/", prefix, dir.name),
            }
            for child in &dir.children {
                print_node(child, depth + 1);
            }
        }
        Node::File(file) => println!("{}{}", prefix, file.name),
        Node::Symlink(link) => match &link.target {
            Some(target) => println!("{}{} -> {}", prefix, link.name, target.display()),
            None => println!(
                "{}{} [{}]",
                prefix,
                link.name,
                link.error.as_deref().unwrap_or("unresolved link")
            ),
        },
        Node::Error(node) => println!("{}{} [{}]", prefix, node.name, node.error),
    }
}
