/*!
 * Console rendering of analysis and export summaries
 *
 * Uses the tabled library for clean, consistent table output.
 */

use std::path::Path;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::export::{ExportFormat, ExportReport};
use crate::stats::RepoStatsSummary;
use crate::utils::format_bytes;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct LanguageRow {
    #[tabled(rename = "Language")]
    name: String,

    #[tabled(rename = "Files")]
    count: usize,

    #[tabled(rename = "Share")]
    share: String,
}

/// Report generator for console output
#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    /// Create a new reporter.
    pub fn new() -> Self {
        Self
    }

    /// Render a repository statistics summary.
    pub fn stats_report(&self, root: &Path, summary: &RepoStatsSummary) -> String {
        let rows = vec![
            SummaryRow {
                key: "Repository".to_string(),
                value: root.display().to_string(),
            },
            SummaryRow {
                key: "Files".to_string(),
                value: summary.files.to_string(),
            },
            SummaryRow {
                key: "Directories".to_string(),
                value: summary.directories.to_string(),
            },
            SummaryRow {
                key: "Total Size".to_string(),
                value: summary.size.clone(),
            },
        ];

        let mut output = style(Table::new(rows)).to_string();

        if !summary.languages.is_empty() {
            let language_rows: Vec<LanguageRow> = summary
                .languages
                .iter()
                .map(|language| LanguageRow {
                    name: language.name.clone(),
                    count: language.count,
                    share: format!("{}%", language.percentage),
                })
                .collect();
            output.push_str("\n\n");
            output.push_str(&style(Table::new(language_rows)).to_string());
        }

        output
    }

    /// Render an export completion summary.
    pub fn export_report(
        &self,
        destination: &Path,
        format: ExportFormat,
        report: &ExportReport,
        duration: Duration,
    ) -> String {
        let rows = vec![
            SummaryRow {
                key: "Destination".to_string(),
                value: destination.display().to_string(),
            },
            SummaryRow {
                key: "Format".to_string(),
                value: format.to_string(),
            },
            SummaryRow {
                key: "Files Processed".to_string(),
                value: report.files_processed.to_string(),
            },
            SummaryRow {
                key: "Files Skipped".to_string(),
                value: report.files_skipped.to_string(),
            },
            SummaryRow {
                key: "Total Size".to_string(),
                value: format_bytes(report.total_bytes),
            },
            SummaryRow {
                key: "Process Time".to_string(),
                value: format!("{:.4?}", duration),
            },
        ];

        style(Table::new(rows)).to_string()
    }
}

fn style(mut table: Table) -> Table {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table
}
