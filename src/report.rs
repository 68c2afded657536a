/*!
 * Console summary shown after writing a report to a file
 *
 * Uses the tabled library for table rendering. Nothing here is printed when
 * the report itself goes to stdout.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::processor::RepositoryReport;

/// Files listed individually before switching to a top-N view
const MAX_LISTED_FILES: usize = 15;

/// Files shown in the top-N view
const TOP_FILES: usize = 10;

/// Per-file figures for the files table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Label of the file in the report
    pub path: String,
    /// Number of lines rendered
    pub lines: usize,
    /// Number of characters rendered
    pub chars: usize,
}

/// Statistics for a finished run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Output file path
    pub output_file: String,
    /// Time taken for the whole run
    pub duration: Duration,
    /// Text files rendered
    pub files_processed: usize,
    /// Binary files skipped
    pub skipped_binary: usize,
    /// Files cut at the byte budget
    pub truncated_files: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each rendered file
    pub file_details: Vec<FileReportInfo>,
}

impl ScanReport {
    /// Gather statistics from a finished run
    pub fn from_report(
        report: &RepositoryReport,
        output_file: String,
        duration: Duration,
    ) -> Self {
        let file_details: Vec<FileReportInfo> = report
            .content
            .sections
            .iter()
            .map(|s| FileReportInfo {
                path: s.label.clone(),
                lines: s.rendered.line_count,
                chars: s.rendered.content.chars().count(),
            })
            .collect();
        let stats = report.content.stats;

        Self {
            output_file,
            duration,
            files_processed: stats.text_files,
            skipped_binary: stats.skipped_binary,
            truncated_files: stats.truncated_files,
            total_lines: stats.total_lines,
            total_chars: file_details.iter().map(|f| f.chars).sum(),
            file_details,
        }
    }
}

/// Format a number with human-readable units
fn format_number(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

fn summary_table(report: &ScanReport) -> String {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Metric")]
        key: &'static str,

        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = vec![
        SummaryRow {
            key: "Output File",
            value: report.output_file.clone(),
        },
        SummaryRow {
            key: "Process Time",
            value: format!("{:.4?}", report.duration),
        },
        SummaryRow {
            key: "Files Processed",
            value: format_number(report.files_processed),
        },
        SummaryRow {
            key: "Binary Skipped",
            value: format_number(report.skipped_binary),
        },
        SummaryRow {
            key: "Truncated",
            value: format_number(report.truncated_files),
        },
        SummaryRow {
            key: "Total Lines",
            value: format_number(report.total_lines),
        },
        SummaryRow {
            key: "LLM Tokens",
            value: format!("{} tokens (estimated)", format_number(report.total_chars / 4)),
        },
    ];

    styled(Table::new(rows))
}

fn files_table(report: &ScanReport) -> String {
    #[derive(Tabled)]
    struct FileRow {
        #[tabled(rename = "File Path")]
        path: String,

        #[tabled(rename = "Lines")]
        lines: String,

        #[tabled(rename = "Est. Tokens")]
        tokens: String,
    }

    let mut files: Vec<&FileReportInfo> = report.file_details.iter().collect();
    files.sort_by(|a, b| b.chars.cmp(&a.chars).then_with(|| a.path.cmp(&b.path)));
    if files.len() > MAX_LISTED_FILES {
        files.truncate(TOP_FILES);
    }

    let rows: Vec<FileRow> = files
        .into_iter()
        .map(|info| FileRow {
            path: info.path.clone(),
            lines: format_number(info.lines),
            tokens: format_number(info.chars / 4),
        })
        .collect();

    styled(Table::new(rows))
}

/// Render the files table followed by the summary table
pub fn generate_report(report: &ScanReport) -> String {
    let files_title = if report.file_details.len() > MAX_LISTED_FILES {
        "TOP 10 LARGEST FILES BY CHARACTER COUNT"
    } else {
        "PROCESSED FILES"
    };

    format!(
        "{}\n{}\n\n{}\n{}",
        files_title,
        files_table(report),
        "SUMMARY",
        summary_table(report)
    )
}

/// Print the report to stdout
pub fn print_report(report: &ScanReport) {
    println!("\n{}", generate_report(report));
}
