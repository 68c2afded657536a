/*!
 * Text/binary classification and bounded rendering of file contents
 */

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::types::{ClassifiedContent, FileSet, RenderedContent};

/// Number of leading bytes inspected by [`is_binary`]
pub const BINARY_SAMPLE_SIZE: usize = 8000;

/// Byte budget for rendered file content
pub const MAX_CONTENT_BYTES: usize = 16 * 1024;

/// Fraction of suspicious bytes above which a buffer counts as binary
const SUSPICIOUS_RATIO: f64 = 0.3;

/// Heuristic binary detection over the first [`BINARY_SAMPLE_SIZE`] bytes
///
/// Any NUL byte means binary. Otherwise the buffer is binary when more than
/// 30% of the sample lies outside tab, LF, CR and printable ASCII. UTF-8 text
/// heavy in non-ASCII characters can be misjudged as binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(BINARY_SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }

    let mut suspicious = 0usize;
    for &b in sample {
        if b == 0 {
            return true;
        }
        if !matches!(b, b'\t' | b'\n' | b'\r' | 32..=126) {
            suspicious += 1;
        }
    }

    suspicious as f64 / sample.len() as f64 > SUSPICIOUS_RATIO
}

/// Decode at most `max_bytes` of `bytes` as UTF-8
///
/// Invalid sequences, including a character cut in half by the budget, are
/// replaced with U+FFFD.
pub fn render(bytes: &[u8], max_bytes: usize) -> RenderedContent {
    let truncated = bytes.len() > max_bytes;
    let window = if truncated { &bytes[..max_bytes] } else { bytes };
    let content = String::from_utf8_lossy(window).into_owned();
    let line_count = count_lines(&content);

    RenderedContent {
        content,
        truncated,
        line_count,
    }
}

/// Classify and, for text, render with the default byte budget
pub fn classify(bytes: &[u8]) -> ClassifiedContent {
    if is_binary(bytes) {
        ClassifiedContent::Binary
    } else {
        ClassifiedContent::Text(render(bytes, MAX_CONTENT_BYTES))
    }
}

/// Number of segments when splitting on `\n` or `\r\n`
///
/// A trailing terminator yields a final empty segment that is counted.
pub fn count_lines(content: &str) -> usize {
    content.bytes().filter(|&b| b == b'\n').count() + 1
}

/// Read at most `limit` bytes from the start of a file
pub fn read_bounded(path: &Path, limit: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buffer = Vec::new();
    file.take(limit as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Read enough of a file to classify it and tell whether it was truncated
pub fn classify_file(path: &Path) -> io::Result<ClassifiedContent> {
    let bytes = read_bounded(path, MAX_CONTENT_BYTES + 1)?;
    Ok(classify(&bytes))
}

/// A text file ready for the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSection {
    /// Path shown in the section header
    pub label: String,
    /// Rendered content
    pub rendered: RenderedContent,
}

impl FileSection {
    /// Render the section as a markdown fragment
    pub fn to_markdown(&self, line_numbers: bool) -> String {
        let body = if line_numbers {
            number_lines(&self.rendered.content)
        } else {
            self.rendered.content.clone()
        };

        [
            format!("\n### File: {}\n", self.label),
            "```".to_string(),
            body,
            "```".to_string(),
            if self.rendered.truncated {
                "\n> [truncated]\n".to_string()
            } else {
                String::new()
            },
        ]
        .join("\n")
    }
}

/// Prefix every line with its right-aligned 1-based number
fn number_lines(content: &str) -> String {
    let width = count_lines(content).to_string().len();
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:>width$} | {}", i + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Aggregate counters over the processed files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentStatistics {
    /// Text files rendered into sections
    pub text_files: usize,
    /// Sum of line counts over rendered files
    pub total_lines: usize,
    /// Files skipped as binary
    pub skipped_binary: usize,
    /// Files cut at the byte budget
    pub truncated_files: usize,
}

/// Sections and statistics for a set of files
#[derive(Debug, Clone, Default)]
pub struct ContentSummary {
    pub sections: Vec<FileSection>,
    pub stats: ContentStatistics,
}

/// Read every file, skip binaries, and render the rest into sections
///
/// `label_for` maps an absolute path to the label used in its section header.
/// Unreadable files are reported and skipped.
pub fn summarize<F>(files: &FileSet, label_for: F, sink: &dyn DiagnosticSink) -> ContentSummary
where
    F: Fn(&Path) -> String,
{
    let mut summary = ContentSummary::default();

    for path in files.iter() {
        let classified = match classify_file(path) {
            Ok(classified) => classified,
            Err(e) => {
                sink.emit(Diagnostic::UnreadableFile {
                    path: PathBuf::from(path),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let rendered = match classified {
            ClassifiedContent::Binary => {
                log::debug!("Skipping binary file {}", path.display());
                summary.stats.skipped_binary += 1;
                continue;
            }
            ClassifiedContent::Text(rendered) => rendered,
        };

        if rendered.truncated {
            summary.stats.truncated_files += 1;
        }
        summary.stats.text_files += 1;
        summary.stats.total_lines += rendered.line_count;
        summary.sections.push(FileSection {
            label: label_for(path),
            rendered,
        });
    }

    summary
}
