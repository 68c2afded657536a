/*!
 * Markdown writer for repomaster reports
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::Config;
use crate::git;
use crate::processor::RepositoryReport;

/// Renders a [`RepositoryReport`] and sends it to its destination
pub struct MarkdownWriter {
    /// Writer configuration
    config: Config,
}

impl MarkdownWriter {
    /// Create a new markdown writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Render the full report document
    pub fn render(&self, report: &RepositoryReport) -> String {
        let sections: Vec<String> = report
            .content
            .sections
            .iter()
            .map(|s| s.to_markdown(self.config.line_numbers))
            .collect();

        [
            "# Repository Context".to_string(),
            String::new(),
            "## File System Location".to_string(),
            report.base_dir.display().to_string(),
            String::new(),
            "## Git Info".to_string(),
            git::describe(report.git.as_ref()),
            String::new(),
            "## Structure".to_string(),
            "```".to_string(),
            report.tree.clone(),
            "```".to_string(),
            String::new(),
            "## File Contents".to_string(),
            sections.join("\n"),
            String::new(),
            "## Summary".to_string(),
            format!("- Total files: {}", report.content.stats.text_files),
            format!("- Total lines: {}", report.content.stats.total_lines),
            String::new(),
        ]
        .join("\n")
    }

    /// Write the report to the configured output file, or stdout
    pub fn write(&self, report: &RepositoryReport) -> io::Result<()> {
        let document = self.render(report);
        match &self.config.output_file {
            Some(path) => self.write_file(path, &document),
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(document.as_bytes())?;
                handle.flush()
            }
        }
    }

    fn write_file(&self, path: &Path, document: &str) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(document.as_bytes())?;
        writer.flush()?;
        log::info!("Wrote {} bytes to {}", document.len(), path.display());
        Ok(())
    }
}
