/*!
 * Run orchestration: collect, filter, classify, and build the report model
 */

use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::content::{self, ContentSummary};
use crate::diagnostics::DiagnosticSink;
use crate::error::{RepoMasterError, Result};
use crate::filters::FileFilters;
use crate::git::{self, GitInfo};
use crate::scanner::{CollectorOptions, FileCollector};
use crate::types::{DirectoryTree, FileSet};
use crate::utils::{absolutize, display_label, relative_inside};

/// Placeholder shown when no file lies under the base directory
pub const EMPTY_TREE: &str = "(empty)";

/// Everything the report is rendered from
#[derive(Debug, Clone)]
pub struct RepositoryReport {
    /// Directory the tree and labels are relative to
    pub base_dir: PathBuf,
    /// HEAD details, if the base directory is in a repository
    pub git: Option<GitInfo>,
    /// Files that survived collection and filtering
    pub files: FileSet,
    /// Rendered directory tree, never empty
    pub tree: String,
    /// Per-file sections and statistics
    pub content: ContentSummary,
}

/// Sequences the pipeline for one invocation
pub struct Processor<'a> {
    config: &'a Config,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> Processor<'a> {
    pub fn new(config: &'a Config, sink: &'a dyn DiagnosticSink) -> Self {
        Self { config, sink }
    }

    /// Run the pipeline
    ///
    /// Fails when the first input path does not exist or when collection
    /// finds no file at all. Every other problem is a diagnostic.
    pub fn run(&self) -> Result<RepositoryReport> {
        let inputs = self
            .config
            .paths
            .iter()
            .map(|p| absolutize(p))
            .collect::<std::io::Result<Vec<_>>>()?;

        let first = inputs.first().ok_or_else(|| {
            RepoMasterError::InvalidArgument("at least one path is required".to_string())
        })?;
        let base_dir = match fs::metadata(first) {
            Ok(meta) if meta.is_dir() => first.clone(),
            Ok(_) => first.parent().map(PathBuf::from).unwrap_or_else(|| first.clone()),
            Err(_) => return Err(RepoMasterError::PathNotFound(first.display().to_string())),
        };
        log::info!("Base directory: {}", base_dir.display());

        let filters = FileFilters::new(
            self.config.recent,
            self.config.grep.as_deref(),
            self.config.include_patterns.clone(),
        )?;

        let git = git::lookup(&base_dir);

        let options = CollectorOptions::with_ignore_rules(self.config.use_gitignore);
        let files = FileCollector::new(options, self.sink).collect(&inputs);
        if files.is_empty() {
            return Err(RepoMasterError::NoFiles);
        }

        let files = filters.apply(files, self.sink);

        let relative = files.iter().filter_map(|p| relative_inside(p, &base_dir));
        let tree = DirectoryTree::build(relative).render("");
        let tree = if tree.is_empty() {
            EMPTY_TREE.to_string()
        } else {
            tree
        };

        let content = content::summarize(&files, |p| display_label(p, &base_dir), self.sink);
        log::info!(
            "Rendered {} text files, skipped {} binary, truncated {}",
            content.stats.text_files,
            content.stats.skipped_binary,
            content.stats.truncated_files
        );

        Ok(RepositoryReport {
            base_dir,
            git,
            files,
            tree,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::filters::RecentFilter;
    use std::path::Path;
    use tempfile::tempdir;

    fn config_for(paths: Vec<PathBuf>) -> Config {
        Config {
            paths,
            ..Config::default()
        }
    }

    #[test]
    fn test_missing_first_path_is_fatal() {
        let dir = tempdir().unwrap();
        let config = config_for(vec![dir.path().join("missing")]);
        let sink = MemorySink::new();
        let err = Processor::new(&config, &sink).run().unwrap_err();
        assert!(matches!(err, RepoMasterError::PathNotFound(_)));
    }

    #[test]
    fn test_empty_collection_is_fatal() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let config = config_for(vec![dir.path().to_path_buf()]);
        let sink = MemorySink::new();
        let err = Processor::new(&config, &sink).run().unwrap_err();
        assert!(matches!(err, RepoMasterError::NoFiles));
    }

    #[test]
    fn test_invalid_grep_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let config = Config {
            grep: Some("(".to_string()),
            ..config_for(vec![dir.path().to_path_buf()])
        };
        let sink = MemorySink::new();
        let err = Processor::new(&config, &sink).run().unwrap_err();
        assert!(matches!(err, RepoMasterError::Regex(_)));
    }

    #[test]
    fn test_file_input_uses_parent_as_base() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let file = dir.path().join("only.txt");
        fs::write(&file, "x").unwrap();

        let config = config_for(vec![file]);
        let sink = MemorySink::new();
        let report = Processor::new(&config, &sink).run().unwrap();
        assert_eq!(report.base_dir, dir.path());
        assert_eq!(report.tree, "only.txt");
        assert_eq!(report.content.sections[0].label, "only.txt");
    }

    #[test]
    fn test_files_outside_base_get_no_tree_entry() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("inner");
        let outer = dir.path().join("outer");
        fs::create_dir(&inner).unwrap();
        fs::create_dir(&outer).unwrap();
        fs::write(inner.join("a.txt"), "a").unwrap();
        fs::write(outer.join("b.txt"), "b").unwrap();

        let config = config_for(vec![inner.clone(), outer]);
        let sink = MemorySink::new();
        let report = Processor::new(&config, &sink).run().unwrap();
        assert_eq!(report.tree, "a.txt");
        let labels: Vec<_> = report
            .content
            .sections
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["a.txt", "../outer/b.txt"]);
    }

    #[test]
    fn test_filters_can_empty_the_tree() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("a.txt"), "nothing to see").unwrap();

        let config = Config {
            grep: Some("needle".to_string()),
            recent: RecentFilter::Disabled,
            ..config_for(vec![dir.path().to_path_buf()])
        };
        let sink = MemorySink::new();
        let report = Processor::new(&config, &sink).run().unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.tree, EMPTY_TREE);
        assert_eq!(report.content.stats.text_files, 0);
        assert!(Path::new(&report.base_dir).is_dir());
    }
}
