/*!
 * Input path resolution and recursive file collection
 */

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::gitignore::{find_rule_set, IgnoreRuleSet};
use crate::types::{EntryKind, FileSet, PathEntry};

/// Directories pruned whenever ignore rules are in use
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "node_modules"];

/// Collector configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Load the nearest rules file and prune built-in directories
    pub use_ignore_rules: bool,
    /// Directory names pruned when `use_ignore_rules` is set
    pub excluded_dirs: Vec<String>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            use_ignore_rules: true,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl CollectorOptions {
    /// Default exclusions with ignore rules toggled
    pub fn with_ignore_rules(use_ignore_rules: bool) -> Self {
        Self {
            use_ignore_rules,
            ..Self::default()
        }
    }
}

/// Turns input paths into a deduplicated, sorted set of files
pub struct FileCollector<'a> {
    options: CollectorOptions,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> FileCollector<'a> {
    /// Create a new collector
    pub fn new(options: CollectorOptions, sink: &'a dyn DiagnosticSink) -> Self {
        Self { options, sink }
    }

    /// Collect every regular file reachable from `inputs`
    ///
    /// Inputs are expected to be absolute. Missing inputs, unreadable
    /// directories and unresolvable entries are reported and skipped; the
    /// result may be empty but collection never fails.
    pub fn collect(&self, inputs: &[PathBuf]) -> FileSet {
        let rules = if self.options.use_ignore_rules {
            self.load_rules(inputs)
        } else {
            None
        };

        if let Some(rules) = &rules {
            log::info!("Using ignore rules from {}", rules.base_dir().display());
        }

        let mut found = Vec::new();
        for input in inputs {
            let entry = match PathEntry::resolve(input) {
                Ok(entry) => entry,
                Err(e) => {
                    self.sink.emit(Diagnostic::Inaccessible {
                        path: input.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Some(rules) = &rules {
                if rules.matches(&entry.path, entry.is_dir()) {
                    self.sink.emit(Diagnostic::IgnoredInput { path: entry.path });
                    continue;
                }
            }

            match entry.kind {
                EntryKind::Directory => self.walk_dir(&entry.path, rules.as_ref(), &mut found),
                EntryKind::File => found.push(entry.path),
                EntryKind::Other => {
                    log::debug!("Skipping special file {}", entry.path.display());
                }
            }
        }

        let files = FileSet::from_paths(found);
        log::info!("Collected {} files", files.len());
        files
    }

    /// Rule set for the run, looked up from the first input's directory
    fn load_rules(&self, inputs: &[PathBuf]) -> Option<IgnoreRuleSet> {
        let first = inputs.first()?;
        let start_dir = if first.is_dir() {
            first.as_path()
        } else {
            first.parent()?
        };
        find_rule_set(start_dir, self.sink)
    }

    /// Recursively gather files under `dir`, following symbolic links
    fn walk_dir(&self, dir: &Path, rules: Option<&IgnoreRuleSet>, found: &mut Vec<PathBuf>) {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| !self.is_pruned(entry, rules));

        for result in walker {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        found.push(entry.into_path());
                    }
                }
                Err(e) => self.report_walk_error(e),
            }
        }
    }

    /// Whether an entry is excluded; excluded directories are not descended
    fn is_pruned(&self, entry: &DirEntry, rules: Option<&IgnoreRuleSet>) -> bool {
        if !self.options.use_ignore_rules {
            return false;
        }

        let is_dir = entry.file_type().is_dir();
        if is_dir {
            let name = entry.file_name().to_string_lossy();
            if self.options.excluded_dirs.iter().any(|d| *d == name) {
                log::trace!("Pruning built-in excluded directory {}", entry.path().display());
                return true;
            }
        }

        match rules {
            Some(rules) if rules.matches(entry.path(), is_dir) => {
                log::trace!("Ignored by rules: {}", entry.path().display());
                true
            }
            _ => false,
        }
    }

    fn report_walk_error(&self, error: walkdir::Error) {
        let path = error.path().map(Path::to_path_buf).unwrap_or_default();
        let reason = match error.loop_ancestor() {
            Some(ancestor) => format!("filesystem loop back to {}", ancestor.display()),
            None => error
                .io_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| error.to_string()),
        };

        if error.loop_ancestor().is_none() && path.is_dir() {
            self.sink.emit(Diagnostic::UnreadableDir { path, reason });
        } else {
            self.sink.emit(Diagnostic::Unstatable { path, reason });
        }
    }
}
