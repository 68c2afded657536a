/*!
 * Ignore-rule discovery and matching
 *
 * A run uses at most one rule set: the nearest `.gitignore` found walking up
 * from the starting directory, stopping at a repository root. Patterns are
 * compiled with the `ignore` crate so negation, directory-only patterns,
 * anchoring and globs follow git's semantics.
 */

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Name of the rules file looked up in each directory
pub const RULES_FILE_NAME: &str = ".gitignore";

/// Directory marking a repository root; the search never goes above it
pub const REPO_MARKER_DIR: &str = ".git";

/// Compiled ignore rules anchored at a base directory
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    base_dir: PathBuf,
    matcher: Gitignore,
}

impl IgnoreRuleSet {
    /// Compile rules from the text of a rules file
    ///
    /// The repository metadata directory is appended last so no negation in
    /// the file can re-include it.
    pub fn from_content(base_dir: &Path, content: &str) -> Result<Self, ignore::Error> {
        let source = base_dir.join(RULES_FILE_NAME);
        let mut builder = GitignoreBuilder::new(base_dir);
        for line in content.lines() {
            builder.add_line(Some(source.clone()), line)?;
        }
        builder.add_line(None, REPO_MARKER_DIR)?;

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            matcher: builder.build()?,
        })
    }

    /// Load the rules file of `dir`, if it has one
    ///
    /// A missing file is silent. A file that cannot be read or compiled is
    /// reported and treated as absent.
    pub fn load(dir: &Path, sink: &dyn DiagnosticSink) -> Option<Self> {
        let rules_path = dir.join(RULES_FILE_NAME);
        let bytes = match fs::read(&rules_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                sink.emit(Diagnostic::RulesFile {
                    path: rules_path,
                    reason: e.to_string(),
                });
                return None;
            }
        };

        match Self::from_content(dir, &String::from_utf8_lossy(&bytes)) {
            Ok(rules) => {
                log::debug!(
                    "Loaded {} ignore rules from {}",
                    rules.matcher.num_ignores() + rules.matcher.num_whitelists(),
                    rules_path.display()
                );
                Some(rules)
            }
            Err(e) => {
                sink.emit(Diagnostic::RulesFile {
                    path: rules_path,
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Directory all patterns are evaluated relative to
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Whether `path` is excluded by the rules
    ///
    /// The base directory itself is never excluded, and neither is anything
    /// outside of it. A path is also excluded when one of its parent
    /// directories is.
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        let relative = match path.strip_prefix(&self.base_dir) {
            Ok(rel) if rel.as_os_str().is_empty() => return false,
            Ok(rel) => rel,
            Err(_) => return false,
        };

        let normalized = to_slash(relative);
        self.matcher
            .matched_path_or_any_parents(Path::new(normalized.as_ref()), is_dir)
            .is_ignore()
    }
}

/// Render a relative path with forward slashes
fn to_slash(path: &Path) -> Cow<'_, str> {
    let lossy = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        lossy
    } else {
        Cow::Owned(lossy.replace(MAIN_SEPARATOR, "/"))
    }
}

/// Find the nearest rule set walking up from `start_dir`
///
/// Stops without a result at the first directory holding a repository marker
/// and never inspects the filesystem root.
pub fn find_rule_set(start_dir: &Path, sink: &dyn DiagnosticSink) -> Option<IgnoreRuleSet> {
    let mut current = start_dir;

    while let Some(parent) = current.parent() {
        if let Some(rules) = IgnoreRuleSet::load(current, sink) {
            return Some(rules);
        }

        if current.join(REPO_MARKER_DIR).is_dir() {
            log::debug!(
                "Reached repository root {} without a rules file",
                current.display()
            );
            return None;
        }

        current = parent;
    }

    None
}
