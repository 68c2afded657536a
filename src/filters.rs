/*!
 * Post-collection filters
 *
 * Filters only ever narrow a [`FileSet`]. A file a filter cannot evaluate is
 * reported and dropped.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use glob_match::glob_match;
use regex::{Regex, RegexBuilder};

use crate::content::is_binary;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::Result;
use crate::types::FileSet;

/// Window used when recency filtering is requested without a day count
pub const DEFAULT_RECENT_DAYS: u64 = 7;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Modification-time filter setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecentFilter {
    /// Keep every file
    #[default]
    Disabled,
    /// Keep files modified in the last [`DEFAULT_RECENT_DAYS`] days
    DefaultDays,
    /// Keep files modified in the last `n` days
    Days(u64),
}

impl RecentFilter {
    /// Day window, or `None` when disabled
    ///
    /// A zero-day window falls back to the default.
    pub fn days(&self) -> Option<u64> {
        match *self {
            Self::Disabled => None,
            Self::DefaultDays | Self::Days(0) => Some(DEFAULT_RECENT_DAYS),
            Self::Days(n) => Some(n),
        }
    }

    /// Oldest modification time still kept, relative to `now`
    pub fn cutoff(&self, now: SystemTime) -> Option<SystemTime> {
        let days = self.days()?;
        let window = Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY));
        Some(now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH))
    }
}

/// The set of filters applied after collection
#[derive(Debug, Clone, Default)]
pub struct FileFilters {
    recent: RecentFilter,
    grep: Option<Regex>,
    include: Vec<String>,
}

impl FileFilters {
    /// Build filters; `grep` is compiled as a case-insensitive regex
    pub fn new(recent: RecentFilter, grep: Option<&str>, include: Vec<String>) -> Result<Self> {
        let grep = grep
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
            .transpose()?;
        let include = include
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Self {
            recent,
            grep,
            include,
        })
    }

    /// Whether any filter would narrow the set
    pub fn is_active(&self) -> bool {
        self.recent != RecentFilter::Disabled || self.grep.is_some() || !self.include.is_empty()
    }

    /// Apply include globs, then recency, then content search
    pub fn apply(&self, files: FileSet, sink: &dyn DiagnosticSink) -> FileSet {
        let before = files.len();
        let mut files = files;

        if !self.include.is_empty() {
            files = files.narrow(|path| self.is_included(path));
        }

        if let Some(cutoff) = self.recent.cutoff(SystemTime::now()) {
            files = narrow_checked(files, "recent files", sink, |path| {
                Ok(modified_time(path)? > cutoff)
            });
        }

        if let Some(pattern) = &self.grep {
            files = narrow_checked(files, "content search", sink, |path| {
                contains_match(path, pattern)
            });
        }

        if self.is_active() {
            log::info!("Filters kept {} of {} files", files.len(), before);
        }
        files
    }

    /// File name matches at least one include glob
    fn is_included(&self, path: &Path) -> bool {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        self.include
            .iter()
            .any(|pattern| glob_match(pattern, &file_name))
    }
}

/// Narrow `files` with a check that may fail; failures drop the file
fn narrow_checked<F>(
    files: FileSet,
    filter: &'static str,
    sink: &dyn DiagnosticSink,
    mut check: F,
) -> FileSet
where
    F: FnMut(&Path) -> io::Result<bool>,
{
    files.narrow(|path| match check(path) {
        Ok(keep) => keep,
        Err(e) => {
            sink.emit(Diagnostic::FilterFailed {
                filter,
                path: PathBuf::from(path),
                reason: e.to_string(),
            });
            false
        }
    })
}

fn modified_time(path: &Path) -> io::Result<SystemTime> {
    let metadata = fs::metadata(path)?;
    metadata.modified().or_else(|_| metadata.created())
}

/// Search the whole file; binary files never match
fn contains_match(path: &Path, pattern: &Regex) -> io::Result<bool> {
    let bytes = fs::read(path)?;
    if is_binary(&bytes) {
        return Ok(false);
    }
    Ok(pattern.is_match(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use filetime::FileTime;
    use tempfile::tempdir;

    #[test]
    fn test_recent_days() {
        assert_eq!(RecentFilter::Disabled.days(), None);
        assert_eq!(RecentFilter::DefaultDays.days(), Some(7));
        assert_eq!(RecentFilter::Days(3).days(), Some(3));
        assert_eq!(RecentFilter::Days(0).days(), Some(7));
    }

    #[test]
    fn test_recent_cutoff() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10 * SECONDS_PER_DAY);
        assert_eq!(RecentFilter::Disabled.cutoff(now), None);
        assert_eq!(
            RecentFilter::Days(2).cutoff(now),
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(8 * SECONDS_PER_DAY))
        );
    }

    #[test]
    fn test_recent_filter_drops_old_files() {
        let dir = tempdir().unwrap();
        let fresh = dir.path().join("fresh.txt");
        let stale = dir.path().join("stale.txt");
        fs::write(&fresh, "new").unwrap();
        fs::write(&stale, "old").unwrap();

        let thirty_days_ago = SystemTime::now() - Duration::from_secs(30 * SECONDS_PER_DAY);
        filetime::set_file_mtime(&stale, FileTime::from_system_time(thirty_days_ago)).unwrap();

        let filters = FileFilters::new(RecentFilter::DefaultDays, None, vec![]).unwrap();
        let sink = MemorySink::new();
        let kept = filters.apply(FileSet::from_paths(vec![fresh.clone(), stale]), &sink);
        assert_eq!(kept.paths(), &[fresh]);

        let filters = FileFilters::new(RecentFilter::Days(60), None, vec![]).unwrap();
        let files = FileSet::from_paths(vec![
            dir.path().join("fresh.txt"),
            dir.path().join("stale.txt"),
        ]);
        assert_eq!(filters.apply(files, &sink).len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_grep_is_case_insensitive_and_skips_binary() {
        let dir = tempdir().unwrap();
        let hit = dir.path().join("hit.rs");
        let miss = dir.path().join("miss.rs");
        let binary = dir.path().join("blob.bin");
        fs::write(&hit, "// todo: fix this").unwrap();
        fs::write(&miss, "fn main() {}").unwrap();
        fs::write(&binary, b"TODO\0\0\0").unwrap();

        let filters = FileFilters::new(RecentFilter::Disabled, Some("TODO"), vec![]).unwrap();
        let sink = MemorySink::new();
        let kept = filters.apply(FileSet::from_paths(vec![hit.clone(), miss, binary]), &sink);
        assert_eq!(kept.paths(), &[hit]);
    }

    #[test]
    fn test_grep_failure_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.txt");

        let filters = FileFilters::new(RecentFilter::Disabled, Some("x"), vec![]).unwrap();
        let sink = MemorySink::new();
        let kept = filters.apply(FileSet::from_paths(vec![missing.clone()]), &sink);
        assert!(kept.is_empty());

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            Diagnostic::FilterFailed { filter: "content search", path, .. } if *path == missing
        ));
    }

    #[test]
    fn test_invalid_grep_pattern() {
        assert!(FileFilters::new(RecentFilter::Disabled, Some("(unclosed"), vec![]).is_err());
    }

    #[test]
    fn test_include_globs() {
        let files = FileSet::from_paths(vec![
            PathBuf::from("/p/a.js"),
            PathBuf::from("/p/b.py"),
            PathBuf::from("/p/c.md"),
        ]);
        let filters = FileFilters::new(
            RecentFilter::Disabled,
            None,
            vec!["*.js".to_string(), " *.py ".to_string(), String::new()],
        )
        .unwrap();
        let sink = MemorySink::new();
        let kept = filters.apply(files, &sink);
        assert_eq!(
            kept.paths(),
            &[PathBuf::from("/p/a.js"), PathBuf::from("/p/b.py")]
        );
    }

    #[test]
    fn test_inactive_filters_keep_everything() {
        let files = FileSet::from_paths(vec![PathBuf::from("/does/not/exist")]);
        let filters = FileFilters::default();
        assert!(!filters.is_active());
        let sink = MemorySink::new();
        assert_eq!(filters.apply(files.clone(), &sink), files);
    }
}
