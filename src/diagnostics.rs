/*!
 * Diagnostics for skipped paths
 *
 * Every skip event is reported to a sink instead of aborting the run. The
 * binary uses [`LogSink`]; tests use [`MemorySink`] to assert on what was
 * reported.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A non-fatal event raised while collecting or reading files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An input path does not exist or cannot be accessed
    Inaccessible { path: PathBuf, reason: String },
    /// An input path was excluded by the ignore rules
    IgnoredInput { path: PathBuf },
    /// A directory could not be listed
    UnreadableDir { path: PathBuf, reason: String },
    /// A directory entry could not be resolved
    Unstatable { path: PathBuf, reason: String },
    /// A rules file exists but could not be read or parsed
    RulesFile { path: PathBuf, reason: String },
    /// A file could not be read for its content
    UnreadableFile { path: PathBuf, reason: String },
    /// A filter failed to evaluate a file
    FilterFailed {
        filter: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl Diagnostic {
    /// Path the diagnostic refers to
    pub fn path(&self) -> &Path {
        match self {
            Self::Inaccessible { path, .. }
            | Self::IgnoredInput { path }
            | Self::UnreadableDir { path, .. }
            | Self::Unstatable { path, .. }
            | Self::RulesFile { path, .. }
            | Self::UnreadableFile { path, .. }
            | Self::FilterFailed { path, .. } => path,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inaccessible { path, reason } => {
                write!(f, "[skip] Cannot access: {}: {}", path.display(), reason)
            }
            Self::IgnoredInput { path } => {
                write!(f, "[gitignore] Skipping: {}", path.display())
            }
            Self::UnreadableDir { path, reason } => {
                write!(f, "[skip] Cannot read dir: {}: {}", path.display(), reason)
            }
            Self::Unstatable { path, reason } => {
                write!(f, "[skip] Cannot stat: {}: {}", path.display(), reason)
            }
            Self::RulesFile { path, reason } => {
                write!(f, "Could not read {}: {}", path.display(), reason)
            }
            Self::UnreadableFile { path, reason } => {
                write!(f, "[skip] Cannot read: {}: {}", path.display(), reason)
            }
            Self::FilterFailed {
                filter,
                path,
                reason,
            } => write!(
                f,
                "[skip] Cannot process for {}: {}: {}",
                filter,
                path.display(),
                reason
            ),
        }
    }
}

/// Receiver of diagnostics
pub trait DiagnosticSink: Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::debug!("recorded diagnostic: {}", diagnostic);
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}
