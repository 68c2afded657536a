/*!
 * repomaster - Package a repository into a single document for LLM context
 *
 * Collects the files under a set of input paths (honouring `.gitignore`),
 * renders their directory tree and text contents, and assembles them into one
 * markdown report together with the checked-out commit.
 */

pub mod config;
pub mod content;
pub mod diagnostics;
pub mod error;
pub mod filters;
pub mod git;
pub mod gitignore;
pub mod processor;
pub mod report;
pub mod scanner;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use config::{Args, Config, FileConfig};
pub use content::{classify, is_binary, render, FileSection, MAX_CONTENT_BYTES};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, MemorySink};
pub use error::{RepoMasterError, Result};
pub use filters::{FileFilters, RecentFilter};
pub use git::GitInfo;
pub use gitignore::{find_rule_set, IgnoreRuleSet};
pub use processor::{Processor, RepositoryReport};
pub use report::ScanReport;
pub use scanner::{CollectorOptions, FileCollector, DEFAULT_EXCLUDED_DIRS};
pub use types::{
    ClassifiedContent, DirectoryTree, EntryKind, FileSet, Node, PathEntry, RenderedContent,
};
pub use writer::MarkdownWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
