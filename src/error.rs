//! Global error handling for repomaster
//!
//! Per-path problems inside the collector, matcher and classifier are reported
//! through the diagnostic sink instead. Only run-level failures end up here.

use std::io;
use thiserror::Error;

/// Global error type for repomaster operations
#[derive(Error, Debug)]
pub enum RepoMasterError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML config file could not be parsed
    #[error("Error parsing TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Regular expression errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Git lookup errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Path not found
    #[error("Path does not exist - {0}")]
    PathNotFound(String),

    /// Nothing survived collection
    #[error("No valid files found")]
    NoFiles,

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for repomaster operations
pub type Result<T> = std::result::Result<T, RepoMasterError>;

/// Creates a RepoMasterError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::RepoMasterError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}
