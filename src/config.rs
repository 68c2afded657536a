/*!
 * Configuration handling for repomaster
 *
 * Settings come from the command line and an optional TOML file. Command-line
 * values win over file values.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use clap_complete::Shell;
use serde::Deserialize;

use crate::error::Result;
use crate::filters::RecentFilter;

/// Config file looked up in the working directory by default
pub const DEFAULT_CONFIG_FILE: &str = ".repomaster-config.toml";

/// Command-line arguments for repomaster
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "repomaster",
    version = env!("CARGO_PKG_VERSION"),
    about = "Repository Context Packager - package repo context for LLMs",
    long_about = "Collects the files under one or more paths, honouring .gitignore rules, and writes a single markdown document with the directory structure, git details and file contents, ready to be handed to a Large Language Model."
)]
pub struct Args {
    /// One or more files or directories (use . for current)
    #[clap(required_unless_present = "generate")]
    pub paths: Vec<String>,

    /// Write the report to FILE instead of stdout
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Do not load .gitignore rules or prune .git and node_modules
    #[clap(long)]
    pub no_gitignore: bool,

    /// Only include files modified in the last DAYS days (7 when bare; give DAYS as --recent=DAYS)
    #[clap(
        short,
        long,
        value_name = "DAYS",
        num_args = 0..=1,
        require_equals = true
    )]
    pub recent: Option<Option<u64>>,

    /// Only include files whose content matches PATTERN (case-insensitive regex)
    #[clap(short, long, value_name = "PATTERN")]
    pub grep: Option<String>,

    /// Comma-separated file name globs to include (e.g. "*.rs,*.toml")
    #[clap(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Prefix file content lines with line numbers
    #[clap(short = 'l', long)]
    pub line_numbers: bool,

    /// Path to the TOML config file
    #[clap(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence all logging, including skip diagnostics
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Log level implied by `-q` and `-v`
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Off;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// `recent` in the config file: either a switch or a day count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecentSetting {
    Flag(bool),
    Days(u64),
}

impl From<RecentSetting> for RecentFilter {
    fn from(setting: RecentSetting) -> Self {
        match setting {
            RecentSetting::Flag(true) => RecentFilter::DefaultDays,
            RecentSetting::Flag(false) => RecentFilter::Disabled,
            RecentSetting::Days(n) => RecentFilter::Days(n),
        }
    }
}

/// Contents of the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub output: Option<String>,
    pub no_git_ignore: Option<bool>,
    pub line_numbers: Option<bool>,
    pub recent: Option<RecentSetting>,
    pub grep: Option<String>,
    /// Comma-separated globs
    pub include: Option<String>,
}

impl FileConfig {
    /// Parse config file text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the config file at `path`
    ///
    /// A missing file gives the defaults. A file that cannot be read or
    /// parsed is logged and also gives the defaults.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config file at {}", path.display());
                return Self::default();
            }
            Err(e) => {
                log::error!("Could not read config file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::parse(&content) {
            Ok(config) => {
                log::debug!("Loaded config file {}", path.display());
                config
            }
            Err(e) => {
                log::error!("{}", e);
                Self::default()
            }
        }
    }

    fn include_patterns(&self) -> Vec<String> {
        self.include
            .as_deref()
            .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
            .unwrap_or_default()
    }
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Input paths as given
    pub paths: Vec<PathBuf>,

    /// Output file; stdout when unset
    pub output_file: Option<PathBuf>,

    /// Whether to honour .gitignore and the built-in exclusions
    pub use_gitignore: bool,

    /// Modification-time filter
    pub recent: RecentFilter,

    /// Content search pattern
    pub grep: Option<String>,

    /// File name globs to include (empty means all)
    pub include_patterns: Vec<String>,

    /// Number content lines
    pub line_numbers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            output_file: None,
            use_gitignore: true,
            recent: RecentFilter::Disabled,
            grep: None,
            include_patterns: Vec::new(),
            line_numbers: false,
        }
    }
}

impl Config {
    /// Merge command-line arguments over the config file
    pub fn from_args(args: Args, file: FileConfig) -> Self {
        let recent = match args.recent {
            Some(None) => RecentFilter::DefaultDays,
            Some(Some(days)) => RecentFilter::Days(days),
            None => file.recent.map(RecentFilter::from).unwrap_or_default(),
        };

        let include_patterns = if args.include.is_empty() {
            file.include_patterns()
        } else {
            args.include
        };

        Self {
            paths: args.paths.into_iter().map(PathBuf::from).collect(),
            output_file: args.output.or(file.output).map(PathBuf::from),
            use_gitignore: !(args.no_gitignore || file.no_git_ignore.unwrap_or(false)),
            recent,
            grep: args.grep.or(file.grep),
            include_patterns,
            line_numbers: args.line_numbers || file.line_numbers.unwrap_or(false),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            crate::bail!(InvalidArgument, "at least one path is required");
        }

        if let Some(parent) = self.output_file.as_deref().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                crate::bail!(Config, "Output directory not found: {}", parent.display());
            }
        }

        Ok(())
    }
}
