/*!
 * Core types and data structures for repomaster
 */

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a filesystem entry, resolved through symbolic links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Sockets, fifos, devices
    Other,
}

impl From<fs::FileType> for EntryKind {
    fn from(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// An absolute path together with the kind of the entry it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Absolute path
    pub path: PathBuf,
    /// Kind after following symbolic links
    pub kind: EntryKind,
}

impl PathEntry {
    /// Stat `path`, following symbolic links to their target
    pub fn resolve(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            kind: metadata.file_type().into(),
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Deduplicated set of absolute file paths in byte order
///
/// Built once by the collector. Afterwards it can only be narrowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    /// Build a set from paths, dropping duplicates and sorting
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut seen = HashSet::new();
        let mut paths: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        paths.sort_by(|a, b| {
            a.as_os_str()
                .as_encoded_bytes()
                .cmp(b.as_os_str().as_encoded_bytes())
        });
        Self { paths }
    }

    /// Keep only the paths for which `keep` returns true
    pub fn narrow<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&Path) -> bool,
    {
        Self {
            paths: self.paths.into_iter().filter(|p| keep(p)).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for FileSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// A node of a directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A file
    Leaf,
    /// A subdirectory and its children
    Directory(DirectoryTree),
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }
}

/// Mapping from path segment name to child node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTree {
    pub(crate) children: BTreeMap<String, Node>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }
}

/// Decoded view of a text file's bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    /// UTF-8 text, lossily decoded
    pub content: String,
    /// Set when the raw bytes exceeded the byte budget
    pub truncated: bool,
    /// Newline-separated segment count of `content`
    pub line_count: usize,
}

/// Result of classifying a file's bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedContent {
    /// Binary data, never rendered
    Binary,
    /// Text data
    Text(RenderedContent),
}

impl ClassifiedContent {
    pub fn is_binary(&self) -> bool {
        matches!(self, ClassifiedContent::Binary)
    }
}
