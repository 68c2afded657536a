/*!
 * Path helpers for repomaster
 */

use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and fold `.`/`..`
///
/// Purely lexical: symbolic links are left in place and the path does not
/// need to exist.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };
    Ok(normalize(&joined))
}

/// Remove `.` components and resolve `..` against preceding components
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Path of `path` relative to `base`, possibly climbing with `..`
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    pathdiff::diff_paths(path, base)
}

/// Relative form of a path strictly inside `base`, with `/` separators
pub fn relative_inside(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

/// Label of a file in the report: relative to `base`, or its file name
pub fn display_label(path: &Path, base: &Path) -> String {
    match relative_to(path, base) {
        Some(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().into_owned(),
        _ => path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned(),
    }
}
