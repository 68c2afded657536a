/*!
 * Version-control metadata lookup
 */

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset, TimeZone};
use git2::Repository;

use crate::error::Result;

/// Details of the commit checked out in a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    /// Full commit id of HEAD
    pub commit: String,
    /// Short branch name, `HEAD` when detached
    pub branch: String,
    /// `name <email>` of the commit author
    pub author: String,
    /// Committer date in git's default format
    pub date: String,
}

impl fmt::Display for GitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Commit: {}", self.commit)?;
        writeln!(f, "- Branch: {}", self.branch)?;
        writeln!(f, "- Author: {}", self.author)?;
        write!(f, "- Date: {}", self.date)
    }
}

/// Look up the HEAD commit of the repository containing `dir`
///
/// Any failure, including `dir` not being inside a repository, yields `None`.
pub fn lookup(dir: &Path) -> Option<GitInfo> {
    match read_head(dir) {
        Ok(info) => Some(info),
        Err(e) => {
            log::debug!("No git info for {}: {}", dir.display(), e);
            None
        }
    }
}

fn read_head(dir: &Path) -> Result<GitInfo> {
    let repo = Repository::discover(dir)?;
    let head = repo.head()?;
    let commit = head.peel_to_commit()?;

    let branch = if repo.head_detached()? {
        "HEAD".to_string()
    } else {
        head.shorthand().unwrap_or("HEAD").to_string()
    };

    let author = commit.author();
    let author = format!(
        "{} <{}>",
        author.name().unwrap_or_default(),
        author.email().unwrap_or_default()
    );

    let committed = commit.committer().when();

    Ok(GitInfo {
        commit: commit.id().to_string(),
        branch,
        author,
        date: format_git_date(committed.seconds(), committed.offset_minutes()),
    })
}

/// Format a timestamp the way `git show --format=%cd` does by default
pub fn format_git_date(seconds: i64, offset_minutes: i32) -> String {
    let time: Option<DateTime<FixedOffset>> = FixedOffset::east_opt(offset_minutes * 60)
        .and_then(|offset| offset.timestamp_opt(seconds, 0).single());

    match time {
        Some(time) => time.format("%a %b %-d %H:%M:%S %Y %z").to_string(),
        None => seconds.to_string(),
    }
}

/// Markdown lines for the report's git section
pub fn describe(info: Option<&GitInfo>) -> String {
    match info {
        Some(info) => info.to_string(),
        None => "- Not a git repository".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_git_date() {
        assert_eq!(format_git_date(0, 0), "Thu Jan 1 00:00:00 1970 +0000");
        assert_eq!(
            format_git_date(1_700_000_000, 120),
            "Wed Nov 15 00:13:20 2023 +0200"
        );
        assert_eq!(
            format_git_date(1_700_000_000, -300),
            "Tue Nov 14 17:13:20 2023 -0500"
        );
    }

    #[test]
    fn test_not_a_repository() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(lookup(dir.path()), None);
        assert_eq!(describe(None), "- Not a git repository");
    }

    #[test]
    fn test_lookup_commit() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let when = git2::Time::new(1_700_000_000, 0);
        let sig = git2::Signature::new("Test User", "test@example.com", &when).unwrap();
        let commit_id = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();

        let info = lookup(dir.path()).unwrap();
        assert_eq!(info.commit, commit_id.to_string());
        assert_eq!(info.author, "Test User <test@example.com>");
        assert_eq!(info.date, "Tue Nov 14 22:13:20 2023 +0000");
        assert!(!info.branch.is_empty());

        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        assert_eq!(lookup(&nested).map(|i| i.commit), Some(commit_id.to_string()));

        let text = describe(Some(&info));
        assert!(text.starts_with("- Commit: "));
        assert!(text.ends_with("- Date: Tue Nov 14 22:13:20 2023 +0000"));
    }
}
