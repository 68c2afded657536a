/*!
 * Directory tree construction and text rendering
 */

use feruca::{Collator, Locale, Tailoring};

use crate::types::{DirectoryTree, Node};

impl DirectoryTree {
    /// Build a tree from relative file paths
    ///
    /// Paths are split on `/` and `\`, empty segments are dropped. The last
    /// segment of each path becomes a leaf; inserting a path twice is a no-op.
    pub fn build<I, S>(relative_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = DirectoryTree::new();
        for path in relative_paths {
            root.insert(path.as_ref());
        }
        root
    }

    /// Insert a single relative file path
    pub fn insert(&mut self, relative_path: &str) {
        let segments: Vec<&str> = relative_path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .collect();

        let Some((file, dirs)) = segments.split_last() else {
            return;
        };

        let mut node = self;
        for dir in dirs {
            let child = node
                .children
                .entry((*dir).to_string())
                .or_insert_with(|| Node::Directory(DirectoryTree::new()));
            node = match child {
                Node::Directory(tree) => tree,
                // A name seen first as a file keeps its first role
                Node::Leaf => return,
            };
        }

        node.children
            .entry((*file).to_string())
            .or_insert(Node::Leaf);
    }

    /// Render the tree as indented text
    ///
    /// Directories come before files at every level, each group sorted by
    /// name with the Unicode collation algorithm (root locale, punctuation
    /// not ignored). Directories get a trailing `/` and their children two
    /// more spaces of indentation. An empty tree renders as an empty string.
    pub fn render(&self, indent: &str) -> String {
        self.render_with(indent, &mut name_collator())
    }

    fn render_with(&self, indent: &str, collator: &mut Collator) -> String {
        let mut entries: Vec<(&str, &Node)> = self
            .children
            .iter()
            .map(|(name, node)| (name.as_str(), node))
            .collect();
        entries.sort_by(|(a_name, a_node), (b_name, b_node)| {
            b_node
                .is_dir()
                .cmp(&a_node.is_dir())
                .then_with(|| collator.collate(*a_name, *b_name))
        });

        let mut lines = Vec::with_capacity(entries.len());
        for (name, node) in entries {
            match node {
                Node::Leaf => lines.push(format!("{}{}", indent, name)),
                Node::Directory(children) => {
                    lines.push(format!("{}{}/", indent, name));
                    let sub = children.render_with(&format!("{}  ", indent), collator);
                    if !sub.is_empty() {
                        lines.push(sub);
                    }
                }
            }
        }

        lines.join("\n")
    }
}

/// Collator for entry names
///
/// Punctuation and symbols sort before digits, digits before letters,
/// accents and case only break ties. `README.md` therefore sorts after
/// `package.json` and `école.md` before `fichier.md`.
fn name_collator() -> Collator {
    Collator::new(Tailoring::Cldr(Locale::Root), false, true)
}
