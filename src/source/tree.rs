//! Folder listings derived from the flat recursive tree.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::filter::is_hidden;
use crate::types::{ExplorerItem, NodeKind, TreeNode};

/// Last path segment
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Direct children of `parent` (`""` is the root).
///
/// Folders first, then case-insensitive by name. Duplicate paths are listed
/// once. Folder child counts honor the same hidden filter.
pub fn children_at_path(tree: &[TreeNode], parent: &str, show_hidden: bool) -> Vec<ExplorerItem> {
    let visible = |node: &&TreeNode| show_hidden || !is_hidden(&node.path);

    let mut child_counts: HashMap<&str, usize> = HashMap::new();
    let mut counted: HashSet<&str> = HashSet::new();
    for node in tree.iter().filter(visible) {
        if counted.insert(node.path.as_str()) {
            *child_counts.entry(parent_of(&node.path)).or_default() += 1;
        }
    }

    let mut seen = HashSet::new();
    let mut items: Vec<ExplorerItem> = tree
        .iter()
        .filter(visible)
        .filter(|node| !node.path.is_empty() && parent_of(&node.path) == parent)
        .filter(|node| seen.insert(node.path.as_str()))
        .map(|node| {
            let name = file_name(&node.path).to_string();
            let extension = name.rfind('.').map(|idx| name[idx..].to_string());
            ExplorerItem {
                path: node.path.clone(),
                kind: node.kind,
                extension,
                child_count: (node.kind == NodeKind::Folder)
                    .then(|| child_counts.get(node.path.as_str()).copied().unwrap_or(0)),
                size: node.size,
                name,
            }
        })
        .collect();

    items.sort_by(|a, b| match (a.kind, b.kind) {
        (NodeKind::Folder, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Folder) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    });

    items
}

/// Folder context for prompts: first `cap` child names, then the total
pub fn child_listing(tree: &[TreeNode], folder: &str, show_hidden: bool, cap: usize) -> String {
    let children = children_at_path(tree, folder, show_hidden);
    let shown = children
        .iter()
        .take(cap)
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    if children.len() > cap {
        format!("{}, ... ({} total)", shown, children.len())
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, kind: NodeKind) -> TreeNode {
        TreeNode {
            path: path.to_string(),
            kind,
            sha: format!("sha-{path}"),
            size: (kind == NodeKind::File).then_some(10),
        }
    }

    fn sample() -> Vec<TreeNode> {
        vec![
            node("README.md", NodeKind::File),
            node("src", NodeKind::Folder),
            node("src/main.rs", NodeKind::File),
            node("src/lib.rs", NodeKind::File),
            node("src/util", NodeKind::Folder),
            node("src/util/mod.rs", NodeKind::File),
            node("docs", NodeKind::Folder),
            node("node_modules", NodeKind::Folder),
            node("node_modules/left-pad/index.js", NodeKind::File),
            node("Cargo.lock", NodeKind::File),
            node("build.rs", NodeKind::File),
        ]
    }

    #[test]
    fn test_root_children_sorted_and_filtered() {
        let items = children_at_path(&sample(), "", false);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "src", "build.rs", "README.md"]);
    }

    #[test]
    fn test_show_hidden_includes_everything() {
        let items = children_at_path(&sample(), "", true);
        assert!(items.iter().any(|i| i.name == "node_modules"));
        assert!(items.iter().any(|i| i.name == "Cargo.lock"));
    }

    #[test]
    fn test_nested_children_and_counts() {
        let tree = sample();
        let root = children_at_path(&tree, "", false);
        let src = root.iter().find(|i| i.name == "src").unwrap();
        assert_eq!(src.child_count, Some(3));
        assert_eq!(root.iter().find(|i| i.name == "docs").unwrap().child_count, Some(0));

        let items = children_at_path(&tree, "src", false);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["util", "lib.rs", "main.rs"]);
        assert_eq!(items[1].path, "src/lib.rs");
        assert_eq!(items[1].extension.as_deref(), Some(".rs"));
        assert_eq!(items[1].child_count, None);
    }

    #[test]
    fn test_duplicates_listed_once() {
        let mut tree = sample();
        tree.push(node("src/main.rs", NodeKind::File));
        let items = children_at_path(&tree, "src", false);
        assert_eq!(items.iter().filter(|i| i.name == "main.rs").count(), 1);
    }

    #[test]
    fn test_child_listing_caps() {
        let mut tree = vec![node("many", NodeKind::Folder)];
        for i in 0..12 {
            tree.push(node(&format!("many/f{i:02}.txt"), NodeKind::File));
        }

        let listing = child_listing(&tree, "many", false, 10);
        assert!(listing.starts_with("f00.txt, f01.txt"));
        assert!(listing.ends_with("f09.txt, ... (12 total)"));

        assert_eq!(child_listing(&tree, "many", false, 20).split(", ").count(), 12);
        assert_eq!(child_listing(&tree, "missing", false, 10), "");
    }
}
