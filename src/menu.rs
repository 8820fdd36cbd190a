use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub key: String,
    pub title: String,
    pub href: String,
    /// `false` for folders that only group other pages and cannot be opened.
    #[serde(default = "has_page_default", skip_serializing_if = "is_true")]
    pub has_page: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

fn has_page_default() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

impl MenuNode {
    pub fn leaf(key: impl Into<String>, title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            href: href.into(),
            has_page: true,
            children: Vec::new(),
        }
    }

    pub fn without_page(mut self) -> Self {
        self.has_page = false;
        self
    }

    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("duplicate menu key `{key}` under `{parent}`")]
    DuplicateKey { parent: String, key: String },
}

/// Sidebar navigation for one documentation section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MenuNode>", into = "Vec<MenuNode>")]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl TryFrom<Vec<MenuNode>> for MenuTree {
    type Error = MenuError;

    fn try_from(nodes: Vec<MenuNode>) -> Result<Self, Self::Error> {
        Self::new(nodes)
    }
}

impl From<MenuTree> for Vec<MenuNode> {
    fn from(tree: MenuTree) -> Self {
        tree.nodes
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNode<'a> {
    pub node: &'a MenuNode,
    pub active: bool,
    pub expanded: bool,
    pub children: Vec<ResolvedNode<'a>>,
}

impl MenuTree {
    pub fn new(nodes: Vec<MenuNode>) -> Result<Self, MenuError> {
        ensure_unique_keys("/", &nodes)?;
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    pub fn resolve(&self, path: &str) -> Vec<ResolvedNode<'_>> {
        self.nodes.iter().map(|node| resolve_node(node, path)).collect()
    }

    pub fn find(&self, path: &str) -> Option<&MenuNode> {
        let path = normalize(path);
        self.reading_order()
            .into_iter()
            .find(|node| normalize(&node.href) == path)
    }

    /// Previous and next pages around `path` in depth-first reading order.
    /// Grouping-only folders are skipped.
    pub fn neighbors(&self, path: &str) -> (Option<&MenuNode>, Option<&MenuNode>) {
        let path = normalize(path);
        let order = self
            .reading_order()
            .into_iter()
            .filter(|node| node.has_page)
            .collect::<Vec<_>>();
        let Some(position) = order.iter().position(|node| normalize(&node.href) == path) else {
            return (None, None);
        };

        let prev = position.checked_sub(1).map(|index| order[index]);
        let next = order.get(position + 1).copied();
        (prev, next)
    }

    fn reading_order(&self) -> Vec<&MenuNode> {
        fn walk<'a>(nodes: &'a [MenuNode], out: &mut Vec<&'a MenuNode>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }
}

fn ensure_unique_keys(parent: &str, nodes: &[MenuNode]) -> Result<(), MenuError> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.key.as_str()) {
            return Err(MenuError::DuplicateKey {
                parent: parent.to_string(),
                key: node.key.clone(),
            });
        }
        ensure_unique_keys(&node.href, &node.children)?;
    }
    Ok(())
}

fn resolve_node<'a>(node: &'a MenuNode, path: &str) -> ResolvedNode<'a> {
    let children = node
        .children
        .iter()
        .map(|child| resolve_node(child, path))
        .collect::<Vec<_>>();

    let active = if node.is_group() {
        is_path_prefix(path, &node.href)
            || is_path_prefix(&node.href, path)
            || children.iter().any(|child| child.active)
    } else {
        is_path_prefix(path, &node.href)
    };

    ResolvedNode {
        node,
        active,
        expanded: active && node.is_group(),
        children,
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Whether `prefix` covers `full` on a path-segment boundary. The root path
/// only covers itself so it never lights up a whole menu.
pub fn is_path_prefix(prefix: &str, full: &str) -> bool {
    let prefix = normalize(prefix);
    let full = normalize(full);

    if prefix == "/" {
        return full == "/";
    }

    full == prefix
        || full
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokio_menu() -> MenuTree {
        MenuTree::new(vec![
            MenuNode::leaf("overview", "Overview", "/tokio/overview"),
            MenuNode::leaf("tutorial", "Tutorial", "/tokio/tutorial").with_children(vec![
                MenuNode::leaf("hello-tokio", "Hello Tokio", "/tokio/tutorial/hello-tokio"),
                MenuNode::leaf("spawning", "Spawning", "/tokio/tutorial/spawning"),
                MenuNode::leaf("shared-state", "Shared state", "/tokio/tutorial/shared-state"),
            ]),
            MenuNode::leaf("topics", "Topics", "/tokio/topics").with_children(vec![
                MenuNode::leaf("bridging", "Bridging with sync code", "/tokio/topics/bridging"),
            ]),
        ])
        .expect("valid menu")
    }

    fn active_titles(nodes: &[ResolvedNode<'_>]) -> Vec<String> {
        let mut out = Vec::new();
        for node in nodes {
            if node.active {
                out.push(node.node.title.clone());
            }
            out.extend(active_titles(&node.children));
        }
        out
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        assert!(is_path_prefix("/tokio/tutorial", "/tokio/tutorial/spawning"));
        assert!(is_path_prefix("/tokio/tutorial/", "/tokio/tutorial"));
        assert!(!is_path_prefix("/tokio/tut", "/tokio/tutorial"));
        assert!(!is_path_prefix("/tokio/tutorial/spawning", "/tokio/tutorial"));
        assert!(!is_path_prefix("/", "/tokio"));
        assert!(is_path_prefix("", "/"));
    }

    #[test]
    fn child_page_marks_group_and_child_active() {
        let menu = tokio_menu();
        let resolved = menu.resolve("/tokio/tutorial/spawning");

        assert_eq!(active_titles(&resolved), vec!["Tutorial", "Spawning"]);
        assert!(resolved[1].expanded);
        assert!(!resolved[2].expanded);
    }

    #[test]
    fn unknown_path_marks_nothing_active() {
        let menu = tokio_menu();
        let resolved = menu.resolve("/blog/2024-announcement");

        assert!(active_titles(&resolved).is_empty());
        assert!(resolved.iter().all(|node| !node.expanded));
    }

    #[test]
    fn group_index_expands_group() {
        let menu = tokio_menu();
        let resolved = menu.resolve("/tokio/topics/");

        assert!(resolved[2].active);
        assert!(resolved[2].expanded);
        assert_eq!(active_titles(&resolved), vec!["Topics", "Bridging with sync code"]);
    }

    #[test]
    fn duplicate_sibling_keys_are_rejected() {
        let result = MenuTree::new(vec![
            MenuNode::leaf("tutorial", "Tutorial", "/tokio/tutorial").with_children(vec![
                MenuNode::leaf("io", "I/O", "/tokio/tutorial/io"),
                MenuNode::leaf("io", "I/O again", "/tokio/tutorial/io-again"),
            ]),
        ]);

        assert_eq!(
            result,
            Err(MenuError::DuplicateKey {
                parent: "/tokio/tutorial".to_string(),
                key: "io".to_string(),
            })
        );
    }

    #[test]
    fn same_key_under_different_parents_is_allowed() {
        let result = MenuTree::new(vec![
            MenuNode::leaf("a", "A", "/a").with_children(vec![MenuNode::leaf("intro", "Intro", "/a/intro")]),
            MenuNode::leaf("b", "B", "/b").with_children(vec![MenuNode::leaf("intro", "Intro", "/b/intro")]),
        ]);

        assert!(result.is_ok());
    }

    #[test]
    fn neighbors_follow_reading_order() {
        let menu = tokio_menu();

        let (prev, next) = menu.neighbors("/tokio/tutorial/hello-tokio");
        assert_eq!(prev.map(|node| node.key.as_str()), Some("tutorial"));
        assert_eq!(next.map(|node| node.key.as_str()), Some("spawning"));

        let (prev, next) = menu.neighbors("/tokio/overview");
        assert!(prev.is_none());
        assert_eq!(next.map(|node| node.key.as_str()), Some("tutorial"));

        assert_eq!(menu.neighbors("/missing"), (None, None));
        assert_eq!(
            menu.find("/tokio/topics/bridging/").map(|node| node.title.as_str()),
            Some("Bridging with sync code")
        );
    }

    #[test]
    fn neighbors_skip_folders_without_a_page() {
        let menu = MenuTree::new(vec![
            MenuNode::leaf("intro", "Intro", "/tokio/intro"),
            MenuNode::leaf("topics", "Topics", "/tokio/topics")
                .without_page()
                .with_children(vec![MenuNode::leaf("bridging", "Bridging", "/tokio/topics/bridging")]),
        ])
        .expect("valid menu");

        let (prev, next) = menu.neighbors("/tokio/topics/bridging");
        assert_eq!(prev.map(|node| node.href.as_str()), Some("/tokio/intro"));
        assert!(next.is_none());

        let (_, next) = menu.neighbors("/tokio/intro");
        assert_eq!(next.map(|node| node.href.as_str()), Some("/tokio/topics/bridging"));

        assert_eq!(menu.neighbors("/tokio/topics"), (None, None));
    }

    #[test]
    fn deserializing_validates_keys() {
        let raw = r#"[{"key":"a","title":"A","href":"/a"},{"key":"a","title":"A2","href":"/a2"}]"#;
        assert!(serde_json::from_str::<MenuTree>(raw).is_err());

        let raw = r#"[{"key":"a","title":"A","href":"/a","children":[{"key":"b","title":"B","href":"/a/b"}]}]"#;
        let tree = serde_json::from_str::<MenuTree>(raw).expect("valid menu json");
        assert_eq!(tree.nodes()[0].children[0].href, "/a/b");
        assert!(tree.nodes()[0].has_page);

        let raw = r#"[{"key":"a","title":"A","href":"/a","has_page":false,"children":[{"key":"b","title":"B","href":"/a/b"}]}]"#;
        let tree = serde_json::from_str::<MenuTree>(raw).expect("valid menu json");
        assert!(!tree.nodes()[0].has_page);
        assert_eq!(serde_json::to_string(&tree).expect("serializable"), raw);
    }
}
