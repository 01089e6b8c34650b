use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::catalog::verse::Verse;

/// Fully-qualified address of a node: the labels from the top tier down.
/// The empty path is the root above all categories.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of labels; categories sit at depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Last label, or `None` for the root.
    pub fn label(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn child(&self, label: &str) -> Self {
        let mut labels = self.0.clone();
        labels.push(label.to_string());
        Self(labels)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Prefix of at most `depth` labels.
    pub fn truncated(&self, depth: usize) -> Self {
        Self(self.0[..depth.min(self.0.len())].to_vec())
    }

    pub fn push(&mut self, label: &str) {
        self.0.push(label.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0.join(" > "))
        }
    }
}

/// Label of the node holding verses that stop at a group which also has
/// child groups (e.g. a subcategory verse with no sub-subcategory next to
/// siblings that have one).
pub const UNGROUPED: &str = "(none)";

/// Category tree of arbitrary depth derived from verse paths.
/// Children keep the order in which they first appear in the catalog.
/// Every verse sits on a leaf; see [`Hierarchy::node_of`].
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    children: HashMap<NodePath, Vec<String>>,
    depth: usize,
}

impl Hierarchy {
    pub fn build(verses: &[Verse]) -> Self {
        let paths: Vec<NodePath> = verses.iter().map(Verse::path).collect();
        let inner: HashSet<NodePath> = paths
            .iter()
            .flat_map(|p| (0..p.depth()).map(|d| p.truncated(d)))
            .collect();

        let mut hierarchy = Self::default();
        hierarchy.children.insert(NodePath::root(), Vec::new());
        for path in paths {
            if inner.contains(&path) {
                hierarchy.insert(&path.child(UNGROUPED));
            } else {
                hierarchy.insert(&path);
            }
        }
        hierarchy
    }

    /// The leaf `verse` is listed under.
    pub fn node_of(&self, verse: &Verse) -> NodePath {
        let path = verse.path();
        if self.children(&path).is_empty() {
            path
        } else {
            path.child(UNGROUPED)
        }
    }

    fn insert(&mut self, path: &NodePath) {
        self.depth = self.depth.max(path.depth());
        let mut node = NodePath::root();
        for label in path.labels() {
            let siblings = self.children.entry(node.clone()).or_default();
            if !siblings.iter().any(|l| l == label) {
                siblings.push(label.clone());
            }
            node.push(label);
            self.children.entry(node.clone()).or_default();
        }
    }

    /// Deepest tier present in the catalog.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.children.contains_key(path)
    }

    /// Child labels of `path`; empty for leaves and unknown paths.
    pub fn children(&self, path: &NodePath) -> &[String] {
        self.children.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child_paths(&self, path: &NodePath) -> Vec<NodePath> {
        self.children(path).iter().map(|l| path.child(l)).collect()
    }

    pub fn is_leaf(&self, path: &NodePath) -> bool {
        self.contains(path) && self.children(path).is_empty()
    }

    /// Every node strictly below `path`, in pre-order.
    pub fn descendants(&self, path: &NodePath) -> Vec<NodePath> {
        let mut out = Vec::new();
        self.collect_preorder(path, &mut out);
        out
    }

    fn collect_preorder(&self, path: &NodePath, out: &mut Vec<NodePath>) {
        for child in self.child_paths(path) {
            out.push(child.clone());
            self.collect_preorder(&child, out);
        }
    }

    /// Every node except the root, in pre-order.
    pub fn walk(&self) -> Vec<NodePath> {
        self.descendants(&NodePath::root())
    }

    pub fn leaves_under(&self, path: &NodePath) -> Vec<NodePath> {
        if self.is_leaf(path) {
            return vec![path.clone()];
        }
        self.descendants(path)
            .into_iter()
            .filter(|p| self.is_leaf(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(category: &str, sub: &str, subsub: Option<&str>, number: u32) -> Verse {
        Verse {
            category: category.to_string(),
            subcategory: sub.to_string(),
            subsubcategory: subsub.map(str::to_string),
            number,
            book: "b".to_string(),
            chapter: 1,
            verse1: 1,
            verse2: None,
            versename: None,
            korean_text: String::new(),
            english_text: String::new(),
        }
    }

    fn sample() -> Hierarchy {
        Hierarchy::build(&[
            verse("A", "S1", Some("X"), 1),
            verse("A", "S1", Some("Y"), 2),
            verse("A", "S2", Some("Z"), 3),
            verse("B", "S3", None, 1),
            verse("A", "S1", Some("X"), 4),
        ])
    }

    #[test]
    fn children_keep_first_appearance_order() {
        let h = sample();
        assert_eq!(h.children(&NodePath::root()), ["A", "B"]);
        assert_eq!(h.children(&NodePath::from_labels(["A"])), ["S1", "S2"]);
        assert_eq!(h.children(&NodePath::from_labels(["A", "S1"])), ["X", "Y"]);
    }

    #[test]
    fn short_paths_become_leaves() {
        let h = sample();
        assert!(h.is_leaf(&NodePath::from_labels(["B", "S3"])));
        assert!(!h.is_leaf(&NodePath::from_labels(["A", "S1"])));
        assert_eq!(h.depth(), 3);
    }

    #[test]
    fn descendants_are_preorder() {
        let h = sample();
        let got: Vec<String> = h
            .descendants(&NodePath::from_labels(["A"]))
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(got, ["A > S1", "A > S1 > X", "A > S1 > Y", "A > S2", "A > S2 > Z"]);
    }

    #[test]
    fn leaves_under_a_leaf_is_itself() {
        let h = sample();
        let leaf = NodePath::from_labels(["B", "S3"]);
        assert_eq!(h.leaves_under(&leaf), vec![leaf]);
        assert_eq!(h.leaves_under(&NodePath::from_labels(["A"])).len(), 3);
    }

    #[test]
    fn unknown_paths_have_no_children() {
        let h = sample();
        let missing = NodePath::from_labels(["nope"]);
        assert!(!h.contains(&missing));
        assert!(h.children(&missing).is_empty());
        assert!(!h.is_leaf(&missing));
    }

    #[test]
    fn verses_beside_child_groups_get_their_own_leaf() {
        let verses = [
            verse("A", "S1", Some("X"), 1),
            verse("A", "S1", None, 2),
            verse("A", "S2", None, 3),
        ];
        let h = Hierarchy::build(&verses);
        let s1 = NodePath::from_labels(["A", "S1"]);
        assert_eq!(h.children(&s1), ["X", UNGROUPED]);
        assert!(h.is_leaf(&s1.child(UNGROUPED)));

        assert_eq!(h.node_of(&verses[0]), s1.child("X"));
        assert_eq!(h.node_of(&verses[1]), s1.child(UNGROUPED));
        assert_eq!(h.node_of(&verses[2]), NodePath::from_labels(["A", "S2"]));
        assert!(!h.contains(&NodePath::from_labels(["A", "S2", UNGROUPED])));
    }

    #[test]
    fn path_helpers() {
        let p = NodePath::from_labels(["A", "S1", "X"]);
        assert_eq!(p.label(), Some("X"));
        assert_eq!(p.parent(), Some(NodePath::from_labels(["A", "S1"])));
        assert_eq!(p.truncated(1), NodePath::from_labels(["A"]));
        assert_eq!(p.truncated(9), p);
        assert!(p.starts_with(&NodePath::from_labels(["A"])));
        assert_eq!(NodePath::root().parent(), None);
    }
}
