use std::collections::BTreeSet;

use crate::catalog::{Hierarchy, Language, NodePath, Verse};

/// The training scope: which parts of the hierarchy random practice draws from.
///
/// Membership is kept closed in both directions. Toggling a node applies the
/// new state to all of its descendants, and every ancestor is then selected
/// exactly when all of its children are. A node without children is a leaf
/// and only changes when toggled directly (or through an ancestor), so no
/// group is ever selected just because it is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<NodePath>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `path` and restore closure. Returns whether `path` is now selected.
    /// Paths not present in `hierarchy` are ignored.
    pub fn toggle(&mut self, hierarchy: &Hierarchy, path: &NodePath) -> bool {
        if path.is_root() || !hierarchy.contains(path) {
            tracing::debug!("ignoring scope toggle for unknown node {path}");
            return false;
        }

        let now_selected = !self.selected.contains(path);
        let affected = std::iter::once(path.clone()).chain(hierarchy.descendants(path));
        for node in affected {
            if now_selected {
                self.selected.insert(node);
            } else {
                self.selected.remove(&node);
            }
        }

        let mut cursor = path.parent();
        while let Some(ancestor) = cursor {
            if ancestor.is_root() {
                break;
            }
            let complete = hierarchy
                .child_paths(&ancestor)
                .iter()
                .all(|child| self.selected.contains(child));
            if complete {
                self.selected.insert(ancestor.clone());
            } else {
                self.selected.remove(&ancestor);
            }
            cursor = ancestor.parent();
        }

        now_selected
    }

    pub fn toggle_category(&mut self, hierarchy: &Hierarchy, category: &str) -> bool {
        self.toggle(hierarchy, &NodePath::from_labels([category]))
    }

    pub fn toggle_subcategory(
        &mut self,
        hierarchy: &Hierarchy,
        category: &str,
        subcategory: &str,
    ) -> bool {
        self.toggle(hierarchy, &NodePath::from_labels([category, subcategory]))
    }

    pub fn toggle_subsubcategory(
        &mut self,
        hierarchy: &Hierarchy,
        category: &str,
        subcategory: &str,
        subsubcategory: &str,
    ) -> bool {
        self.toggle(
            hierarchy,
            &NodePath::from_labels([category, subcategory, subsubcategory]),
        )
    }

    pub fn is_selected(&self, path: &NodePath) -> bool {
        self.selected.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected nodes at `depth` (1 = categories, 2 = subcategories, ...).
    pub fn selected_at(&self, depth: usize) -> impl Iterator<Item = &NodePath> {
        self.selected.iter().filter(move |p| p.depth() == depth)
    }

    /// Whether `verse` is inside the scope.
    ///
    /// Each tier with at least one selected node filters on the verse's leaf at
    /// that tier; a tier with nothing selected does not filter. A leaf
    /// shallower than the tier being checked is judged by its own membership.
    pub fn matches(&self, hierarchy: &Hierarchy, verse: &Verse) -> bool {
        let Some(deepest) = self.selected.iter().map(NodePath::depth).max() else {
            return true;
        };
        let path = hierarchy.node_of(verse);
        (1..=deepest).all(|depth| {
            self.selected_at(depth).next().is_none()
                || self.selected.contains(&path.truncated(depth))
        })
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            categories: self.selected_at(1).count(),
            subcategories: self.selected_at(2).count(),
            subsubcategories: self.selected_at(3).count(),
        }
    }
}

/// Per-tier counts of the scope, for the "selected range" label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionSummary {
    pub categories: usize,
    pub subcategories: usize,
    pub subsubcategories: usize,
}

impl SelectionSummary {
    /// Nothing selected means the whole catalog is in scope.
    pub fn is_all(&self) -> bool {
        self.categories == 0 && self.subcategories == 0 && self.subsubcategories == 0
    }

    pub fn render(&self, language: Language) -> String {
        if self.is_all() {
            return match language {
                Language::Korean => "전체".to_string(),
                Language::English => "all".to_string(),
            };
        }

        let (units, suffix) = match language {
            Language::Korean => (["개 카테고리", "개 서브카테고리", "개 세부 카테고리"], " 선택됨"),
            Language::English => ([" categories", " subcategories", " sub-subcategories"], " selected"),
        };
        let parts: Vec<String> = [self.categories, self.subcategories, self.subsubcategories]
            .iter()
            .zip(units)
            .filter(|(count, _)| **count > 0)
            .map(|(count, unit)| format!("{count}{unit}"))
            .collect();
        format!("{}{suffix}", parts.join(", "))
    }
}
