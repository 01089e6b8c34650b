use std::fmt;

use thiserror::Error;

use crate::catalog::{Hierarchy, Language, NodePath};

/// Which screen of the drill-down is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Categories,
    Subcategories,
    Subsubcategories,
    Verses,
}

impl Level {
    /// The listing level that shows the children of a path of `depth` labels.
    fn listing(depth: usize) -> Self {
        match depth {
            0 => Level::Categories,
            1 => Level::Subcategories,
            _ => Level::Subsubcategories,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Categories => "categories",
            Level::Subcategories => "subcategories",
            Level::Subsubcategories => "subsubcategories",
            Level::Verses => "verses",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which subset of verses the verse list shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Normal,
    Favorites,
    Completed,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("cannot select from {expected} while showing {actual}")]
    WrongLevel { expected: Level, actual: Level },
    #[error("{label} is not listed under {parent}")]
    UnknownEntry { parent: NodePath, label: String },
}

/// Drill-down position in the category hierarchy.
///
/// At a listing level the path holds exactly the labels above that level; at
/// `Verses` in normal view it names the group being listed. A tier is skipped
/// when the chosen node has no children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigator {
    level: Level,
    path: NodePath,
    view_mode: ViewMode,
    /// Level to return to when leaving a favorites/completed view.
    return_level: Option<Level>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            level: Level::Categories,
            path: NodePath::root(),
            view_mode: ViewMode::Normal,
            return_level: None,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn category(&self) -> Option<&str> {
        self.path.labels().first().map(String::as_str)
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.path.labels().get(1).map(String::as_str)
    }

    pub fn subsubcategory(&self) -> Option<&str> {
        self.path.labels().get(2).map(String::as_str)
    }

    /// Descend into `label`, one of the entries currently listed.
    pub fn select(&mut self, hierarchy: &Hierarchy, label: &str) -> Result<Level, NavigationError> {
        if self.level == Level::Verses {
            return Err(NavigationError::WrongLevel {
                expected: Level::listing(self.path.depth()),
                actual: self.level,
            });
        }
        if !hierarchy.children(&self.path).iter().any(|l| l == label) {
            return Err(NavigationError::UnknownEntry {
                parent: self.path.clone(),
                label: label.to_string(),
            });
        }

        self.path.push(label);
        self.level = if hierarchy.is_leaf(&self.path) {
            Level::Verses
        } else {
            Level::listing(self.path.depth())
        };
        tracing::debug!("navigated to {} ({})", self.path, self.level);
        Ok(self.level)
    }

    fn select_at(
        &mut self,
        hierarchy: &Hierarchy,
        expected: Level,
        label: &str,
    ) -> Result<Level, NavigationError> {
        if self.level != expected {
            return Err(NavigationError::WrongLevel {
                expected,
                actual: self.level,
            });
        }
        self.select(hierarchy, label)
    }

    pub fn select_category(
        &mut self,
        hierarchy: &Hierarchy,
        category: &str,
    ) -> Result<Level, NavigationError> {
        self.select_at(hierarchy, Level::Categories, category)
    }

    pub fn select_subcategory(
        &mut self,
        hierarchy: &Hierarchy,
        subcategory: &str,
    ) -> Result<Level, NavigationError> {
        self.select_at(hierarchy, Level::Subcategories, subcategory)
    }

    pub fn select_subsubcategory(
        &mut self,
        hierarchy: &Hierarchy,
        subsubcategory: &str,
    ) -> Result<Level, NavigationError> {
        self.select_at(hierarchy, Level::Subsubcategories, subsubcategory)
    }

    /// Move one level up. Always drops back to the normal view; leaving a
    /// favorites/completed list returns to where it was opened from.
    pub fn go_back(&mut self) {
        let leaving_list_view = self.view_mode != ViewMode::Normal;
        self.view_mode = ViewMode::Normal;

        if leaving_list_view && let Some(level) = self.return_level.take() {
            self.level = level;
            return;
        }
        self.return_level = None;

        if self.level == Level::Categories {
            return;
        }
        self.path.pop();
        self.level = Level::listing(self.path.depth());
    }

    pub fn go_home(&mut self) {
        *self = Self::new();
    }

    /// Favorites and completed views always show the verse list.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        match mode {
            ViewMode::Favorites | ViewMode::Completed => {
                if self.view_mode == ViewMode::Normal {
                    self.return_level = Some(self.level);
                }
                self.level = Level::Verses;
            }
            ViewMode::Normal => {
                if let Some(level) = self.return_level.take() {
                    self.level = level;
                }
            }
        }
        self.view_mode = mode;
    }

    /// Labels listed at the current level; empty on the verse list.
    pub fn listing<'a>(&self, hierarchy: &'a Hierarchy) -> &'a [String] {
        if self.level == Level::Verses {
            return &[];
        }
        hierarchy.children(&self.path)
    }

    pub fn title(&self, language: Language) -> String {
        match (self.view_mode, language) {
            (ViewMode::Favorites, Language::Korean) => "즐겨찾기 목록".to_string(),
            (ViewMode::Favorites, Language::English) => "Favorites".to_string(),
            (ViewMode::Completed, Language::Korean) => "암송완료 목록".to_string(),
            (ViewMode::Completed, Language::English) => "Memorized".to_string(),
            (ViewMode::Normal, _) => match (self.path.label(), language) {
                (Some(label), _) => label.to_string(),
                (None, Language::Korean) => "모든 구절".to_string(),
                (None, Language::English) => "All verses".to_string(),
            },
        }
    }
}
