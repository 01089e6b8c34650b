pub mod hierarchy;
pub mod verse;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::Embed;
use thiserror::Error;

pub use hierarchy::{Hierarchy, NodePath, UNGROUPED};
pub use verse::{Language, Verse, VerseId};

#[derive(Embed)]
#[folder = "assets/"]
struct DatasetAssets;

const EMBEDDED_DATASET: &str = "verses.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read verse dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed verse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("embedded dataset {0} is missing")]
    MissingAsset(&'static str),
    #[error("duplicate verse id {0}")]
    DuplicateId(VerseId),
}

/// The immutable verse dataset plus the indices derived from it.
#[derive(Clone, Debug)]
pub struct Catalog {
    verses: Vec<Verse>,
    hierarchy: Hierarchy,
    index: HashMap<VerseId, usize>,
}

impl Catalog {
    pub fn new(verses: Vec<Verse>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(verses.len());
        for (i, verse) in verses.iter().enumerate() {
            if index.insert(verse.id(), i).is_some() {
                return Err(CatalogError::DuplicateId(verse.id()));
            }
        }
        let hierarchy = Hierarchy::build(&verses);
        Ok(Self {
            verses,
            hierarchy,
            index,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let verses: Vec<Verse> = serde_json::from_str(json)?;
        Self::new(verses)
    }

    pub fn load_embedded() -> Result<Self, CatalogError> {
        let file = DatasetAssets::get(EMBEDDED_DATASET)
            .ok_or(CatalogError::MissingAsset(EMBEDDED_DATASET))?;
        let verses: Vec<Verse> = serde_json::from_slice(file.data.as_ref())?;
        Self::new(verses)
    }

    /// Load `path` if given, otherwise the dataset bundled with the binary.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            return Self::load_embedded();
        };
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            "loaded {} verses from {}",
            catalog.verses.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn get(&self, id: &VerseId) -> Option<&Verse> {
        self.index.get(id).map(|&i| &self.verses[i])
    }

    pub fn contains(&self, id: &VerseId) -> bool {
        self.index.contains_key(id)
    }

    pub fn categories(&self) -> &[String] {
        self.hierarchy.children(&NodePath::root())
    }

    pub fn subcategories(&self, category: &str) -> &[String] {
        self.hierarchy.children(&NodePath::from_labels([category]))
    }

    pub fn subsubcategories(&self, category: &str, subcategory: &str) -> &[String] {
        self.hierarchy
            .children(&NodePath::from_labels([category, subcategory]))
    }

    pub fn filter<F>(&self, mut pred: F) -> Vec<&Verse>
    where
        F: FnMut(&Verse) -> bool,
    {
        self.verses.iter().filter(|v| pred(v)).collect()
    }

    /// Verses at or below `path`. Below the root they are sorted by number;
    /// the root keeps catalog order.
    pub fn under(&self, path: &NodePath) -> Vec<&Verse> {
        if path.is_root() {
            return self.verses.iter().collect();
        }
        let mut verses = self.filter(|v| self.hierarchy.node_of(v).starts_with(path));
        verses.sort_by_key(|v| v.number);
        verses
    }

    /// 1-based position of `verse` among the verses sharing its group, and the group size.
    pub fn position_in_group(&self, verse: &Verse) -> (usize, usize) {
        let group = self.under(&self.hierarchy.node_of(verse));
        let index = group
            .iter()
            .position(|v| v.id() == verse.id())
            .map_or(0, |i| i + 1);
        (index, group.len())
    }

    /// Map an old `subcategory-number` id onto a verse, if exactly one matches.
    pub fn resolve_legacy_id(&self, legacy: &str) -> Option<VerseId> {
        let mut matches = self.verses.iter().filter(|v| v.legacy_id() == legacy);
        let first = matches.next()?;
        if matches.next().is_some() {
            tracing::warn!("legacy verse id {legacy} is ambiguous");
            return None;
        }
        Some(first.id())
    }
}
