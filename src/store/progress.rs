use std::collections::BTreeSet;

use crate::catalog::{Catalog, VerseId};
use crate::store::kv::KeyValueStore;
use crate::store::schema::{COMPLETED_KEY, ExportData, FAVORITES_KEY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressKind {
    Completed,
    Favorites,
}

impl ProgressKind {
    pub fn key(self) -> &'static str {
        match self {
            ProgressKind::Completed => COMPLETED_KEY,
            ProgressKind::Favorites => FAVORITES_KEY,
        }
    }
}

/// Favorite and memorized verse ids, mirrored to a key-value store.
///
/// Reads never fail: a missing or unreadable entry becomes an empty set.
/// Every change writes the whole set back immediately; a failed write is
/// logged and the in-memory state is kept.
pub struct ProgressTracker {
    store: Box<dyn KeyValueStore>,
    completed: BTreeSet<VerseId>,
    favorites: BTreeSet<VerseId>,
}

impl ProgressTracker {
    pub fn load(store: Box<dyn KeyValueStore>, catalog: &Catalog) -> Self {
        let mut tracker = Self {
            store,
            completed: BTreeSet::new(),
            favorites: BTreeSet::new(),
        };
        for kind in [ProgressKind::Completed, ProgressKind::Favorites] {
            let raw = tracker.read_ids(kind);
            let (ids, migrated) = migrate_ids(raw, catalog);
            *tracker.set_mut(kind) = ids;
            if migrated {
                tracing::info!("migrated legacy ids in {}", kind.key());
                tracker.persist(kind);
            }
        }
        tracker
    }

    fn read_ids(&self, kind: ProgressKind) -> Vec<String> {
        let raw = match self.store.get(kind.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("could not read {}: {e:#}", kind.key());
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("discarding malformed {}: {e}", kind.key());
            Vec::new()
        })
    }

    fn set_mut(&mut self, kind: ProgressKind) -> &mut BTreeSet<VerseId> {
        match kind {
            ProgressKind::Completed => &mut self.completed,
            ProgressKind::Favorites => &mut self.favorites,
        }
    }

    pub fn ids(&self, kind: ProgressKind) -> &BTreeSet<VerseId> {
        match kind {
            ProgressKind::Completed => &self.completed,
            ProgressKind::Favorites => &self.favorites,
        }
    }

    pub fn contains(&self, kind: ProgressKind, id: &VerseId) -> bool {
        self.ids(kind).contains(id)
    }

    /// Flip `id` in the `kind` set and persist. Returns whether it is now present.
    pub fn toggle(&mut self, kind: ProgressKind, id: &VerseId) -> bool {
        let set = self.set_mut(kind);
        let present = if set.remove(id) {
            false
        } else {
            set.insert(id.clone());
            true
        };
        self.persist(kind);
        present
    }

    /// Replace both sets, keeping only ids the catalog knows. Returns how many
    /// ids were dropped.
    pub fn import(&mut self, data: ExportData, catalog: &Catalog) -> usize {
        let mut dropped = 0;
        for (kind, ids) in [
            (ProgressKind::Completed, data.completed),
            (ProgressKind::Favorites, data.favorites),
        ] {
            let before = ids.len();
            let known: BTreeSet<VerseId> =
                ids.into_iter().filter(|id| catalog.contains(id)).collect();
            dropped += before - known.len();
            *self.set_mut(kind) = known;
            self.persist(kind);
        }
        if dropped > 0 {
            tracing::warn!("import skipped {dropped} ids not present in the catalog");
        }
        dropped
    }

    pub fn export(&self) -> ExportData {
        ExportData::new(self.completed.clone(), self.favorites.clone())
    }

    fn persist(&mut self, kind: ProgressKind) {
        let encoded = {
            let ids: Vec<&str> = self.ids(kind).iter().map(VerseId::as_str).collect();
            serde_json::to_string(&ids)
        };
        let result = encoded
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(kind.key(), &json));
        if let Err(e) = result {
            tracing::warn!("failed to save {}: {e:#}", kind.key());
        }
    }
}

/// Keep ids the catalog knows, rewrite legacy `subcategory-number` ids that
/// resolve to one verse, and keep anything else verbatim.
fn migrate_ids(raw: Vec<String>, catalog: &Catalog) -> (BTreeSet<VerseId>, bool) {
    let mut migrated = false;
    let ids = raw
        .into_iter()
        .map(|raw| {
            let id = VerseId::new(raw);
            if catalog.contains(&id) {
                return id;
            }
            match catalog.resolve_legacy_id(id.as_str()) {
                Some(resolved) => {
                    migrated = true;
                    resolved
                }
                None => {
                    tracing::warn!("keeping unknown verse id {id}");
                    id
                }
            }
        })
        .collect();
    (ids, migrated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Verse;
    use crate::store::kv::MemoryStore;

    fn verse(sub: &str, number: u32) -> Verse {
        Verse {
            category: "A".to_string(),
            subcategory: sub.to_string(),
            subsubcategory: None,
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

    fn catalog() -> Catalog {
        Catalog::new(vec![verse("S1", 1), verse("S1", 2), verse("S2", 1)]).unwrap()
    }

    #[test]
    fn empty_store_loads_empty_sets() {
        let tracker = ProgressTracker::load(Box::new(MemoryStore::new()), &catalog());
        assert!(tracker.ids(ProgressKind::Completed).is_empty());
        assert!(tracker.ids(ProgressKind::Favorites).is_empty());
    }

    #[test]
    fn malformed_entry_degrades_to_empty() {
        let store = MemoryStore::new();
        store.insert(FAVORITES_KEY, "{not json");
        store.insert(COMPLETED_KEY, "[\"A/S1/1\"]");
        let tracker = ProgressTracker::load(Box::new(store), &catalog());
        assert!(tracker.ids(ProgressKind::Favorites).is_empty());
        assert!(tracker.contains(ProgressKind::Completed, &VerseId::from("A/S1/1")));
    }

    #[test]
    fn toggle_persists_full_set() {
        let store = MemoryStore::new();
        let mut tracker = ProgressTracker::load(Box::new(store.clone()), &catalog());
        assert!(tracker.toggle(ProgressKind::Favorites, &VerseId::from("A/S1/1")));
        assert!(tracker.toggle(ProgressKind::Favorites, &VerseId::from("A/S2/1")));
        assert_eq!(
            store.get(FAVORITES_KEY).unwrap().as_deref(),
            Some("[\"A/S1/1\",\"A/S2/1\"]")
        );

        assert!(!tracker.toggle(ProgressKind::Favorites, &VerseId::from("A/S1/1")));
        assert_eq!(
            store.get(FAVORITES_KEY).unwrap().as_deref(),
            Some("[\"A/S2/1\"]")
        );
    }

    #[test]
    fn reload_sees_toggles() {
        let store = MemoryStore::new();
        let id = VerseId::from("A/S1/2");
        let mut tracker = ProgressTracker::load(Box::new(store.clone()), &catalog());
        tracker.toggle(ProgressKind::Completed, &id);

        let reloaded = ProgressTracker::load(Box::new(store.clone()), &catalog());
        assert!(reloaded.contains(ProgressKind::Completed, &id));

        tracker.toggle(ProgressKind::Completed, &id);
        let reloaded = ProgressTracker::load(Box::new(store), &catalog());
        assert!(!reloaded.contains(ProgressKind::Completed, &id));
    }

    #[test]
    fn failed_writes_keep_memory_state() {
        let mut tracker = ProgressTracker::load(Box::new(MemoryStore::failing()), &catalog());
        let id = VerseId::from("A/S1/1");
        assert!(tracker.toggle(ProgressKind::Favorites, &id));
        assert!(tracker.contains(ProgressKind::Favorites, &id));
    }

    #[test]
    fn legacy_ids_are_migrated_and_saved() {
        let store = MemoryStore::new();
        store.insert(FAVORITES_KEY, "[\"S2-1\", \"S9-9\"]");
        let tracker = ProgressTracker::load(Box::new(store.clone()), &catalog());
        assert!(tracker.contains(ProgressKind::Favorites, &VerseId::from("A/S2/1")));
        assert!(tracker.contains(ProgressKind::Favorites, &VerseId::from("S9-9")));
        assert_eq!(
            store.get(FAVORITES_KEY).unwrap().as_deref(),
            Some("[\"A/S2/1\",\"S9-9\"]")
        );
    }

    #[test]
    fn import_drops_unknown_ids() {
        let store = MemoryStore::new();
        let mut tracker = ProgressTracker::load(Box::new(store.clone()), &catalog());
        let mut data = ExportData::new(BTreeSet::new(), BTreeSet::new());
        data.completed.insert(VerseId::from("A/S1/1"));
        data.completed.insert(VerseId::from("Z/Z/9"));
        data.favorites.insert(VerseId::from("A/S2/1"));

        assert_eq!(tracker.import(data, &catalog()), 1);
        assert!(tracker.contains(ProgressKind::Completed, &VerseId::from("A/S1/1")));
        assert!(!tracker.contains(ProgressKind::Completed, &VerseId::from("Z/Z/9")));
        assert_eq!(
            store.get(COMPLETED_KEY).unwrap().as_deref(),
            Some("[\"A/S1/1\"]")
        );
        assert_eq!(tracker.export().favorites.len(), 1);
    }
}
