use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::VerseId;

pub const COMPLETED_KEY: &str = "completedVerses";
pub const FAVORITES_KEY: &str = "favorites";

pub const EXPORT_VERSION: u32 = 1;

/// Portable snapshot of saved progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub export_version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default, alias = "completedVerses")]
    pub completed: BTreeSet<VerseId>,
    #[serde(default)]
    pub favorites: BTreeSet<VerseId>,
}

impl ExportData {
    pub fn new(completed: BTreeSet<VerseId>, favorites: BTreeSet<VerseId>) -> Self {
        Self {
            export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            completed,
            favorites,
        }
    }
}
