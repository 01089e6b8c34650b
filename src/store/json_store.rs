use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::store::kv::KeyValueStore;
use crate::store::schema::{EXPORT_VERSION, ExportData};

/// File-backed store: each key lives in `<base_dir>/<key>.json`.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.file_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        write_atomic(&self.file_path(key), value)
    }
}

/// Write through a `.tmp` sibling and rename over the target.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn save_export(path: &Path, data: &ExportData) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, &json)
}

pub fn load_export(path: &Path) -> Result<ExportData> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let data: ExportData = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    if data.export_version != EXPORT_VERSION {
        bail!(
            "Unsupported export version: {} (expected {})",
            data.export_version,
            EXPORT_VERSION
        );
    }
    Ok(data)
}
