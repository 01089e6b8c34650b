use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::Language;

const MIN_PEEK_MILLIS: u64 = 200;
const MAX_PEEK_MILLIS: u64 = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_peek_millis")]
    pub peek_millis: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verses_path: Option<PathBuf>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_peek_millis() -> u64 {
    1500
}
fn default_theme() -> String {
    "default".to_string()
}
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("verse-drill")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::default(),
            peek_millis: default_peek_millis(),
            theme: default_theme(),
            verses_path: None,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verse-drill")
            .join("config.toml")
    }

    pub fn peek_window(&self) -> Duration {
        Duration::from_millis(self.peek_millis)
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn validate(&mut self) {
        self.peek_millis = self.peek_millis.clamp(MIN_PEEK_MILLIS, MAX_PEEK_MILLIS);
    }
}
