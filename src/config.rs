use crate::error::{ContentCheckError, Result};
use content_check_common::batch::{DEFAULT_CHUNK_SIZE, DEFAULT_THRESHOLD_PERCENT};
use content_check_common::message::DEFAULT_SIGNATURE;
use content_check_common::FieldSelection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 比較対象フィールド（空 = 全フィールド）
    pub default_fields: Vec<String>,
    pub threshold_percent: f64,
    pub batch_size: usize,
    pub support_signature: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ContentCheckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("content-check").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            default_fields: Vec::new(),
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            batch_size: DEFAULT_CHUNK_SIZE,
            support_signature: DEFAULT_SIGNATURE.into(),
        }
    }

    /// 既定のフィールド選択
    pub fn selection(&self) -> Result<FieldSelection> {
        if self.default_fields.is_empty() {
            return Ok(FieldSelection::all());
        }
        FieldSelection::from_names(&self.default_fields).map_err(ContentCheckError::Config)
    }

    pub fn set_threshold(&mut self, threshold_percent: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&threshold_percent) {
            return Err(ContentCheckError::Config(format!(
                "閾値は0〜100で指定してください: {}",
                threshold_percent
            )));
        }
        self.threshold_percent = threshold_percent;
        Ok(())
    }
}
