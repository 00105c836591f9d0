use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::NormalizeOptions;

/// Config file looked up in the working directory when `ENTRADA_NF_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "entrada-nf.json";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub dates: DateConfig,
    /// Where "Export CSV" writes; the source directory when unset.
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub day_first: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("arquivos"),
            prefix: "entrada_mercadoria_".to_string(),
            suffix: ".xlsx".to_string(),
        }
    }
}

impl Default for DateConfig {
    fn default() -> Self {
        Self { day_first: true }
    }
}

impl AppConfig {
    /// Defaults, then the JSON config file (if any), then environment overrides.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os("ENTRADA_NF_CONFIG").map(PathBuf::from);
        let mut config = match &explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Override fields from `ENTRADA_NF_DIR`, `ENTRADA_NF_PREFIX` and `ENTRADA_NF_SUFFIX`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("ENTRADA_NF_DIR") {
            self.source.directory = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("ENTRADA_NF_PREFIX") {
            self.source.prefix = prefix;
        }
        if let Some(suffix) = lookup("ENTRADA_NF_SUFFIX") {
            self.source.suffix = suffix;
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            day_first: self.dates.day_first,
        }
    }

    pub fn export_dir(&self) -> &Path {
        self.export_dir.as_deref().unwrap_or(self.source.directory.as_path())
    }
}
