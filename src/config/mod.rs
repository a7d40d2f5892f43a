use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{Deduplicator, Markers, Strategy};

pub const DEFAULT_CONFIG_FILE: &str = "dedupe.toml";
pub const ENV_PREFIX: &str = "DEDUPE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: PathBuf,
    pub strategy: Strategy,
    pub dry_run: bool,
    pub markers: Markers,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: PathBuf::from("src/data/apps.ts"),
            strategy: Strategy::Blocks,
            dry_run: false,
            markers: Markers::default(),
        }
    }
}

impl Config {
    /// Layer an optional TOML file and `DEDUPE_*` environment variables over
    /// the defaults. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        let config = ::config::Config::builder()
            .add_source(::config::File::from(file).required(required))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to load configuration from {}", file.display()))?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn deduplicator(&self) -> Result<Deduplicator> {
        Ok(Deduplicator::new(self.markers.clone(), self.strategy)?.dry_run(self.dry_run))
    }
}
