use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Best result so far, kept in a small TOML file next to the binary's
/// working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub points: u32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub name: String,
}

impl HighScore {
    /// A missing file is an empty high score.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading high score {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing high score {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("writing high score {}", path.display()))
    }

    /// Replaces the record if `points` beats it.
    pub fn submit(&mut self, points: u32, level: u32, name: &str) -> bool {
        if points <= self.points {
            return false;
        }
        self.points = points;
        self.level = level;
        self.name = name.to_string();
        true
    }
}
