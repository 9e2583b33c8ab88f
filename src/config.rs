use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Minimum time between two accepted moves.
    #[serde(default = "defaults::cooldown_ms")]
    pub cooldown_ms: u64,
    /// Spawn seed. Drawn from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Best score of an earlier session, shown until beaten.
    #[serde(default)]
    pub high_score: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cooldown_ms: defaults::cooldown_ms(),
            seed: None,
            high_score: 0,
        }
    }
}

impl Config {
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;

        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

mod defaults {
    pub fn cooldown_ms() -> u64 {
        100
    }
}
