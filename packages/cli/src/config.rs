use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "hoist.config.json";

/// Hoist configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Mark members required by the selection `PullUp` before applying
    #[serde(default)]
    pub accept_required_members: bool,

    /// Undo history depth (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    #[serde(default)]
    pub output: OutputFormat,
}

fn default_undo_levels() -> usize {
    100
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accept_required_members: false,
            undo_levels: default_undo_levels(),
            output: OutputFormat::Text,
        }
    }
}
