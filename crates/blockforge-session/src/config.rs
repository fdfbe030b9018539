use blockforge_block::{BlockPos, Facing};
use blockforge_console::ConsoleSettings;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    pub session: SessionSection,
    #[serde(default)]
    pub console: ConsoleSettings,
    pub logging: LoggingSection,
    /// Containers to build (or restore) at startup.
    #[serde(default)]
    pub warmup: Vec<WarmupContainer>,
}

#[derive(Debug, Deserialize)]
pub struct SessionSection {
    #[serde(default)]
    pub dimension: i32,
    pub center: BlockPos,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct WarmupContainer {
    pub name: String,
    /// Canonical state string, e.g. `["facing_direction"=2]`.
    #[serde(default = "default_states")]
    pub states: String,
    #[serde(default)]
    pub custom_name: String,
    #[serde(default)]
    pub facing: Option<Facing>,
}

fn default_states() -> String {
    "[]".into()
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
