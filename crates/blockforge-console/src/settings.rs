//! Tunable console constants, deserializable from the `[console]` config section.

use std::time::Duration;

use blockforge_command::GameMode;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleSettings {
    /// Squared distance beyond which the agent teleports before acting.
    /// Kept well under the true interaction range (12) to absorb drift from
    /// collision pushes.
    #[serde(default = "default_reach_distance_sq")]
    pub reach_distance_sq: i64,
    #[serde(default = "default_timeout_ms")]
    pub teleport_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub command_timeout_ms: u64,
    /// Centers with both |x| and |z| below this are refused.
    #[serde(default = "default_origin_exclusion_radius")]
    pub origin_exclusion_radius: u32,
    #[serde(default = "default_floor_block")]
    pub floor_block: String,
    /// Block placed under a helper when its floor is missing or unknown.
    #[serde(default = "default_floor_block")]
    pub support_block: String,
    #[serde(default = "default_gamemode")]
    pub gamemode: String,
}

fn default_reach_distance_sq() -> i64 {
    36
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_origin_exclusion_radius() -> u32 {
    256
}

fn default_floor_block() -> String {
    "minecraft:stone".into()
}

fn default_gamemode() -> String {
    "creative".into()
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            reach_distance_sq: default_reach_distance_sq(),
            teleport_timeout_ms: default_timeout_ms(),
            command_timeout_ms: default_timeout_ms(),
            origin_exclusion_radius: default_origin_exclusion_radius(),
            floor_block: default_floor_block(),
            support_block: default_floor_block(),
            gamemode: default_gamemode(),
        }
    }
}

impl ConsoleSettings {
    pub fn teleport_timeout(&self) -> Duration {
        Duration::from_millis(self.teleport_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// The configured game mode, falling back to creative for unknown names.
    pub fn game_mode(&self) -> GameMode {
        GameMode::from_name(&self.gamemode).unwrap_or_else(|| {
            warn!("Unknown console gamemode {:?}, using creative", self.gamemode);
            GameMode::Creative
        })
    }
}
