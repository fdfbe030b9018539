//! Scripted commands issued to the remote world, and their acknowledgments.
//!
//! Commands are built as typed values, rendered to Bedrock command text, and
//! can be parsed back from text (the offline world uses this to apply them).

mod parse;

use std::fmt;

use blockforge_block::{BlockPos, BlockStates};

pub use parse::{parse_command, CommandParseError};

/// Game modes the console may force the agent into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    pub fn name(self) -> &'static str {
        match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Spectator => "spectator",
        }
    }

    /// Parse a game mode name or its numeric/short alias.
    pub fn from_name(name: &str) -> Option<GameMode> {
        match name.to_lowercase().as_str() {
            "survival" | "s" | "0" => Some(GameMode::Survival),
            "creative" | "c" | "1" => Some(GameMode::Creative),
            "adventure" | "a" | "2" => Some(GameMode::Adventure),
            "spectator" | "6" => Some(GameMode::Spectator),
            _ => None,
        }
    }
}

/// A command the console can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `tp @s x y z`
    Teleport { target: BlockPos },
    /// `gamemode <mode> @s`
    GameMode(GameMode),
    /// `fill x1 y1 z1 x2 y2 z2 <block> <states>`
    Fill {
        from: BlockPos,
        to: BlockPos,
        block: String,
        states: BlockStates,
    },
    /// `setblock x y z <block> <states>`
    SetBlock {
        pos: BlockPos,
        block: String,
        states: BlockStates,
    },
    /// `clear @s`
    ClearInventory,
}

impl Command {
    pub fn fill(from: BlockPos, to: BlockPos, block: &str) -> Self {
        Command::Fill {
            from,
            to,
            block: blockforge_block::canonical_name(block),
            states: BlockStates::new(),
        }
    }

    pub fn set_block(pos: BlockPos, block: &str, states: BlockStates) -> Self {
        Command::SetBlock {
            pos,
            block: blockforge_block::canonical_name(block),
            states,
        }
    }

    /// Number of blocks a fill covers.
    pub fn fill_volume(from: BlockPos, to: BlockPos) -> u64 {
        let span = |a: i32, b: i32| (a as i64 - b as i64).unsigned_abs() + 1;
        span(from.x, to.x) * span(from.y, to.y) * span(from.z, to.z)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Teleport { target } => write!(f, "tp @s {target}"),
            Command::GameMode(mode) => write!(f, "gamemode {} @s", mode.name()),
            Command::Fill {
                from,
                to,
                block,
                states,
            } => write!(f, "fill {from} {to} {block} {states}"),
            Command::SetBlock { pos, block, states } => {
                write!(f, "setblock {pos} {block} {states}")
            }
            Command::ClearInventory => f.write_str("clear @s"),
        }
    }
}

/// Structured acknowledgment of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// How many targets the command succeeded on.
    pub success_count: u32,
    /// Output messages reported by the server.
    pub messages: Vec<String>,
}

impl CommandOutput {
    /// A successful acknowledgment with a single message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success_count: 1,
            messages: vec![message.into()],
        }
    }

    /// A failed acknowledgment with a single message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success_count: 0,
            messages: vec![message.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.success_count > 0
    }

    /// First message, or an empty string.
    pub fn summary(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or("")
    }
}

// ===========================================================================
// Tests
// ===========================================================================
