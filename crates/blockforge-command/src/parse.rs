//! Command text parser.

use blockforge_block::{canonical_name, BlockPos, BlockStates, StatesParseError};
use thiserror::Error;

use crate::{Command, GameMode};

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("wrong number of arguments for {command}: expected {expected}, got {got}")]
    ArgumentCount {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("unsupported target: {0} (only @s)")]
    UnsupportedTarget(String),

    #[error("unknown game mode: {0}")]
    UnknownGameMode(String),

    #[error("invalid block states: {0}")]
    States(#[from] StatesParseError),
}

/// Parse command text as produced by [`Command`]'s `Display` impl.
///
/// A leading `/` is accepted. Block states are optional on `fill` and
/// `setblock`.
pub fn parse_command(text: &str) -> Result<Command, CommandParseError> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);
    let tokens = tokenize(text);
    let (name, args) = tokens.split_first().ok_or(CommandParseError::Empty)?;

    match name.to_lowercase().as_str() {
        "tp" | "teleport" => {
            expect_args("tp", args, 4, 4)?;
            expect_self(args[0])?;
            Ok(Command::Teleport {
                target: parse_pos(&args[1..4])?,
            })
        }
        "gamemode" => {
            expect_args("gamemode", args, 1, 2)?;
            if let Some(target) = args.get(1) {
                expect_self(target)?;
            }
            let mode = GameMode::from_name(args[0])
                .ok_or_else(|| CommandParseError::UnknownGameMode(args[0].to_string()))?;
            Ok(Command::GameMode(mode))
        }
        "fill" => {
            expect_args("fill", args, 7, 8)?;
            Ok(Command::Fill {
                from: parse_pos(&args[0..3])?,
                to: parse_pos(&args[3..6])?,
                block: canonical_name(args[6]),
                states: parse_states(args.get(7))?,
            })
        }
        "setblock" => {
            expect_args("setblock", args, 4, 5)?;
            Ok(Command::SetBlock {
                pos: parse_pos(&args[0..3])?,
                block: canonical_name(args[3]),
                states: parse_states(args.get(4))?,
            })
        }
        "clear" => {
            expect_args("clear", args, 1, 1)?;
            expect_self(args[0])?;
            Ok(Command::ClearInventory)
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Split on whitespace outside brackets and quotes.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => depth += 1,
            ']' if !in_quotes => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c.is_whitespace() && depth == 0 && !in_quotes {
            if let Some(s) = start.take() {
                tokens.push(&text[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

fn expect_args(
    command: &'static str,
    args: &[&str],
    min: usize,
    max: usize,
) -> Result<(), CommandParseError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(CommandParseError::ArgumentCount {
            command,
            expected: min,
            got: args.len(),
        })
    }
}

fn expect_self(target: &str) -> Result<(), CommandParseError> {
    if target == "@s" {
        Ok(())
    } else {
        Err(CommandParseError::UnsupportedTarget(target.to_string()))
    }
}

fn parse_pos(args: &[&str]) -> Result<BlockPos, CommandParseError> {
    let coord = |s: &str| {
        s.parse::<i32>()
            .map_err(|_| CommandParseError::InvalidCoordinate(s.to_string()))
    };
    Ok(BlockPos::new(coord(args[0])?, coord(args[1])?, coord(args[2])?))
}

fn parse_states(arg: Option<&&str>) -> Result<BlockStates, CommandParseError> {
    match arg {
        Some(s) => Ok(BlockStates::parse(s)?),
        None => Ok(BlockStates::new()),
    }
}
