//! The game-action interface: every way the console can touch the remote world.
//!
//! Implementations wrap a live session transport; the offline
//! [`SimWorld`](crate::sim::SimWorld) implements it in memory. All calls
//! block until the environment acknowledges them.

use std::fmt;
use std::time::Duration;

use blockforge_block::model::{ANVIL, LOOM};
use blockforge_block::{BlockPos, BlockStates};
use blockforge_command::{Command, CommandOutput};
use thiserror::Error;

/// Opaque handle to a region captured by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(pub u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot#{}", self.0)
    }
}

/// Helper blocks the console places through the dedicated helper action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperKind {
    Anvil,
    Loom,
}

impl HelperKind {
    pub fn block_name(self) -> &'static str {
        match self {
            HelperKind::Anvil => ANVIL,
            HelperKind::Loom => LOOM,
        }
    }
}

impl fmt::Display for HelperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.block_name())
    }
}

/// Failure reported by (or while waiting on) the environment.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("timed out after {waited:?} waiting for {action}")]
    Timeout { action: String, waited: Duration },

    #[error("{action} rejected: {reason}")]
    Rejected { action: &'static str, reason: String },

    #[error("command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("unknown {0}")]
    UnknownSnapshot(SnapshotId),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Capability set the console and structure cache are built on.
pub trait GameActions {
    /// Place a block given its name and canonical state string.
    fn place_block(&mut self, pos: BlockPos, name: &str, states: &str) -> Result<(), ActionError>;

    /// Place an anvil or loom, optionally putting `support` underneath first.
    /// Returns the block states the helper ended up with.
    fn set_helper_block(
        &mut self,
        pos: BlockPos,
        kind: HelperKind,
        support: Option<&str>,
    ) -> Result<BlockStates, ActionError>;

    /// Use (open) the block at `pos`. `Ok(false)` means the environment
    /// acknowledged the request but the block did not open.
    fn open_container(
        &mut self,
        pos: BlockPos,
        name: &str,
        states: &BlockStates,
    ) -> Result<bool, ActionError>;

    /// Switch the held hotbar slot (0-8).
    fn change_held_slot(&mut self, slot: u8) -> Result<(), ActionError>;

    /// Send a command and wait up to `timeout` for its acknowledgment.
    fn send_command(
        &mut self,
        command: &Command,
        timeout: Duration,
    ) -> Result<CommandOutput, ActionError>;

    /// Capture the inclusive box `from..=to`.
    fn backup_region(&mut self, from: BlockPos, to: BlockPos) -> Result<SnapshotId, ActionError>;

    /// Restore a snapshot with its minimum corner at `at`.
    fn revert_snapshot(&mut self, id: SnapshotId, at: BlockPos) -> Result<(), ActionError>;

    fn delete_snapshot(&mut self, id: SnapshotId) -> Result<(), ActionError>;
}

impl<T: GameActions + ?Sized> GameActions for Box<T> {
    fn place_block(&mut self, pos: BlockPos, name: &str, states: &str) -> Result<(), ActionError> {
        (**self).place_block(pos, name, states)
    }

    fn set_helper_block(
        &mut self,
        pos: BlockPos,
        kind: HelperKind,
        support: Option<&str>,
    ) -> Result<BlockStates, ActionError> {
        (**self).set_helper_block(pos, kind, support)
    }

    fn open_container(
        &mut self,
        pos: BlockPos,
        name: &str,
        states: &BlockStates,
    ) -> Result<bool, ActionError> {
        (**self).open_container(pos, name, states)
    }

    fn change_held_slot(&mut self, slot: u8) -> Result<(), ActionError> {
        (**self).change_held_slot(slot)
    }

    fn send_command(
        &mut self,
        command: &Command,
        timeout: Duration,
    ) -> Result<CommandOutput, ActionError> {
        (**self).send_command(command, timeout)
    }

    fn backup_region(&mut self, from: BlockPos, to: BlockPos) -> Result<SnapshotId, ActionError> {
        (**self).backup_region(from, to)
    }

    fn revert_snapshot(&mut self, id: SnapshotId, at: BlockPos) -> Result<(), ActionError> {
        (**self).revert_snapshot(id, at)
    }

    fn delete_snapshot(&mut self, id: SnapshotId) -> Result<(), ActionError> {
        (**self).delete_snapshot(id)
    }
}

/// Send a command and turn a zero-success acknowledgment into an error.
pub fn run_command<A: GameActions + ?Sized>(
    actions: &mut A,
    command: &Command,
    timeout: Duration,
) -> Result<CommandOutput, ActionError> {
    let output = actions.send_command(command, timeout)?;
    if output.is_success() {
        Ok(output)
    } else {
        Err(ActionError::CommandFailed {
            command: command.to_string(),
            message: output.summary().to_string(),
        })
    }
}
