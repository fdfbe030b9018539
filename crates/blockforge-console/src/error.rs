//! Console error types.

use blockforge_block::BlockPos;
use thiserror::Error;

use crate::actions::ActionError;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console is not initialized")]
    Uninitialized,

    #[error("center {center} is within {radius} blocks of the world origin")]
    UnsafeCenter { center: BlockPos, radius: u32 },

    #[error("slot index {0} out of range")]
    InvalidSlot(usize),

    #[error("inventory slot {0} out of range")]
    InvalidInventorySlot(usize),

    #[error("hotbar slot {0} out of range")]
    InvalidHotbarSlot(u8),

    #[error("slot {index} holds {block}, which cannot be opened")]
    NotOpenable { index: usize, block: String },

    #[error("{0} cannot be placed into a slot")]
    NotPlaceable(String),

    #[error("center slot holds {block}, not a container")]
    CenterNotContainer { block: String },

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl ConsoleError {
    /// Whether this is a caller mistake rather than an environment failure.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, ConsoleError::Action(_))
    }
}
