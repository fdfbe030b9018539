//! Work-area console for a remote block-world agent.
//!
//! [`Console`] owns a fixed nine-slot work area around a center position and
//! a client-side model of what it placed there. [`StructureCache`] snapshots
//! built containers so they can be restored instead of rebuilt. Everything
//! reaches the world through the [`GameActions`] trait.

pub mod actions;
pub mod cache;
pub mod console;
pub mod error;
pub mod observer;
pub mod settings;
pub mod sim;

pub use actions::{run_command, ActionError, GameActions, HelperKind, SnapshotId};
pub use cache::{compute_hash, CacheStats, StructureBaseContainer, StructureCache};
pub use console::{Console, SlotHandle, CONSOLE_REQUESTER, HOTBAR_SIZE, INVENTORY_SIZE};
pub use error::ConsoleError;
pub use observer::{Mutation, Observer, ObserverId};
pub use settings::ConsoleSettings;
pub use sim::{ActionKind, SimWorld};
