//! Client-side block model: positions, faces, block states, the
//! [`BlockModel`] variants, and the fixed console slot layout.

pub mod addressing;
pub mod error;
pub mod facing;
pub mod model;
pub mod pos;
pub mod states;

pub use error::StatesParseError;
pub use facing::Facing;
pub use model::{BlockModel, ContainerBlock};
pub use pos::{BlockOffset, BlockPos};
pub use states::{canonical_name, BlockStates, StateValue};
