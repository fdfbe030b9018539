//! Cardinal block faces.
//!
//! Ordering follows the Bedrock `facing_direction` block state, so a facing
//! doubles as the neighbor index within a console slot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pos::BlockOffset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Facing {
    /// All faces in `facing_direction` order.
    pub const ALL: [Facing; 6] = [
        Facing::Down,
        Facing::Up,
        Facing::North,
        Facing::South,
        Facing::West,
        Facing::East,
    ];

    /// Map a `facing_direction` value (0-5) to a face.
    pub fn from_index(index: usize) -> Option<Facing> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset pointing out of this face.
    pub const fn offset(self) -> BlockOffset {
        match self {
            Facing::Down => BlockOffset::new(0, -1, 0),
            Facing::Up => BlockOffset::new(0, 1, 0),
            Facing::North => BlockOffset::new(0, 0, -1),
            Facing::South => BlockOffset::new(0, 0, 1),
            Facing::West => BlockOffset::new(-1, 0, 0),
            Facing::East => BlockOffset::new(1, 0, 0),
        }
    }

    pub fn opposite(self) -> Facing {
        match self {
            Facing::Down => Facing::Up,
            Facing::Up => Facing::Down,
            Facing::North => Facing::South,
            Facing::South => Facing::North,
            Facing::West => Facing::East,
            Facing::East => Facing::West,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Facing::Down => "down",
            Facing::Up => "up",
            Facing::North => "north",
            Facing::South => "south",
            Facing::West => "west",
            Facing::East => "east",
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for face in Facing::ALL {
            assert_eq!(Facing::from_index(face.index()), Some(face));
        }
        assert_eq!(Facing::from_index(6), None);
    }

    #[test]
    fn opposite_offsets_cancel() {
        for face in Facing::ALL {
            let sum = face.offset() + face.opposite().offset();
            assert_eq!(sum, BlockOffset::ZERO, "{face}");
        }
    }

    #[test]
    fn bedrock_facing_direction_values() {
        assert_eq!(Facing::Up.index(), 1);
        assert_eq!(Facing::East.index(), 5);
        assert_eq!(Facing::North.offset(), BlockOffset::new(0, 0, -1));
    }
}
