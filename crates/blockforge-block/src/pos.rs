//! Absolute block positions and relative offsets.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BlockPos (i32 x, y, z)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another position, saturating at
    /// `i64::MAX` for positions near opposite ends of the coordinate range.
    pub fn distance_sq(&self, other: BlockPos) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        let dz = self.z as i64 - other.z as i64;
        dx.saturating_mul(dx)
            .saturating_add(dy.saturating_mul(dy))
            .saturating_add(dz.saturating_mul(dz))
    }

    /// Offset from `origin` to this position. Components saturate at the
    /// `i32` range.
    pub fn offset_from(&self, origin: BlockPos) -> BlockOffset {
        BlockOffset::new(
            self.x.saturating_sub(origin.x),
            self.y.saturating_sub(origin.y),
            self.z.saturating_sub(origin.z),
        )
    }
}

impl Add<BlockOffset> for BlockPos {
    type Output = BlockPos;
    fn add(self, rhs: BlockOffset) -> BlockPos {
        BlockPos::new(
            self.x.saturating_add(rhs.x),
            self.y.saturating_add(rhs.y),
            self.z.saturating_add(rhs.z),
        )
    }
}

impl Sub<BlockOffset> for BlockPos {
    type Output = BlockPos;
    fn sub(self, rhs: BlockOffset) -> BlockPos {
        BlockPos::new(
            self.x.saturating_sub(rhs.x),
            self.y.saturating_sub(rhs.y),
            self.z.saturating_sub(rhs.z),
        )
    }
}

/// Command-text form: `x y z`.
impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// BlockOffset
// ---------------------------------------------------------------------------

/// A relative displacement between two block positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockOffset {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockOffset {
    pub const ZERO: BlockOffset = BlockOffset::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl Add for BlockOffset {
    type Output = BlockOffset;
    fn add(self, rhs: BlockOffset) -> BlockOffset {
        BlockOffset::new(
            self.x.saturating_add(rhs.x),
            self.y.saturating_add(rhs.y),
            self.z.saturating_add(rhs.z),
        )
    }
}

impl Neg for BlockOffset {
    type Output = BlockOffset;
    fn neg(self) -> BlockOffset {
        BlockOffset::new(
            self.x.saturating_neg(),
            self.y.saturating_neg(),
            self.z.saturating_neg(),
        )
    }
}

impl fmt::Display for BlockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_sq_is_symmetric() {
        let a = BlockPos::new(10, 64, -3);
        let b = BlockPos::new(4, 66, 1);
        assert_eq!(a.distance_sq(b), 36 + 4 + 16);
        assert_eq!(b.distance_sq(a), a.distance_sq(b));
    }

    #[test]
    fn distance_sq_does_not_overflow() {
        let a = BlockPos::new(i32::MAX, 0, 0);
        let b = BlockPos::new(-i32::MAX, 0, 0);
        assert_eq!(a.distance_sq(b), i64::MAX);

        // Wider than i32 but still representable.
        let c = BlockPos::new(1_000_000_000, 0, 0);
        let d = BlockPos::new(-1_000_000_000, 0, 0);
        assert_eq!(c.distance_sq(d), 4_000_000_000_000_000_000);

        let e = BlockPos::new(i32::MIN, i32::MIN, i32::MIN);
        let f = BlockPos::new(i32::MAX, i32::MAX, i32::MAX);
        assert_eq!(e.distance_sq(f), i64::MAX);
    }

    #[test]
    fn arithmetic_saturates_at_range_edges() {
        let edge = BlockPos::new(i32::MAX, 0, i32::MIN);
        assert_eq!(
            edge + BlockOffset::new(5, 0, -5),
            BlockPos::new(i32::MAX, 0, i32::MIN)
        );
        assert_eq!(
            edge - BlockOffset::new(-5, 0, 5),
            BlockPos::new(i32::MAX, 0, i32::MIN)
        );
        assert_eq!(
            edge.offset_from(BlockPos::new(-1, 0, 1)),
            BlockOffset::new(i32::MAX, 0, i32::MIN)
        );
        assert_eq!(
            -BlockOffset::new(i32::MIN, 0, 0),
            BlockOffset::new(i32::MAX, 0, 0)
        );
    }

    #[test]
    fn offset_arithmetic() {
        let origin = BlockPos::new(100, 70, 100);
        let off = BlockOffset::new(3, 0, -3);
        let p = origin + off;
        assert_eq!(p, BlockPos::new(103, 70, 97));
        assert_eq!(p.offset_from(origin), off);
        assert_eq!(p - off, origin);
        assert_eq!(-off, BlockOffset::new(-3, 0, 3));
    }

    #[test]
    fn display_is_command_form() {
        assert_eq!(BlockPos::new(1, -2, 3).to_string(), "1 -2 3");
    }
}
