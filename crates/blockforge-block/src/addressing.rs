//! Console slot layout.
//!
//! Nine slots: index 0 is the center, 1-8 form a ring three blocks out on the
//! same layer. Each slot has six cardinal neighbors indexed by [`Facing`].
//! Slots are far enough apart that no two slots share a neighbor.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::facing::Facing;
use crate::pos::BlockOffset;

pub const SLOT_COUNT: usize = 9;
pub const NEIGHBOR_COUNT: usize = 6;
pub const CENTER_SLOT: usize = 0;

/// Distance from the center to the ring slots.
pub const RING_RADIUS: i32 = 3;

/// Slot offsets relative to the console center.
pub const SLOT_OFFSETS: [BlockOffset; SLOT_COUNT] = [
    BlockOffset::new(0, 0, 0),
    BlockOffset::new(RING_RADIUS, 0, 0),
    BlockOffset::new(RING_RADIUS, 0, RING_RADIUS),
    BlockOffset::new(0, 0, RING_RADIUS),
    BlockOffset::new(-RING_RADIUS, 0, RING_RADIUS),
    BlockOffset::new(-RING_RADIUS, 0, 0),
    BlockOffset::new(-RING_RADIUS, 0, -RING_RADIUS),
    BlockOffset::new(0, 0, -RING_RADIUS),
    BlockOffset::new(RING_RADIUS, 0, -RING_RADIUS),
];

static SLOT_BY_OFFSET: LazyLock<HashMap<BlockOffset, usize>> = LazyLock::new(|| {
    SLOT_OFFSETS
        .iter()
        .enumerate()
        .map(|(i, off)| (*off, i))
        .collect()
});

static NEIGHBOR_BY_OFFSET: LazyLock<HashMap<BlockOffset, Facing>> =
    LazyLock::new(|| Facing::ALL.iter().map(|f| (f.offset(), *f)).collect());

/// Offset of a slot from the console center.
///
/// Out-of-range indices map to the center.
pub fn slot_offset(index: usize) -> BlockOffset {
    SLOT_OFFSETS
        .get(index)
        .copied()
        .unwrap_or(SLOT_OFFSETS[CENTER_SLOT])
}

/// Slot index for an offset from the center. Unmapped offsets map to the
/// center slot.
pub fn slot_index(offset: BlockOffset) -> usize {
    SLOT_BY_OFFSET.get(&offset).copied().unwrap_or(CENTER_SLOT)
}

/// Exact inverse lookup: `None` for offsets that are not a slot.
pub fn try_slot_index(offset: BlockOffset) -> Option<usize> {
    SLOT_BY_OFFSET.get(&offset).copied()
}

/// Offset of a neighbor relative to its slot.
pub fn neighbor_offset(facing: Facing) -> BlockOffset {
    facing.offset()
}

/// Neighbor index for a unit offset relative to a slot.
pub fn neighbor_facing(offset: BlockOffset) -> Option<Facing> {
    NEIGHBOR_BY_OFFSET.get(&offset).copied()
}

/// Offset of a slot neighbor from the console center.
pub fn slot_neighbor_offset(slot: usize, facing: Facing) -> BlockOffset {
    slot_offset(slot) + facing.offset()
}

/// Locate which slot neighbor, if any, sits at `offset` from the center.
pub fn find_slot_neighbor(offset: BlockOffset) -> Option<(usize, Facing)> {
    SLOT_OFFSETS.iter().enumerate().find_map(|(slot, slot_off)| {
        let rel = BlockOffset::new(
            offset.x - slot_off.x,
            offset.y - slot_off.y,
            offset.z - slot_off.z,
        );
        neighbor_facing(rel).map(|f| (slot, f))
    })
}

/// Inclusive bounds (min, max) of every slot and neighbor, relative to the center.
pub fn working_volume() -> (BlockOffset, BlockOffset) {
    let reach = RING_RADIUS + 1;
    (
        BlockOffset::new(-reach, -1, -reach),
        BlockOffset::new(reach, 1, reach),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn slot_round_trip() {
        for i in 0..SLOT_COUNT {
            assert_eq!(slot_index(slot_offset(i)), i);
            assert_eq!(try_slot_index(slot_offset(i)), Some(i));
        }
    }

    #[test]
    fn unmapped_offset_is_center() {
        let off = BlockOffset::new(1, 0, 1);
        assert_eq!(slot_index(off), CENTER_SLOT);
        assert_eq!(try_slot_index(off), None);
        assert_eq!(slot_offset(42), BlockOffset::ZERO);
    }

    #[test]
    fn ring_is_at_radius_three() {
        for off in &SLOT_OFFSETS[1..] {
            assert_eq!(off.y, 0);
            assert_eq!(off.x.abs().max(off.z.abs()), RING_RADIUS);
        }
    }

    #[test]
    fn neighbor_round_trip() {
        for face in Facing::ALL {
            assert_eq!(neighbor_facing(neighbor_offset(face)), Some(face));
        }
        assert_eq!(neighbor_facing(BlockOffset::new(1, 1, 0)), None);
    }

    #[test]
    fn neighbors_are_unique_and_disjoint_from_slots() {
        let mut seen = HashSet::new();
        for slot in 0..SLOT_COUNT {
            for face in Facing::ALL {
                let off = slot_neighbor_offset(slot, face);
                assert!(seen.insert(off), "shared neighbor at {off}");
                assert_eq!(try_slot_index(off), None);
                assert_eq!(find_slot_neighbor(off), Some((slot, face)));
            }
        }
        assert_eq!(seen.len(), SLOT_COUNT * NEIGHBOR_COUNT);
    }

    #[test]
    fn working_volume_covers_all_neighbors() {
        let (min, max) = working_volume();
        for slot in 0..SLOT_COUNT {
            for face in Facing::ALL {
                let off = slot_neighbor_offset(slot, face);
                assert!((min.x..=max.x).contains(&off.x));
                assert!((min.y..=max.y).contains(&off.y));
                assert!((min.z..=max.z).contains(&off.z));
            }
        }
    }
}
