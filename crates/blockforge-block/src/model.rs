//! Believed block identity at a console location.
//!
//! A [`BlockModel`] never comes from the server; it is what the client last
//! did successfully at a position. Unknown state is `ComplexBlock` with
//! `known_states = false`, never an absent value.

use crate::facing::Facing;
use crate::states::{canonical_name, short_name, BlockStates};

pub const AIR: &str = "minecraft:air";
pub const ANVIL: &str = "minecraft:anvil";
pub const LOOM: &str = "minecraft:loom";

static EMPTY_STATES: BlockStates = BlockStates::EMPTY;

/// Names of containers that only open with a clear block above them.
const TOP_OPENING_CONTAINERS: &[&str] = &["chest", "trapped_chest", "ender_chest"];

/// A container block plus what must be clear for it to open.
///
/// Also serves as the "open info" stored alongside cached snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerBlock {
    pub name: String,
    pub states: BlockStates,
    /// Whether a neighbor must be air before the container can be opened.
    pub should_clean_neighbor: bool,
    /// Direction a shulker box opens towards. `None` for non-shulker containers.
    pub shulker_facing: Option<Facing>,
}

impl ContainerBlock {
    /// Describe a container, deriving clearance rules from its name.
    ///
    /// Chests open upwards; shulker boxes open towards their
    /// `facing_direction` (up when absent). Other containers (barrels,
    /// hoppers, furnaces, ...) need nothing cleared.
    pub fn new(name: &str, states: BlockStates) -> Self {
        let name = canonical_name(name);
        let short = short_name(&name);
        let (should_clean_neighbor, shulker_facing) = if short.ends_with("shulker_box") {
            let facing = states
                .get_int("facing_direction")
                .and_then(|f| usize::try_from(f).ok())
                .and_then(Facing::from_index)
                .unwrap_or(Facing::Up);
            (true, Some(facing))
        } else {
            (TOP_OPENING_CONTAINERS.contains(&short), None)
        };
        Self {
            name,
            states,
            should_clean_neighbor,
            shulker_facing,
        }
    }

    /// Which neighbor has to be cleared before opening, if any.
    pub fn clear_direction(&self) -> Option<Facing> {
        if !self.should_clean_neighbor {
            return None;
        }
        Some(self.shulker_facing.unwrap_or(Facing::Up))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockModel {
    Air,
    /// A neighbor block whose name is the only relevant fact (floors, supports).
    NearBlockMarker { name: String },
    Anvil { states: BlockStates },
    Loom,
    Container(ContainerBlock),
    ComplexBlock {
        known_states: bool,
        name: String,
        states: BlockStates,
    },
}

impl Default for BlockModel {
    fn default() -> Self {
        BlockModel::unknown()
    }
}

impl BlockModel {
    /// A position whose contents are not known at all.
    pub fn unknown() -> Self {
        BlockModel::ComplexBlock {
            known_states: false,
            name: String::new(),
            states: BlockStates::new(),
        }
    }

    pub fn marker(name: &str) -> Self {
        BlockModel::NearBlockMarker {
            name: canonical_name(name),
        }
    }

    pub fn container(name: &str, states: BlockStates) -> Self {
        BlockModel::Container(ContainerBlock::new(name, states))
    }

    pub fn block_name(&self) -> &str {
        match self {
            BlockModel::Air => AIR,
            BlockModel::NearBlockMarker { name } => name,
            BlockModel::Anvil { .. } => ANVIL,
            BlockModel::Loom => LOOM,
            BlockModel::Container(c) => &c.name,
            BlockModel::ComplexBlock { name, .. } => name,
        }
    }

    pub fn block_states(&self) -> &BlockStates {
        match self {
            BlockModel::Air | BlockModel::NearBlockMarker { .. } | BlockModel::Loom => {
                &EMPTY_STATES
            }
            BlockModel::Anvil { states } => states,
            BlockModel::Container(c) => &c.states,
            BlockModel::ComplexBlock { states, .. } => states,
        }
    }

    pub fn block_states_string(&self) -> String {
        self.block_states().to_states_string()
    }

    /// False only when the model is an incomplete `ComplexBlock`.
    pub fn known_block_states(&self) -> bool {
        match self {
            BlockModel::ComplexBlock { known_states, .. } => *known_states,
            BlockModel::Air
            | BlockModel::NearBlockMarker { .. }
            | BlockModel::Anvil { .. }
            | BlockModel::Loom
            | BlockModel::Container(_) => true,
        }
    }

    pub fn is_air(&self) -> bool {
        matches!(self, BlockModel::Air)
    }

    pub fn is_anvil(&self) -> bool {
        matches!(self, BlockModel::Anvil { .. })
    }

    pub fn is_loom(&self) -> bool {
        matches!(self, BlockModel::Loom)
    }

    pub fn as_container(&self) -> Option<&ContainerBlock> {
        match self {
            BlockModel::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this block can stand in for a solid floor under a helper.
    pub fn supports_helper(&self) -> bool {
        match self {
            BlockModel::Air => false,
            BlockModel::ComplexBlock { known_states, .. } => *known_states,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unknown() {
        let m = BlockModel::default();
        assert!(!m.known_block_states());
        assert_eq!(m.block_name(), "");
    }

    #[test]
    fn names_of_fixed_variants() {
        assert_eq!(BlockModel::Air.block_name(), "minecraft:air");
        assert_eq!(BlockModel::Loom.block_name(), "minecraft:loom");
        let anvil = BlockModel::Anvil {
            states: BlockStates::new().with("damage", "undamaged"),
        };
        assert_eq!(anvil.block_name(), "minecraft:anvil");
        assert_eq!(anvil.block_states_string(), r#"["damage"="undamaged"]"#);
        assert_eq!(BlockModel::Loom.block_states_string(), "[]");
    }

    #[test]
    fn marker_canonicalizes() {
        assert_eq!(BlockModel::marker("Stone").block_name(), "minecraft:stone");
    }

    #[test]
    fn chest_cleans_above() {
        let c = ContainerBlock::new("chest", BlockStates::new());
        assert_eq!(c.name, "minecraft:chest");
        assert!(c.should_clean_neighbor);
        assert_eq!(c.shulker_facing, None);
        assert_eq!(c.clear_direction(), Some(Facing::Up));
    }

    #[test]
    fn shulker_cleans_facing() {
        let c = ContainerBlock::new(
            "minecraft:red_shulker_box",
            BlockStates::new().with("facing_direction", 4),
        );
        assert!(c.should_clean_neighbor);
        assert_eq!(c.shulker_facing, Some(Facing::West));
        assert_eq!(c.clear_direction(), Some(Facing::West));

        let undyed = ContainerBlock::new("undyed_shulker_box", BlockStates::new());
        assert_eq!(undyed.clear_direction(), Some(Facing::Up));
    }

    #[test]
    fn barrel_needs_nothing() {
        let c = ContainerBlock::new("barrel", BlockStates::new().with("facing_direction", 1));
        assert!(!c.should_clean_neighbor);
        assert_eq!(c.clear_direction(), None);
    }

    #[test]
    fn known_states() {
        assert!(BlockModel::Air.known_block_states());
        assert!(BlockModel::container("chest", BlockStates::new()).known_block_states());
        let partial = BlockModel::ComplexBlock {
            known_states: false,
            name: "minecraft:standing_sign".into(),
            states: BlockStates::new(),
        };
        assert!(!partial.known_block_states());
    }

    #[test]
    fn support_rules() {
        assert!(!BlockModel::Air.supports_helper());
        assert!(!BlockModel::unknown().supports_helper());
        assert!(BlockModel::marker("stone").supports_helper());
        let known = BlockModel::ComplexBlock {
            known_states: true,
            name: "minecraft:glass".into(),
            states: BlockStates::new(),
        };
        assert!(known.supports_helper());
    }

    #[test]
    fn structural_equality() {
        let a = BlockModel::container("chest", BlockStates::new());
        let b = BlockModel::container("minecraft:chest", BlockStates::new());
        assert_eq!(a, b);
        assert_ne!(a, BlockModel::container("barrel", BlockStates::new()));
    }
}
