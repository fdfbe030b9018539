//! In-memory world implementing [`GameActions`].
//!
//! Used by the dry-run binary and by tests. Blocks live in a sparse map
//! (absent means air), commands are applied by parsing their rendered text,
//! and any action kind can be made to fail on demand.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use blockforge_block::model::AIR;
use blockforge_block::{
    canonical_name, BlockOffset, BlockPos, BlockStates, ContainerBlock, Facing,
};
use blockforge_command::{parse_command, Command, CommandOutput, GameMode};
use tracing::{debug, trace};

use crate::actions::{ActionError, GameActions, HelperKind, SnapshotId};

/// Largest region a single `fill` may cover.
pub const MAX_FILL_VOLUME: u64 = 32_768;

/// Squared interaction range of the simulated player.
pub const INTERACT_DISTANCE_SQ: i64 = 144;

/// Action categories counted (and failable) by [`SimWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    PlaceBlock,
    SetHelper,
    OpenContainer,
    ChangeHeldSlot,
    Command,
    Backup,
    Revert,
    DeleteSnapshot,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::PlaceBlock => "place_block",
            ActionKind::SetHelper => "set_helper_block",
            ActionKind::OpenContainer => "open_container",
            ActionKind::ChangeHeldSlot => "change_held_slot",
            ActionKind::Command => "send_command",
            ActionKind::Backup => "backup_region",
            ActionKind::Revert => "revert_snapshot",
            ActionKind::DeleteSnapshot => "delete_snapshot",
        }
    }
}

struct Snapshot {
    size: BlockOffset,
    blocks: Vec<(BlockOffset, String, BlockStates)>,
}

pub struct SimWorld {
    blocks: HashMap<BlockPos, (String, BlockStates)>,
    player: BlockPos,
    game_mode: GameMode,
    held_slot: u8,
    snapshots: HashMap<SnapshotId, Snapshot>,
    next_snapshot: u64,
    calls: HashMap<ActionKind, usize>,
    teleports: usize,
    command_log: Vec<String>,
    failing: HashSet<ActionKind>,
    lose_teleports: bool,
    last_support: Option<String>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            player: BlockPos::default(),
            game_mode: GameMode::Survival,
            held_slot: 0,
            snapshots: HashMap::new(),
            next_snapshot: 1,
            calls: HashMap::new(),
            teleports: 0,
            command_log: Vec::new(),
            failing: HashSet::new(),
            lose_teleports: false,
            last_support: None,
        }
    }

    // -----------------------------------------------------------------------
    // World access
    // -----------------------------------------------------------------------

    /// Block at `pos`, or `None` for air.
    pub fn block_at(&self, pos: BlockPos) -> Option<(&str, &BlockStates)> {
        self.blocks.get(&pos).map(|(name, states)| (name.as_str(), states))
    }

    /// Put a block directly, bypassing action accounting.
    pub fn set_block(&mut self, pos: BlockPos, name: &str, states: BlockStates) {
        let name = canonical_name(name);
        if name == AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, (name, states));
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn player_position(&self) -> BlockPos {
        self.player
    }

    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    pub fn held_slot(&self) -> u8 {
        self.held_slot
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    // -----------------------------------------------------------------------
    // Accounting and failure injection
    // -----------------------------------------------------------------------

    pub fn call_count(&self, kind: ActionKind) -> usize {
        self.calls.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.values().sum()
    }

    /// Successful teleports since the last reset.
    pub fn teleport_count(&self) -> usize {
        self.teleports
    }

    /// Rendered text of every command received since the last reset.
    pub fn command_log(&self) -> &[String] {
        &self.command_log
    }

    /// Support block placed by the most recent helper placement, if any.
    pub fn last_support(&self) -> Option<&str> {
        self.last_support.as_deref()
    }

    pub fn reset_counts(&mut self) {
        self.calls.clear();
        self.teleports = 0;
        self.command_log.clear();
        self.last_support = None;
    }

    /// Make every subsequent action of `kind` fail.
    pub fn fail(&mut self, kind: ActionKind) {
        self.failing.insert(kind);
    }

    pub fn recover(&mut self, kind: ActionKind) {
        self.failing.remove(&kind);
    }

    /// Drop teleport acknowledgments so callers time out.
    pub fn lose_teleports(&mut self, lose: bool) {
        self.lose_teleports = lose;
    }

    fn record(&mut self, kind: ActionKind) -> Result<(), ActionError> {
        *self.calls.entry(kind).or_insert(0) += 1;
        if self.failing.contains(&kind) {
            return Err(ActionError::Rejected {
                action: kind.name(),
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Command application
    // -----------------------------------------------------------------------

    fn apply(
        &mut self,
        command: Command,
        text: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, ActionError> {
        match command {
            Command::Teleport { target } => {
                if self.lose_teleports {
                    return Err(ActionError::Timeout {
                        action: text.to_string(),
                        waited: timeout,
                    });
                }
                self.player = target;
                self.teleports += 1;
                Ok(CommandOutput::ok(format!("Teleported to {target}")))
            }
            Command::GameMode(mode) => {
                self.game_mode = mode;
                Ok(CommandOutput::ok(format!("Set own game mode to {}", mode.name())))
            }
            Command::Fill {
                from,
                to,
                block,
                states,
            } => {
                let volume = Command::fill_volume(from, to);
                if volume > MAX_FILL_VOLUME {
                    return Ok(CommandOutput::failed(format!(
                        "Too many blocks in the specified area ({volume} > {MAX_FILL_VOLUME})"
                    )));
                }
                let (min, max) = corners(from, to);
                for pos in region(min, max) {
                    self.set_block(pos, &block, states.clone());
                }
                Ok(CommandOutput::ok(format!("{volume} blocks filled")))
            }
            Command::SetBlock { pos, block, states } => {
                self.set_block(pos, &block, states);
                Ok(CommandOutput::ok("Block placed"))
            }
            Command::ClearInventory => Ok(CommandOutput::ok("Cleared the inventory")),
        }
    }
}

impl GameActions for SimWorld {
    fn place_block(&mut self, pos: BlockPos, name: &str, states: &str) -> Result<(), ActionError> {
        self.record(ActionKind::PlaceBlock)?;
        let states = BlockStates::parse(states).map_err(|e| ActionError::Rejected {
            action: ActionKind::PlaceBlock.name(),
            reason: e.to_string(),
        })?;
        let command = Command::set_block(pos, name, states);
        let text = command.to_string();
        trace!("{text}");
        let output = self.apply(command, &text, Duration::ZERO)?;
        if !output.is_success() {
            return Err(ActionError::Rejected {
                action: ActionKind::PlaceBlock.name(),
                reason: output.summary().to_string(),
            });
        }
        Ok(())
    }

    fn set_helper_block(
        &mut self,
        pos: BlockPos,
        kind: HelperKind,
        support: Option<&str>,
    ) -> Result<BlockStates, ActionError> {
        self.record(ActionKind::SetHelper)?;
        if let Some(support) = support {
            self.set_block(pos + Facing::Down.offset(), support, BlockStates::new());
        }
        self.last_support = support.map(str::to_string);
        let states = match kind {
            HelperKind::Anvil => BlockStates::new()
                .with("damage", "undamaged")
                .with("minecraft:cardinal_direction", "north"),
            HelperKind::Loom => BlockStates::new().with("direction", 0),
        };
        self.set_block(pos, kind.block_name(), states.clone());
        Ok(states)
    }

    fn open_container(
        &mut self,
        pos: BlockPos,
        name: &str,
        states: &BlockStates,
    ) -> Result<bool, ActionError> {
        self.record(ActionKind::OpenContainer)?;
        let expected = canonical_name(name);
        match self.block_at(pos) {
            Some((actual, _)) if actual == expected => {}
            other => {
                debug!("open at {pos}: expected {expected}, found {other:?}");
                return Ok(false);
            }
        }
        if self.player.distance_sq(pos) > INTERACT_DISTANCE_SQ {
            debug!("open at {pos}: out of reach from {}", self.player);
            return Ok(false);
        }
        let info = ContainerBlock::new(&expected, states.clone());
        if let Some(facing) = info.clear_direction() {
            if self.block_at(pos + facing.offset()).is_some() {
                debug!("open at {pos}: {facing} side obstructed");
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn change_held_slot(&mut self, slot: u8) -> Result<(), ActionError> {
        self.record(ActionKind::ChangeHeldSlot)?;
        if slot >= 9 {
            return Err(ActionError::Rejected {
                action: ActionKind::ChangeHeldSlot.name(),
                reason: format!("hotbar slot {slot} out of range"),
            });
        }
        self.held_slot = slot;
        Ok(())
    }

    fn send_command(
        &mut self,
        command: &Command,
        timeout: Duration,
    ) -> Result<CommandOutput, ActionError> {
        self.record(ActionKind::Command)?;
        let text = command.to_string();
        self.command_log.push(text.clone());
        let parsed = parse_command(&text)
            .map_err(|e| ActionError::Transport(format!("unparseable command `{text}`: {e}")))?;
        self.apply(parsed, &text, timeout)
    }

    fn backup_region(&mut self, from: BlockPos, to: BlockPos) -> Result<SnapshotId, ActionError> {
        self.record(ActionKind::Backup)?;
        let (min, max) = corners(from, to);
        let blocks = region(min, max)
            .filter_map(|pos| {
                self.blocks
                    .get(&pos)
                    .map(|(name, states)| (pos.offset_from(min), name.clone(), states.clone()))
            })
            .collect();
        let id = SnapshotId(self.next_snapshot);
        self.next_snapshot += 1;
        self.snapshots.insert(
            id,
            Snapshot {
                size: max.offset_from(min),
                blocks,
            },
        );
        debug!("captured {id} over {min}..{max}");
        Ok(id)
    }

    fn revert_snapshot(&mut self, id: SnapshotId, at: BlockPos) -> Result<(), ActionError> {
        self.record(ActionKind::Revert)?;
        let snapshot = self
            .snapshots
            .get(&id)
            .ok_or(ActionError::UnknownSnapshot(id))?;
        let cleared: Vec<BlockPos> = region(at, at + snapshot.size).collect();
        let restored: Vec<(BlockPos, String, BlockStates)> = snapshot
            .blocks
            .iter()
            .map(|(offset, name, states)| (at + *offset, name.clone(), states.clone()))
            .collect();
        for pos in cleared {
            self.blocks.remove(&pos);
        }
        for (pos, name, states) in restored {
            self.blocks.insert(pos, (name, states));
        }
        Ok(())
    }

    fn delete_snapshot(&mut self, id: SnapshotId) -> Result<(), ActionError> {
        self.record(ActionKind::DeleteSnapshot)?;
        self.snapshots
            .remove(&id)
            .map(|_| ())
            .ok_or(ActionError::UnknownSnapshot(id))
    }
}

/// Normalize two corners into (min, max).
fn corners(a: BlockPos, b: BlockPos) -> (BlockPos, BlockPos) {
    (
        BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
        BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
    )
}

/// Every position in the inclusive box `min..=max`.
fn region(min: BlockPos, max: BlockPos) -> impl Iterator<Item = BlockPos> {
    (min.x..=max.x).flat_map(move |x| {
        (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| BlockPos::new(x, y, z)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: BlockPos = BlockPos::new(500, 70, 500);

    fn chest_states() -> BlockStates {
        BlockStates::new().with("facing_direction", 2)
    }

    #[test]
    fn fill_sets_and_clears() {
        let mut world = SimWorld::new();
        let to = ORIGIN + BlockOffset::new(2, 0, 2);
        let out = world
            .send_command(&Command::fill(ORIGIN, to, "stone"), Duration::from_secs(1))
            .unwrap();
        assert!(out.is_success());
        assert_eq!(world.block_count(), 9);

        world
            .send_command(&Command::fill(to, ORIGIN, "air"), Duration::from_secs(1))
            .unwrap();
        assert_eq!(world.block_count(), 0);
        assert_eq!(world.command_log().len(), 2);
    }

    #[test]
    fn oversized_fill_is_refused() {
        let mut world = SimWorld::new();
        let out = world
            .send_command(
                &Command::fill(ORIGIN, ORIGIN + BlockOffset::new(40, 40, 40), "stone"),
                Duration::from_secs(1),
            )
            .unwrap();
        assert!(!out.is_success());
        assert!(out.summary().contains("Too many blocks"));
        assert_eq!(world.block_count(), 0);
    }

    #[test]
    fn teleport_and_lost_acknowledgment() {
        let mut world = SimWorld::new();
        let tp = Command::Teleport { target: ORIGIN };
        world.send_command(&tp, Duration::from_secs(1)).unwrap();
        assert_eq!(world.player_position(), ORIGIN);
        assert_eq!(world.teleport_count(), 1);

        world.lose_teleports(true);
        let far = Command::Teleport {
            target: ORIGIN + BlockOffset::new(50, 0, 0),
        };
        let err = world.send_command(&far, Duration::from_millis(250)).unwrap_err();
        match err {
            ActionError::Timeout { action, waited } => {
                assert_eq!(action, far.to_string());
                assert_eq!(waited, Duration::from_millis(250));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(world.player_position(), ORIGIN);
    }

    #[test]
    fn place_block_parses_states() {
        let mut world = SimWorld::new();
        world
            .place_block(ORIGIN, "minecraft:chest", r#"["facing_direction"=2]"#)
            .unwrap();
        let (name, states) = world.block_at(ORIGIN).unwrap();
        assert_eq!(name, "minecraft:chest");
        assert_eq!(states, &chest_states());

        assert!(matches!(
            world.place_block(ORIGIN, "minecraft:chest", "facing_direction=2"),
            Err(ActionError::Rejected { .. })
        ));
    }

    #[test]
    fn place_block_applies_a_setblock() {
        let mut world = SimWorld::new();
        let command = Command::set_block(ORIGIN, "Chest", chest_states());
        assert_eq!(
            command.to_string(),
            format!("setblock {ORIGIN} minecraft:chest [\"facing_direction\"=2]")
        );

        world
            .place_block(ORIGIN, "Chest", &chest_states().to_states_string())
            .unwrap();
        assert_eq!(
            world.block_at(ORIGIN),
            Some(("minecraft:chest", &chest_states()))
        );
        // Placement is an action of its own, not a scripted command.
        assert!(world.command_log().is_empty());
        assert_eq!(world.call_count(ActionKind::Command), 0);

        world.place_block(ORIGIN, "air", "[]").unwrap();
        assert!(world.block_at(ORIGIN).is_none());
        assert_eq!(world.call_count(ActionKind::PlaceBlock), 2);
    }

    #[test]
    fn open_requires_matching_block_reach_and_clearance() {
        let mut world = SimWorld::new();
        world.player = ORIGIN;
        world.set_block(ORIGIN, "chest", chest_states());
        assert!(world.open_container(ORIGIN, "chest", &chest_states()).unwrap());
        assert!(!world.open_container(ORIGIN, "barrel", &BlockStates::new()).unwrap());

        world.set_block(ORIGIN + Facing::Up.offset(), "dirt", BlockStates::new());
        assert!(!world.open_container(ORIGIN, "chest", &chest_states()).unwrap());

        world.set_block(ORIGIN + Facing::Up.offset(), "air", BlockStates::new());
        world.player = ORIGIN + BlockOffset::new(13, 0, 0);
        assert!(!world.open_container(ORIGIN, "chest", &chest_states()).unwrap());
        assert_eq!(world.call_count(ActionKind::OpenContainer), 4);
    }

    #[test]
    fn snapshot_round_trip_at_new_location() {
        let mut world = SimWorld::new();
        world.set_block(ORIGIN, "chest", chest_states());
        let id = world.backup_region(ORIGIN, ORIGIN).unwrap();
        assert_eq!(world.snapshot_count(), 1);

        world.set_block(ORIGIN, "air", BlockStates::new());
        let elsewhere = ORIGIN + BlockOffset::new(0, 5, 0);
        world.set_block(elsewhere, "dirt", BlockStates::new());
        world.revert_snapshot(id, elsewhere).unwrap();
        assert!(world.block_at(ORIGIN).is_none());
        assert_eq!(
            world.block_at(elsewhere),
            Some(("minecraft:chest", &chest_states()))
        );

        world.delete_snapshot(id).unwrap();
        assert!(matches!(
            world.delete_snapshot(id),
            Err(ActionError::UnknownSnapshot(_))
        ));
        assert!(matches!(
            world.revert_snapshot(id, ORIGIN),
            Err(ActionError::UnknownSnapshot(_))
        ));
    }

    #[test]
    fn injected_failures_are_counted_and_recoverable() {
        let mut world = SimWorld::new();
        world.fail(ActionKind::ChangeHeldSlot);
        let err = world.change_held_slot(3).unwrap_err();
        assert!(err.to_string().contains("change_held_slot"));
        assert_eq!(world.held_slot(), 0);
        assert_eq!(world.call_count(ActionKind::ChangeHeldSlot), 1);

        world.recover(ActionKind::ChangeHeldSlot);
        world.change_held_slot(3).unwrap();
        assert_eq!(world.held_slot(), 3);
        assert!(world.change_held_slot(9).is_err());

        world.reset_counts();
        assert_eq!(world.total_calls(), 0);
    }

    #[test]
    fn helper_placement_with_support() {
        let mut world = SimWorld::new();
        let states = world
            .set_helper_block(ORIGIN, HelperKind::Anvil, Some("minecraft:glass"))
            .unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(world.last_support(), Some("minecraft:glass"));
        assert_eq!(
            world.block_at(ORIGIN + Facing::Down.offset()).map(|(n, _)| n),
            Some("minecraft:glass")
        );
        assert_eq!(world.block_at(ORIGIN).map(|(n, _)| n), Some("minecraft:anvil"));
    }
}
