//! The console: a nine-slot work area with a locally tracked block model.
//!
//! The console never asks the world what is at a position. Every model
//! change follows a successfully acknowledged action, so the model always
//! reflects the last action that completed. A failed action leaves the model
//! untouched.
//!
//! Single mutator: all mutating operations take `&mut self`, and callers
//! serialize access to the one live session.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use blockforge_block::addressing::{self, CENTER_SLOT, NEIGHBOR_COUNT, SLOT_COUNT};
use blockforge_block::model::{AIR, ANVIL, LOOM};
use blockforge_block::{BlockModel, BlockOffset, BlockPos, BlockStates, Facing};
use blockforge_command::Command;

use crate::actions::{run_command, GameActions, HelperKind};
use crate::error::ConsoleError;
use crate::observer::{Mutation, Observer, ObserverId, Observers};
use crate::settings::ConsoleSettings;

/// Main inventory size (hotbar included).
pub const INVENTORY_SIZE: usize = 36;
/// Number of hotbar slots.
pub const HOTBAR_SIZE: u8 = 9;
/// Requester identity used for mutations the console makes on its own behalf.
pub const CONSOLE_REQUESTER: &str = "console";

/// A located slot returned by the `find_*` family. Claim it with
/// [`Console::use_helper_block`] or one of the placement methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHandle {
    pub index: usize,
    pub offset: BlockOffset,
    pub pos: BlockPos,
}

pub struct Console<A: GameActions> {
    actions: A,
    settings: ConsoleSettings,
    initialized: bool,
    dimension: i32,
    center: BlockPos,
    position: BlockPos,
    hotbar_slot: u8,
    inventory: [bool; INVENTORY_SIZE],
    slots: [BlockModel; SLOT_COUNT],
    neighbors: [[BlockModel; NEIGHBOR_COUNT]; SLOT_COUNT],
    observers: Observers,
}

impl<A: GameActions> Console<A> {
    /// Create an uninitialized console. Call [`reinitialize`](Self::reinitialize)
    /// before anything else.
    pub fn new(actions: A, settings: ConsoleSettings) -> Self {
        Self {
            actions,
            settings,
            initialized: false,
            dimension: 0,
            center: BlockPos::default(),
            position: BlockPos::default(),
            hotbar_slot: 0,
            inventory: [false; INVENTORY_SIZE],
            slots: std::array::from_fn(|_| BlockModel::unknown()),
            neighbors: std::array::from_fn(|_| std::array::from_fn(|_| BlockModel::unknown())),
            observers: Observers::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn actions(&self) -> &A {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut A {
        &mut self.actions
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    pub fn center(&self) -> BlockPos {
        self.center
    }

    /// Last known agent position. May lag reality after collisions.
    pub fn position(&self) -> BlockPos {
        self.position
    }

    pub fn hotbar_slot(&self) -> u8 {
        self.hotbar_slot
    }

    pub fn inventory(&self) -> &[bool; INVENTORY_SIZE] {
        &self.inventory
    }

    pub fn slot(&self, index: usize) -> Option<&BlockModel> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[BlockModel; SLOT_COUNT] {
        &self.slots
    }

    pub fn neighbor(&self, index: usize, facing: Facing) -> Option<&BlockModel> {
        self.neighbors.get(index).map(|n| &n[facing.index()])
    }

    /// Absolute position of a slot.
    pub fn slot_pos(&self, index: usize) -> BlockPos {
        self.center + addressing::slot_offset(index)
    }

    fn ensure_ready(&self) -> Result<(), ConsoleError> {
        if self.initialized {
            Ok(())
        } else {
            Err(ConsoleError::Uninitialized)
        }
    }

    fn check_slot(index: usize) -> Result<(), ConsoleError> {
        if index < SLOT_COUNT {
            Ok(())
        } else {
            Err(ConsoleError::InvalidSlot(index))
        }
    }

    fn handle(&self, index: usize) -> SlotHandle {
        SlotHandle {
            index,
            offset: addressing::slot_offset(index),
            pos: self.slot_pos(index),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Discard all modeled state and rebuild the work area at `center`.
    ///
    /// Forces the configured game mode, teleports to the center, clears the
    /// working volume, lays the floor, empties the inventory and selects
    /// hotbar slot 0. On failure the console stays unusable until a later
    /// call succeeds.
    pub fn reinitialize(&mut self, dimension: i32, center: BlockPos) -> Result<(), ConsoleError> {
        self.initialized = false;
        self.dimension = dimension;
        self.center = center;
        self.forget_model();

        let radius = self.settings.origin_exclusion_radius;
        if center.x.unsigned_abs() < radius && center.z.unsigned_abs() < radius {
            return Err(ConsoleError::UnsafeCenter { center, radius });
        }

        info!("Initializing console in dimension {dimension} at {center}");
        let timeout = self.settings.command_timeout();
        let mode = self.settings.game_mode();
        run_command(&mut self.actions, &Command::GameMode(mode), timeout)?;
        self.teleport(center)?;

        let (min, max) = addressing::working_volume();
        let clear = Command::fill(
            center + BlockOffset::new(min.x, 0, min.z),
            center + max,
            AIR,
        );
        run_command(&mut self.actions, &clear, timeout)?;
        let floor = Command::fill(
            center + min,
            center + BlockOffset::new(max.x, min.y, max.z),
            &self.settings.floor_block,
        );
        run_command(&mut self.actions, &floor, timeout)?;
        run_command(&mut self.actions, &Command::ClearInventory, timeout)?;
        self.actions.change_held_slot(0)?;

        let floor_marker = BlockModel::marker(&self.settings.floor_block);
        for index in 0..SLOT_COUNT {
            self.slots[index] = BlockModel::Air;
            for facing in Facing::ALL {
                self.neighbors[index][facing.index()] = match facing {
                    Facing::Down => floor_marker.clone(),
                    _ => BlockModel::Air,
                };
            }
        }
        self.hotbar_slot = 0;
        self.inventory = [false; INVENTORY_SIZE];
        self.initialized = true;
        info!("Console ready at {center}");
        Ok(())
    }

    /// Reset every model to "unknown".
    fn forget_model(&mut self) {
        for index in 0..SLOT_COUNT {
            self.slots[index] = BlockModel::unknown();
            for neighbor in &mut self.neighbors[index] {
                *neighbor = BlockModel::unknown();
            }
        }
        self.inventory = [false; INVENTORY_SIZE];
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Teleport to `target` if it is farther than the reach threshold from
    /// the last known position. Failures are surfaced, not retried.
    pub fn ensure_reachable(&mut self, target: BlockPos) -> Result<(), ConsoleError> {
        self.ensure_ready()?;
        let distance_sq = self.position.distance_sq(target);
        if distance_sq <= self.settings.reach_distance_sq {
            return Ok(());
        }
        debug!(
            "Target {target} out of reach from {} (distance² {distance_sq}), teleporting",
            self.position
        );
        self.teleport(target)
    }

    fn teleport(&mut self, target: BlockPos) -> Result<(), ConsoleError> {
        let timeout = self.settings.teleport_timeout();
        run_command(&mut self.actions, &Command::Teleport { target }, timeout)?;
        self.position = target;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Slot discovery
    // -----------------------------------------------------------------------

    /// First slot whose model satisfies `predicate`, scanning in index order.
    pub fn find_slot(
        &self,
        predicate: impl Fn(&BlockModel) -> bool,
        include_center: bool,
    ) -> Option<SlotHandle> {
        let start = if include_center { CENTER_SLOT } else { CENTER_SLOT + 1 };
        (start..SLOT_COUNT)
            .find(|&i| predicate(&self.slots[i]))
            .map(|i| self.handle(i))
    }

    /// A slot that may be claimed for a new block: air first, then anything
    /// that is neither an anvil nor a loom.
    pub fn find_free_slot(&self, include_center: bool) -> Option<SlotHandle> {
        self.find_slot(BlockModel::is_air, include_center)
            .or_else(|| self.find_slot(is_not_anvil_or_loom, include_center))
    }

    /// Every slot that is neither an anvil nor a loom.
    ///
    /// # Panics
    ///
    /// Panics when no such slot exists: at most one anvil and one loom are
    /// ever created, so eight ring slots can never all be taken.
    pub fn find_all_free_slots(&self, include_center: bool) -> Vec<usize> {
        let start = if include_center { CENTER_SLOT } else { CENTER_SLOT + 1 };
        let free: Vec<usize> = (start..SLOT_COUNT)
            .filter(|&i| is_not_anvil_or_loom(&self.slots[i]))
            .collect();
        assert!(
            !free.is_empty(),
            "console invariant broken: every helper slot holds an anvil or loom"
        );
        free
    }

    // -----------------------------------------------------------------------
    // Helper blocks
    // -----------------------------------------------------------------------

    pub fn find_or_create_anvil(&mut self) -> Result<usize, ConsoleError> {
        self.find_or_create_helper(HelperKind::Anvil)
    }

    pub fn find_or_create_loom(&mut self) -> Result<usize, ConsoleError> {
        self.find_or_create_helper(HelperKind::Loom)
    }

    fn find_or_create_helper(&mut self, kind: HelperKind) -> Result<usize, ConsoleError> {
        self.ensure_ready()?;
        let existing = match kind {
            HelperKind::Anvil => self.find_slot(BlockModel::is_anvil, false),
            HelperKind::Loom => self.find_slot(BlockModel::is_loom, false),
        };
        if let Some(handle) = existing {
            return Ok(handle.index);
        }

        let Some(handle) = self.find_free_slot(false) else {
            panic!("console invariant broken: no free helper slot for {kind}");
        };
        let below = &self.neighbors[handle.index][Facing::Down.index()];
        let need_floor_block = !below.supports_helper();
        self.place_helper(CONSOLE_REQUESTER, handle.index, kind, need_floor_block)?;
        Ok(handle.index)
    }

    /// Place an anvil or loom into `index`, putting the configured support
    /// block underneath first when `need_floor_block` is set.
    pub fn place_helper(
        &mut self,
        requester: &str,
        index: usize,
        kind: HelperKind,
        need_floor_block: bool,
    ) -> Result<(), ConsoleError> {
        self.ensure_ready()?;
        Self::check_slot(index)?;
        let pos = self.slot_pos(index);
        self.ensure_reachable(pos)?;

        let support = need_floor_block.then(|| self.settings.support_block.clone());
        let states = self
            .actions
            .set_helper_block(pos, kind, support.as_deref())?;
        debug!("Placed {kind} in slot {index} at {pos}");

        if let Some(name) = support {
            self.set_neighbor(requester, index, Facing::Down, BlockModel::marker(&name));
        }
        let model = match kind {
            HelperKind::Anvil => BlockModel::Anvil { states },
            HelperKind::Loom => BlockModel::Loom,
        };
        self.set_slot(requester, index, model);
        Ok(())
    }

    /// Place a block described by `model` into a slot and record it.
    ///
    /// Anvils and looms go through [`place_helper`](Self::place_helper),
    /// `Air` through [`clear_slot`](Self::clear_slot). Floor markers and
    /// blocks with unknown states cannot be placed.
    pub fn place_in_slot(
        &mut self,
        requester: &str,
        index: usize,
        model: BlockModel,
    ) -> Result<(), ConsoleError> {
        self.ensure_ready()?;
        Self::check_slot(index)?;
        match model {
            BlockModel::Air => self.clear_slot(requester, index),
            BlockModel::Anvil { .. } => {
                let need = !self.neighbors[index][Facing::Down.index()].supports_helper();
                self.place_helper(requester, index, HelperKind::Anvil, need)
            }
            BlockModel::Loom => {
                let need = !self.neighbors[index][Facing::Down.index()].supports_helper();
                self.place_helper(requester, index, HelperKind::Loom, need)
            }
            BlockModel::NearBlockMarker { name } => Err(ConsoleError::NotPlaceable(name)),
            BlockModel::ComplexBlock {
                known_states: false,
                name,
                ..
            } => Err(ConsoleError::NotPlaceable(name)),
            model @ (BlockModel::Container(_) | BlockModel::ComplexBlock { .. }) => {
                let pos = self.slot_pos(index);
                self.ensure_reachable(pos)?;
                self.actions
                    .place_block(pos, model.block_name(), &model.block_states_string())?;
                debug!("Placed {} in slot {index} at {pos}", model.block_name());
                self.set_slot(requester, index, model);
                Ok(())
            }
        }
    }

    /// Replace a slot's block with air and record it.
    pub fn clear_slot(&mut self, requester: &str, index: usize) -> Result<(), ConsoleError> {
        self.ensure_ready()?;
        Self::check_slot(index)?;
        let pos = self.slot_pos(index);
        self.ensure_reachable(pos)?;
        self.actions
            .place_block(pos, AIR, &BlockStates::new().to_states_string())?;
        self.set_slot(requester, index, BlockModel::Air);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Opening
    // -----------------------------------------------------------------------

    /// Open the block in a slot.
    ///
    /// Containers get their obstructing neighbor cleared first when the model
    /// does not already show it as air. Slots holding anything other than a
    /// container, anvil or loom are rejected before any action is issued.
    pub fn open_helper_slot(&mut self, index: usize) -> Result<bool, ConsoleError> {
        self.ensure_ready()?;
        Self::check_slot(index)?;
        let (name, states, clear) = match &self.slots[index] {
            BlockModel::Container(c) => (c.name.clone(), c.states.clone(), c.clear_direction()),
            BlockModel::Anvil { states } => (ANVIL.to_string(), states.clone(), None),
            BlockModel::Loom => (LOOM.to_string(), BlockStates::new(), None),
            other => {
                return Err(ConsoleError::NotOpenable {
                    index,
                    block: other.block_name().to_string(),
                })
            }
        };

        let pos = self.slot_pos(index);
        if let Some(facing) = clear {
            if !self.neighbors[index][facing.index()].is_air() {
                let neighbor_pos = pos + facing.offset();
                self.ensure_reachable(neighbor_pos)?;
                self.actions
                    .place_block(neighbor_pos, AIR, &BlockStates::new().to_states_string())?;
                self.set_neighbor(CONSOLE_REQUESTER, index, facing, BlockModel::Air);
                debug!("Cleared {facing} neighbor of slot {index} at {neighbor_pos}");
            }
        }

        self.ensure_reachable(pos)?;
        let opened = self.actions.open_container(pos, &name, &states)?;
        if !opened {
            warn!("{name} in slot {index} at {pos} did not open");
        }
        Ok(opened)
    }

    /// [`open_helper_slot`](Self::open_helper_slot) addressed by offset from
    /// the center. Offsets that are not a slot address the center.
    pub fn open_helper_slot_by_offset(&mut self, offset: BlockOffset) -> Result<bool, ConsoleError> {
        self.open_helper_slot(addressing::slot_index(offset))
    }

    // -----------------------------------------------------------------------
    // Local model mutation
    // -----------------------------------------------------------------------

    pub fn register_observer(
        &mut self,
        observer: impl FnMut(&str, Mutation) + 'static,
    ) -> ObserverId {
        let boxed: Observer = Box::new(observer);
        self.observers.register(boxed)
    }

    pub fn unregister_observer(&mut self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    /// Record that an inventory slot became occupied or empty.
    pub fn use_inventory_slot(
        &mut self,
        requester: &str,
        slot: usize,
        occupied: bool,
    ) -> Result<(), ConsoleError> {
        if slot >= INVENTORY_SIZE {
            return Err(ConsoleError::InvalidInventorySlot(slot));
        }
        self.inventory[slot] = occupied;
        self.observers.notify(requester, Mutation::Inventory(slot));
        Ok(())
    }

    /// Record a new block model for a slot, for actions performed outside
    /// the console (e.g. a planner editing a helper container).
    pub fn use_helper_block(
        &mut self,
        requester: &str,
        index: usize,
        model: BlockModel,
    ) -> Result<(), ConsoleError> {
        Self::check_slot(index)?;
        self.set_slot(requester, index, model);
        Ok(())
    }

    fn set_slot(&mut self, requester: &str, index: usize, model: BlockModel) {
        self.slots[index] = model;
        self.observers.notify(requester, Mutation::Helper(index));
    }

    /// Record a neighbor change made outside the console.
    pub fn use_neighbor_block(
        &mut self,
        requester: &str,
        index: usize,
        facing: Facing,
        model: BlockModel,
    ) -> Result<(), ConsoleError> {
        Self::check_slot(index)?;
        self.set_neighbor(requester, index, facing, model);
        Ok(())
    }

    fn set_neighbor(&mut self, requester: &str, index: usize, facing: Facing, model: BlockModel) {
        self.neighbors[index][facing.index()] = model;
        self.observers.notify(requester, Mutation::Neighbor(index, facing));
    }

    /// Switch the held hotbar slot, skipping the action when already selected.
    pub fn select_hotbar_slot(&mut self, slot: u8) -> Result<(), ConsoleError> {
        if slot >= HOTBAR_SIZE {
            return Err(ConsoleError::InvalidHotbarSlot(slot));
        }
        if slot == self.hotbar_slot {
            return Ok(());
        }
        self.actions.change_held_slot(slot)?;
        self.hotbar_slot = slot;
        Ok(())
    }

    /// An inventory slot outside `excluding`, preferring ones modeled empty.
    ///
    /// When every candidate is occupied, returns the first one anyway; the
    /// caller accepts overwriting it.
    ///
    /// # Panics
    ///
    /// Panics if `excluding` covers the whole inventory. That is a
    /// configuration error in the caller, not a runtime condition.
    pub fn find_free_inventory_slot(&self, excluding: &HashSet<usize>) -> usize {
        let mut candidates = (0..INVENTORY_SIZE).filter(|i| !excluding.contains(i));
        let Some(first) = candidates.next() else {
            panic!("no inventory slot left outside the exclusion set {excluding:?}");
        };
        std::iter::once(first)
            .chain(candidates)
            .find(|&i| !self.inventory[i])
            .unwrap_or(first)
    }
}

/// Neither an anvil nor a loom.
pub fn is_not_anvil_or_loom(model: &BlockModel) -> bool {
    !model.is_anvil() && !model.is_loom()
}
