//! Structure-snapshot cache for pre-configured containers.
//!
//! Building a container with specific contents is slow. Once built at the
//! console center it is captured with a region backup, keyed by a hash of
//! its identity, and later restored into the center instead of rebuilt.

use std::collections::HashMap;

use bytes::{BufMut, BytesMut};
use tracing::{debug, info, warn};

use blockforge_block::addressing::CENTER_SLOT;
use blockforge_block::{canonical_name, BlockModel, BlockStates, ContainerBlock, Facing};

use crate::actions::{GameActions, SnapshotId};
use crate::console::Console;
use crate::error::ConsoleError;

/// Requester identity for center updates made by the cache.
pub const CACHE_REQUESTER: &str = "structure-cache";

/// FNV-1a 64-bit offset basis.
const FNV1_64_INIT: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV1_64_PRIME: u64 = 0x0100_0000_01b3;

/// Facing byte used when a container has no meaningful facing.
const NO_FACING: u8 = 0xFF;

/// Compute FNV-1a 64-bit hash of a byte slice.
pub fn fnv1a_64(data: &[u8]) -> u64 {
    let mut hash = FNV1_64_INIT;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV1_64_PRIME);
    }
    hash
}

/// Cache key for a container identity.
///
/// The block name is canonicalized and the states rendered canonically, so
/// spelling differences collapse to one key. Each text field is length
/// prefixed so field boundaries cannot shift between inputs.
pub fn compute_hash(
    name: &str,
    states: &BlockStates,
    custom_name: &str,
    facing: Option<Facing>,
) -> u64 {
    let mut buf = BytesMut::new();
    put_field(&mut buf, &canonical_name(name));
    put_field(&mut buf, &states.to_states_string());
    put_field(&mut buf, custom_name);
    buf.put_u8(facing.map_or(NO_FACING, |f| f.index() as u8));
    fnv1a_64(&buf)
}

fn put_field(buf: &mut BytesMut, s: &str) {
    buf.put_u32_le(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

/// A cached snapshot and the container it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureBaseContainer {
    pub snapshot: SnapshotId,
    pub open_info: ContainerBlock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
}

/// Hash-keyed map of container snapshots, bound to one console session.
///
/// Entries stay valid until [`clear`](Self::clear) or the session ends;
/// snapshots are not shared across sessions.
#[derive(Debug, Default)]
pub struct StructureCache {
    entries: HashMap<u64, StructureBaseContainer>,
    stats: CacheStats,
}

impl StructureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Whether any entry exists for `name` + `states`, with no custom name
    /// and no facing.
    pub fn check(&self, name: &str, states: &BlockStates) -> bool {
        self.entries
            .contains_key(&compute_hash(name, states, "", None))
    }

    /// Restore a cached container into the console center.
    ///
    /// Returns `Ok(false)` on a miss. A snapshot that fails to restore is
    /// logged and treated as a miss; the caller builds from scratch.
    pub fn load<A: GameActions>(
        &mut self,
        console: &mut Console<A>,
        name: &str,
        states: &BlockStates,
        custom_name: &str,
        facing: Option<Facing>,
    ) -> Result<bool, ConsoleError> {
        if !console.is_initialized() {
            return Err(ConsoleError::Uninitialized);
        }
        let key = compute_hash(name, states, custom_name, facing);
        let Some(entry) = self.entries.get(&key) else {
            self.stats.misses += 1;
            debug!("Structure cache miss for {name} {states} ({key:#018x})");
            return Ok(false);
        };

        let center = console.center();
        if let Err(e) = console.actions_mut().revert_snapshot(entry.snapshot, center) {
            warn!("Failed to restore {} for {name}: {e}", entry.snapshot);
            self.stats.misses += 1;
            return Ok(false);
        }
        let model = BlockModel::Container(entry.open_info.clone());
        console.use_helper_block(CACHE_REQUESTER, CENTER_SLOT, model)?;
        self.stats.hits += 1;
        debug!("Restored {name} from {} into the center", entry.snapshot);
        Ok(true)
    }

    /// Capture the container currently at the center.
    ///
    /// Storing an identity that is already cached does nothing.
    pub fn store<A: GameActions>(
        &mut self,
        console: &mut Console<A>,
        custom_name: &str,
        facing: Option<Facing>,
    ) -> Result<(), ConsoleError> {
        if !console.is_initialized() {
            return Err(ConsoleError::Uninitialized);
        }
        let open_info = match console.slot(CENTER_SLOT) {
            Some(BlockModel::Container(c)) => c.clone(),
            other => {
                return Err(ConsoleError::CenterNotContainer {
                    block: other.map_or("", BlockModel::block_name).to_string(),
                })
            }
        };

        let key = compute_hash(&open_info.name, &open_info.states, custom_name, facing);
        if self.entries.contains_key(&key) {
            return Ok(());
        }

        let center = console.center();
        let snapshot = console.actions_mut().backup_region(center, center)?;
        info!("Cached {} {} as {snapshot}", open_info.name, open_info.states);
        self.entries.insert(
            key,
            StructureBaseContainer {
                snapshot,
                open_info,
            },
        );
        self.stats.stores += 1;
        Ok(())
    }

    /// Drop every entry, deleting snapshots best-effort.
    pub fn clear<A: GameActions>(&mut self, console: &mut Console<A>) {
        for (_, entry) in self.entries.drain() {
            if let Err(e) = console.actions_mut().delete_snapshot(entry.snapshot) {
                warn!("Failed to delete {}: {e}", entry.snapshot);
            }
        }
    }
}
