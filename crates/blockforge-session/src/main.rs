mod config;

use blockforge_block::addressing::CENTER_SLOT;
use blockforge_block::{BlockModel, BlockStates};
use blockforge_console::{Console, SimWorld, StructureCache};
use config::SessionConfig;
use tracing::{debug, error, info};

const DEFAULT_CONFIG: &str = "session.toml";

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = match SessionConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "BlockForge session v{} (dry run) centered at {} in dimension {}",
        env!("CARGO_PKG_VERSION"),
        config.session.center,
        config.session.dimension
    );

    if let Err(e) = run(&config) {
        error!("Session failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: &SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut console = Console::new(SimWorld::new(), config.console.clone());
    console.register_observer(|requester, mutation| {
        debug!("{requester} changed {mutation:?}");
    });
    console.reinitialize(config.session.dimension, config.session.center)?;

    let mut cache = StructureCache::new();
    for entry in &config.warmup {
        let states = BlockStates::parse(&entry.states)?;
        let restored = cache.load(
            &mut console,
            &entry.name,
            &states,
            &entry.custom_name,
            entry.facing,
        )?;
        if restored {
            info!("Restored {} {} from cache", entry.name, entry.states);
            continue;
        }
        console.place_in_slot(
            "warmup",
            CENTER_SLOT,
            BlockModel::container(&entry.name, states),
        )?;
        cache.store(&mut console, &entry.custom_name, entry.facing)?;
    }

    let anvil = console.find_or_create_anvil()?;
    let loom = console.find_or_create_loom()?;
    for index in [anvil, loom] {
        if !console.open_helper_slot(index)? {
            error!("Helper in slot {index} did not open");
        }
    }

    for (index, model) in console.slots().iter().enumerate() {
        info!(
            "Slot {index} at {}: {} {}",
            console.slot_pos(index),
            model.block_name(),
            model.block_states_string()
        );
    }

    let stats = cache.stats();
    info!(
        "Structure cache: {} entries, {} hits, {} misses, {} stores",
        cache.len(),
        stats.hits,
        stats.misses,
        stats.stores
    );
    let world = console.actions();
    info!(
        "World: {} commands sent, {} teleports, {} blocks present",
        world.command_log().len(),
        world.teleport_count(),
        world.block_count()
    );

    cache.clear(&mut console);
    Ok(())
}
