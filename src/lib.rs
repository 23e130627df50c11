#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World Generator
//!
//! Procedural generation of a chunked voxel world, built to run inside a real-time
//! host loop without stalling it.
//!
//! ## Key Modules
//!
//! * `config` - JSON configuration of every generation parameter
//! * `core` - Shared-ownership primitives used throughout the crate
//! * `engine_state` - Density field, parallel chunk fill, decoration and the
//!   `EngineState` coordinator that ties them to the host loop
//! * `error` - Error types
//!
//! ## Architecture
//!
//! * A pure density/material function maps every world cell to a `Material`
//! * Chunk buffers are filled in batches on a worker pool; the host polls each pending
//!   chunk once per tick and forces a join after a fixed number of ticks
//! * Generated chunks are decorated with trees and scattered items exactly once, a
//!   bounded number of chunks per tick
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voxel_worldgen::{EngineState, LoggingSpawner, WorldGenConfig};
//!
//! let config = WorldGenConfig::default();
//! let mut state = EngineState::new(&config, LoggingSpawner::new())?;
//! state.load_region(Point3::new(0, 0, 0), config.region_radius);
//! while !state.is_idle() {
//!     state.process_tasks();
//! }
//! ```

use cgmath::Point3;
use log::info;
use web_time::Instant;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::WorldGenConfig;
pub use engine_state::{
    decoration::spawn::{ItemStack, ItemTemplate, LoggingSpawner, Spawner},
    voxels::{chunk::Chunk, material::Material, world::World},
    EngineState, TickReport,
};
pub use error::{ConfigError, DecorationError, GenerationError};

/// Ticks the standalone generator runs before giving up on becoming idle.
const MAX_TICKS: usize = 100_000;

/// Generates and decorates a region around the origin, then logs a summary.
///
/// The first command line argument, if present, is the path of a JSON configuration.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => match WorldGenConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Could not load {}: {}", path, err);
                return;
            }
        },
        None => WorldGenConfig::default(),
    };

    let mut state = match EngineState::new(&config, LoggingSpawner::new()) {
        Ok(state) => state,
        Err(err) => {
            log::error!("Could not start the generator: {}", err);
            return;
        }
    };

    let started = Instant::now();
    let requested = state.load_region(Point3::new(0, 0, 0), config.region_radius);

    let mut totals = TickReport::default();
    let mut ticks = 0;
    while !state.is_idle() && ticks < MAX_TICKS {
        let tick = state.process_tasks();
        totals.generated += tick.generated;
        totals.failed += tick.failed;
        totals.itemized += tick.itemized;
        ticks += 1;
    }

    if !state.is_idle() {
        log::warn!("Stopped after {} ticks with work still pending", ticks);
    }

    info!(
        "Generated {} of {} chunk(s) ({} failed), decorated {}, in {} tick(s) and {:?}",
        totals.generated,
        requested,
        totals.failed,
        totals.itemized,
        ticks,
        started.elapsed()
    );
    for (item, count) in state.spawner().spawned() {
        info!("Spawned {} x {}", count, item);
    }
}
