//! # Engine State Module
//!
//! The host-facing coordinator of world generation.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world, the generator and the decoration queue
//! * `task_management` - Worker threads that fill chunk buffers
//! * `voxels` - Voxel data, the density field, chunks and the world store
//! * `decoration` - Frame-budgeted tree and item placement
//!
//! ## Architecture
//!
//! The host calls `process_tasks()` once per tick. Each call:
//!
//! 1. Polls every pending generation exactly once
//! 2. Inserts finished chunks into the world
//! 3. Queues them for decoration
//! 4. Runs one decoration budget
//!
//! Neither step blocks for long: a pending chunk is force-joined only after its wait
//! bound, and decoration handles a fixed number of chunks per call.

use cgmath::Point3;

use crate::{
    config::WorldGenConfig,
    core::MtResource,
    error::GenerationError,
};

use decoration::{spawn::Spawner, DecorationQueue, DecorationSender};
use voxels::{
    field::DensityField,
    generator::ChunkGenerator,
    tasks::chunk_generation_task::{GenerationPoll, PendingChunk},
    world::World,
};

pub mod decoration;
pub mod task_management;
pub mod voxels;

/// What one `process_tasks` call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Chunks whose generation finished and were stored.
    pub generated: usize,
    /// Chunks whose generation failed.
    pub failed: usize,
    /// Chunks decorated.
    pub itemized: usize,
}

/// The main state container of the world generator.
///
/// # Examples
///
/// ```rust,ignore
/// let mut engine_state = EngineState::new(&config, spawner)?;
/// engine_state.load_region(Point3::new(0, 0, 0), 2);
///
/// // Main loop
/// loop {
///     engine_state.process_tasks();
/// }
/// ```
pub struct EngineState<S: Spawner> {
    /// The voxel world containing all chunk data
    world: MtResource<World>,
    generator: ChunkGenerator,
    /// Chunks being filled by the workers
    pending: Vec<PendingChunk>,
    decoration: DecorationQueue<MtResource<World>, S>,
}

impl<S: Spawner> EngineState<S> {
    /// Creates the world, starts the worker pool and sets up decoration.
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    /// * `spawner` - Collaborator that materializes scattered items
    pub fn new(config: &WorldGenConfig, spawner: S) -> Result<Self, GenerationError> {
        let field = DensityField::new(config.seed, config.field.clone());
        let generator = ChunkGenerator::new(field, config.chunk_size, &config.dispatch)?;
        let world = MtResource::new(World::new(config.chunk_size));
        let decoration = DecorationQueue::new(
            world.clone(),
            spawner,
            config.decoration.clone(),
            config.seed,
        );

        log::info!(
            "World generator ready: seed {}, chunk size {}",
            config.seed,
            config.chunk_size
        );

        Ok(EngineState {
            world,
            generator,
            pending: Vec::new(),
            decoration,
        })
    }

    pub fn world(&self) -> &MtResource<World> {
        &self.world
    }

    pub fn spawner(&self) -> &S {
        self.decoration.spawner()
    }

    /// Producer handle for chunks generated outside this state.
    pub fn decoration_sender(&self) -> DecorationSender {
        self.decoration.sender()
    }

    /// Starts generating the chunk at `coordinate`.
    ///
    /// # Returns
    /// `false` if the chunk is already loaded or being generated.
    pub fn request_chunk(&mut self, coordinate: Point3<i32>) -> bool {
        if self.world.get().contains(coordinate)
            || self
                .pending
                .iter()
                .any(|pending| pending.coordinate() == coordinate)
        {
            return false;
        }

        let pending = self.generator.enqueue_for_generation(coordinate);
        self.pending.push(pending);
        true
    }

    /// Requests every chunk within `radius` chunks of `center` on each axis.
    ///
    /// # Returns
    /// The number of chunks newly requested.
    pub fn load_region(&mut self, center: Point3<i32>, radius: i32) -> usize {
        let mut requested = 0;

        for x in -radius..=radius {
            for y in -radius..=radius {
                for z in -radius..=radius {
                    let position = Point3::new(center.x + x, center.y + y, center.z + z);
                    if self.request_chunk(position) {
                        requested += 1;
                    }
                }
            }
        }

        log::debug!(
            "Region around {:?} (radius {}): {} chunk(s) requested",
            center,
            radius,
            requested
        );
        requested
    }

    /// Advances generation and decoration by one tick.
    ///
    /// This method should be called once per frame of the host loop.
    pub fn process_tasks(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for pending in std::mem::take(&mut self.pending) {
            match pending.poll() {
                GenerationPoll::Pending(pending) => still_pending.push(pending),
                GenerationPoll::Ready(Ok(chunk)) => {
                    let chunk = self.world.get_mut().insert_chunk(chunk);
                    // a rejected chunk is already queued or decorated
                    let _ = self.decoration.enqueue(&chunk);
                    report.generated += 1;
                }
                GenerationPoll::Ready(Err(err)) => {
                    log::error!("Chunk generation failed: {}", err);
                    report.failed += 1;
                }
            }
        }

        self.pending = still_pending;
        report.itemized = self.decoration.process();
        report
    }

    pub fn pending_generation_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_decoration_count(&self) -> usize {
        self.decoration.pending_len()
    }

    /// `true` once every requested chunk is generated and decorated.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.decoration.pending_len() == 0
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;
    use crate::engine_state::voxels::coords::ChunkSize;
    use super::decoration::spawn::ItemStack;

    #[derive(Default)]
    struct CountingSpawner {
        spawned: usize,
    }

    impl Spawner for CountingSpawner {
        fn try_spawn(&mut self, _: Vector3<f32>, _: Point3<f32>, _: &ItemStack) -> bool {
            self.spawned += 1;
            true
        }
    }

    fn small_config() -> WorldGenConfig {
        let mut config = WorldGenConfig {
            seed: 11,
            chunk_size: ChunkSize::new(8, 64, 8),
            ..WorldGenConfig::default()
        };
        // a clean terrain profile so every surface chunk has ground to decorate
        config.field.open_sky = true;
        config.dispatch.worker_count = 2;
        config.decoration.max_itemize_chunks_in_frame = 4;
        config
    }

    fn run_until_idle(state: &mut EngineState<CountingSpawner>) -> TickReport {
        let mut total = TickReport::default();
        for _ in 0..1000 {
            if state.is_idle() {
                return total;
            }
            let tick = state.process_tasks();
            total.generated += tick.generated;
            total.failed += tick.failed;
            total.itemized += tick.itemized;
        }
        panic!("engine did not become idle");
    }

    #[test]
    fn test_region_is_generated_and_decorated() {
        let mut state = EngineState::new(&small_config(), CountingSpawner::default()).unwrap();
        assert_eq!(state.load_region(Point3::new(0, 0, 0), 1), 27);
        assert_eq!(state.pending_generation_count(), 27);
        let observed = &state;
        assert!(!observed.is_idle());
        assert_eq!(observed.pending_decoration_count(), 0);

        let total = run_until_idle(&mut state);
        assert_eq!(total.generated, 27);
        assert_eq!(total.failed, 0);
        assert_eq!(total.itemized, 27);

        let world = state.world().get();
        assert_eq!(world.len(), 27);
        for x in -1..=1 {
            for z in -1..=1 {
                let chunk = world.get_chunk_at(Point3::new(x, 0, z)).unwrap();
                assert!(chunk.get().is_itemized());
            }
        }
        drop(world);
        assert!(state.spawner().spawned >= 9 * 3);
    }

    #[test]
    fn test_each_tick_polls_and_decorates_within_budget() {
        let mut state = EngineState::new(&small_config(), CountingSpawner::default()).unwrap();
        state.load_region(Point3::new(0, 0, 0), 1);

        // every pending chunk is ready after at most max_wait_ticks polls
        let mut generated = 0;
        for _ in 0..3 {
            let tick = state.process_tasks();
            assert!(tick.itemized <= 4);
            generated += tick.generated;
        }
        assert_eq!(generated, 27);
        assert_eq!(state.pending_generation_count(), 0);
    }

    #[test]
    fn test_duplicate_requests_are_ignored() {
        let mut state = EngineState::new(&small_config(), CountingSpawner::default()).unwrap();
        assert!(state.request_chunk(Point3::new(0, 0, 0)));
        assert!(!state.request_chunk(Point3::new(0, 0, 0)));

        run_until_idle(&mut state);
        assert!(!state.request_chunk(Point3::new(0, 0, 0)));
        assert_eq!(state.load_region(Point3::new(0, 0, 0), 0), 0);
    }
}
