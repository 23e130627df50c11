//! # Chunk Generator
//!
//! Entry point of the parallel generation dispatcher. `enqueue_for_generation` splits a
//! chunk into batches of `batch_size` cells, publishes one `FillBatchTask` per batch on
//! the worker pool and returns a `PendingChunk` the host polls once per tick.
//!
//! The density field is shared by every task through an `Arc`; each batch writes into
//! its own vector, so workers only share the job's batch counter.

use std::sync::{mpsc::channel, Arc};

use cgmath::Point3;

use crate::{
    config::DispatchConfig,
    engine_state::task_management::TaskManager,
    error::GenerationError,
};

use super::{
    chunk::Chunk,
    coords::ChunkSize,
    field::{
        noise::{FractalNoise, NoiseSource},
        DensityField,
    },
    tasks::chunk_generation_task::{BatchJob, FillBatchTask, FillJob, PendingChunk},
};

/// Fills chunk voxel buffers on a worker pool.
pub struct ChunkGenerator<N: NoiseSource + 'static = FractalNoise> {
    task_manager: TaskManager,
    field: Arc<DensityField<N>>,
    chunk_size: ChunkSize,
    batch_size: usize,
    max_wait_ticks: u32,
}

impl<N: NoiseSource + 'static> ChunkGenerator<N> {
    /// Starts the worker pool described by `dispatch`.
    ///
    /// # Errors
    /// - `InvalidChunkSize` if `chunk_size` is out of range
    /// - `InvalidBatchSize` if `dispatch.batch_size` is zero
    pub fn new(
        field: DensityField<N>,
        chunk_size: ChunkSize,
        dispatch: &DispatchConfig,
    ) -> Result<Self, GenerationError> {
        chunk_size.validate()?;
        if dispatch.batch_size == 0 {
            return Err(GenerationError::InvalidBatchSize);
        }

        Ok(ChunkGenerator {
            task_manager: TaskManager::new(dispatch.worker_count),
            field: Arc::new(field),
            chunk_size,
            batch_size: dispatch.batch_size,
            max_wait_ticks: dispatch.max_wait_ticks,
        })
    }

    pub fn field(&self) -> &DensityField<N> {
        &self.field
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// Schedules the fill of the chunk at `coordinate`.
    pub fn enqueue_for_generation(
        &mut self,
        coordinate: Point3<i32>,
    ) -> PendingChunk<BatchJob<N>> {
        let job = Arc::new(FillJob::new(
            self.field.clone(),
            coordinate,
            self.chunk_size,
            self.batch_size,
        ));
        let (results_tx, results_rx) = channel();

        let mut inline = 0;
        for _ in 0..job.batch_count() {
            let task = FillBatchTask::new(job.clone(), results_tx.clone());
            if !self.task_manager.publish_task(Box::new(task)) {
                inline += 1;
            }
        }

        log::debug!(
            "Scheduled chunk {:?}: {} batch(es) of {} cell(s), {} run inline",
            coordinate,
            job.batch_count(),
            self.batch_size,
            inline
        );

        PendingChunk::new(
            coordinate,
            self.chunk_size,
            BatchJob::new(job, results_rx),
            self.max_wait_ticks,
        )
    }

    /// Schedules the chunk and joins it immediately.
    pub fn generate_blocking(&mut self, coordinate: Point3<i32>) -> Result<Chunk, GenerationError> {
        self.enqueue_for_generation(coordinate).wait()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::Receiver;

    use super::*;
    use crate::engine_state::{
        task_management::task::Task,
        voxels::{
            coords::grid_to_world,
            field::FieldParams,
            material::Material,
            tasks::chunk_generation_task::GenerationPoll,
        },
    };

    fn generator_with(
        params: FieldParams,
        size: ChunkSize,
        dispatch: DispatchConfig,
    ) -> ChunkGenerator {
        ChunkGenerator::new(DensityField::new(42, params), size, &dispatch).unwrap()
    }

    fn generator(size: ChunkSize, batch_size: usize) -> ChunkGenerator {
        let dispatch = DispatchConfig {
            worker_count: 3,
            batch_size,
            max_wait_ticks: 3,
        };
        generator_with(FieldParams::default(), size, dispatch)
    }

    /// Occupies a worker until its sender is dropped.
    struct Gate(Receiver<()>);

    impl Task for Gate {
        fn process(self: Box<Self>) {
            let _ = self.0.recv();
        }
    }

    #[test]
    fn test_buffer_matches_field_at_every_cell() {
        let size = ChunkSize::new(8, 48, 8);
        // batch size that does not divide the volume
        let mut generator = generator(size, 29);

        for coordinate in [Point3::new(0, 0, 0), Point3::new(-2, 0, 3)] {
            let chunk = generator.generate_blocking(coordinate).unwrap();
            assert_eq!(chunk.materials().len(), 8 * 48 * 8);

            for (index, &material) in chunk.materials().iter().enumerate() {
                let world = grid_to_world(size.position_of(index), coordinate, size);
                assert_eq!(material, generator.field().material_at(world), "cell {index}");
            }
        }
    }

    #[test]
    fn test_terrain_has_ground_and_sky() {
        let size = ChunkSize::new(16, 64, 16);
        let params = FieldParams {
            open_sky: true,
            ..FieldParams::default()
        };
        let mut generator = generator_with(params, size, DispatchConfig::default());
        let chunk = generator.generate_blocking(Point3::new(0, 0, 0)).unwrap();

        assert!(chunk.materials().contains(&Material::Grass));
        assert_eq!(chunk.get(Point3::new(0, 63, 0)), Some(Material::Air));
        assert!(!chunk.ground_positions().is_empty());
    }

    #[test]
    fn test_polling_completes_within_bound() {
        let size = ChunkSize::new(4, 8, 4);
        let mut generator = generator(size, 16);
        let mut pending = generator.enqueue_for_generation(Point3::new(1, 0, 1));

        let mut ticks = 0;
        let chunk = loop {
            ticks += 1;
            match pending.poll() {
                GenerationPoll::Ready(result) => break result.unwrap(),
                GenerationPoll::Pending(next) => pending = next,
            }
        };

        assert!(ticks <= 3);
        assert_eq!(chunk.coordinate(), Point3::new(1, 0, 1));
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let result = ChunkGenerator::new(
            DensityField::new(0, FieldParams::default()),
            ChunkSize::new(16, 0, 16),
            &DispatchConfig::default(),
        );
        assert!(matches!(result, Err(GenerationError::InvalidChunkSize { .. })));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let result = ChunkGenerator::new(
            DensityField::new(0, FieldParams::default()),
            ChunkSize::new(16, 16, 16),
            &DispatchConfig {
                batch_size: 0,
                ..DispatchConfig::default()
            },
        );
        assert!(matches!(result, Err(GenerationError::InvalidBatchSize)));
    }

    #[test]
    fn test_forced_join_does_not_wait_for_backlog() {
        let size = ChunkSize::new(8, 16, 8);
        let dispatch = DispatchConfig {
            worker_count: 1,
            batch_size: 64,
            max_wait_ticks: 3,
        };
        let mut generator = generator_with(FieldParams::default(), size, dispatch);

        // the only worker is stuck, and a backlog of other chunks waits behind it
        let (gate_tx, gate_rx) = channel();
        assert!(generator.task_manager.publish_task(Box::new(Gate(gate_rx))));
        let backlog: Vec<_> = (0..30)
            .map(|x| generator.enqueue_for_generation(Point3::new(x, 0, 0)))
            .collect();

        let coordinate = Point3::new(-1, 0, 0);
        let mut pending = generator.enqueue_for_generation(coordinate);
        let mut ticks = 0;
        let chunk = loop {
            ticks += 1;
            match pending.poll() {
                GenerationPoll::Ready(result) => break result.unwrap(),
                GenerationPoll::Pending(next) => pending = next,
            }
        };

        assert_eq!(ticks, 3);
        for (index, &material) in chunk.materials().iter().enumerate() {
            let world = grid_to_world(size.position_of(index), coordinate, size);
            assert_eq!(material, generator.field().material_at(world), "cell {index}");
        }

        // the backlog still completes once the worker is free
        drop(gate_tx);
        for pending in backlog {
            assert!(pending.wait().is_ok());
        }
    }
}
