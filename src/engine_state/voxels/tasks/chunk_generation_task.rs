//! # Chunk Generation Task
//!
//! This module splits the fill of one chunk's voxel buffer into fixed-size batches,
//! runs them on the worker pool, and hands the caller a `PendingChunk` that is polled
//! once per tick.
//!
//! ## Batch Claiming
//!
//! A chunk's batches live in one shared `FillJob`. Every `FillBatchTask` published for
//! the chunk claims the next unclaimed batch when a worker picks it up, so batch
//! indices are handed out in order no matter which queue a task waited in. A task that
//! finds nothing left to claim returns immediately.
//!
//! ## Bounded Wait
//!
//! The caller never blocks while workers are busy. Each `poll()` is one scheduling
//! tick: if every batch has reported back, the chunk is assembled. Once the configured
//! number of ticks has passed the pending chunk stops waiting and joins the job. The
//! join claims every batch no worker has started and fills it on the calling thread,
//! then waits only for batches already running. The stall is therefore bounded by the
//! chunk's own work, even when the worker queues hold a backlog of other chunks.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc::{Receiver, RecvError, Sender, TryRecvError},
    Arc,
};

use cgmath::Point3;
use web_time::Instant;

use crate::{
    engine_state::{
        task_management::task::Task,
        voxels::{
            chunk::Chunk,
            coords::{grid_to_world, ChunkSize},
            field::{
                noise::{FractalNoise, NoiseSource},
                DensityField,
            },
            material::Material,
        },
    },
    error::GenerationError,
};

/// Materials produced by one batch, starting at buffer index `start`.
pub struct FilledBatch {
    start: usize,
    materials: Vec<Material>,
}

/// The batches of one chunk fill, shared by its tasks and its completion handle.
pub struct FillJob<N: NoiseSource = FractalNoise> {
    field: Arc<DensityField<N>>,
    coordinate: Point3<i32>,
    size: ChunkSize,
    batch_size: usize,
    batch_count: usize,
    next_batch: AtomicUsize,
}

impl<N: NoiseSource> FillJob<N> {
    /// `batch_size` must be at least one.
    pub fn new(
        field: Arc<DensityField<N>>,
        coordinate: Point3<i32>,
        size: ChunkSize,
        batch_size: usize,
    ) -> Self {
        FillJob {
            field,
            coordinate,
            size,
            batch_size,
            batch_count: size.volume().div_ceil(batch_size),
            next_batch: AtomicUsize::new(0),
        }
    }

    pub fn coordinate(&self) -> Point3<i32> {
        self.coordinate
    }

    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// Takes the next batch nobody has started yet.
    pub fn claim(&self) -> Option<usize> {
        let batch = self.next_batch.fetch_add(1, Ordering::AcqRel);
        (batch < self.batch_count).then_some(batch)
    }

    /// Computes the materials of one batch.
    pub fn fill(&self, batch: usize) -> FilledBatch {
        let volume = self.size.volume();
        let start = batch * self.batch_size;
        let end = (start + self.batch_size).min(volume);

        let materials = (start..end)
            .map(|index| {
                let grid = self.size.position_of(index);
                self.field
                    .material_at(grid_to_world(grid, self.coordinate, self.size))
            })
            .collect();

        FilledBatch { start, materials }
    }
}

/// Fills whichever batch of its job is next when a worker runs it.
pub struct FillBatchTask<N: NoiseSource> {
    job: Arc<FillJob<N>>,
    results: Sender<FilledBatch>,
}

impl<N: NoiseSource> FillBatchTask<N> {
    pub fn new(job: Arc<FillJob<N>>, results: Sender<FilledBatch>) -> Self {
        FillBatchTask { job, results }
    }
}

impl<N: NoiseSource> Task for FillBatchTask<N> {
    fn process(self: Box<Self>) {
        // Nothing left when a forced join already took the remaining batches.
        let Some(batch) = self.job.claim() else {
            return;
        };

        // The receiver is gone only if the pending chunk was dropped.
        let _ = self.results.send(self.job.fill(batch));
    }
}

/// Completion side of an in-flight fill job.
pub trait CompletionHandle {
    /// Non-blocking completion check.
    fn is_completed(&mut self) -> bool;
    /// Finishes the job and returns the filled buffer, blocking only on work that is
    /// already running elsewhere.
    fn complete(self) -> Result<Vec<Material>, GenerationError>;
}

/// Collects `FilledBatch`es into the chunk's scratch buffer.
pub struct BatchJob<N: NoiseSource = FractalNoise> {
    job: Arc<FillJob<N>>,
    buffer: Vec<Material>,
    receiver: Receiver<FilledBatch>,
    remaining: usize,
}

impl<N: NoiseSource> BatchJob<N> {
    /// `receiver` must only be fed by the tasks of `job`.
    pub fn new(job: Arc<FillJob<N>>, receiver: Receiver<FilledBatch>) -> Self {
        BatchJob {
            buffer: vec![Material::Air; job.size.volume()],
            remaining: job.batch_count(),
            job,
            receiver,
        }
    }

    fn apply(&mut self, batch: FilledBatch) {
        let end = batch.start + batch.materials.len();
        self.buffer[batch.start..end].copy_from_slice(&batch.materials);
        self.remaining -= 1;
    }
}

impl<N: NoiseSource> CompletionHandle for BatchJob<N> {
    fn is_completed(&mut self) -> bool {
        while self.remaining > 0 {
            match self.receiver.try_recv() {
                Ok(batch) => self.apply(batch),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.remaining == 0
    }

    fn complete(mut self) -> Result<Vec<Material>, GenerationError> {
        let mut inline = 0;
        while let Some(batch) = self.job.claim() {
            let filled = self.job.fill(batch);
            self.apply(filled);
            inline += 1;
        }

        if inline > 0 {
            log::trace!(
                "Chunk {:?}: filled {} batch(es) on the joining thread",
                self.job.coordinate(),
                inline
            );
        }

        while self.remaining > 0 {
            match self.receiver.recv() {
                Ok(batch) => self.apply(batch),
                Err(RecvError) => {
                    return Err(GenerationError::WorkerLost {
                        coordinate: self.job.coordinate(),
                        missing: self.remaining,
                    })
                }
            }
        }
        Ok(self.buffer)
    }
}

/// Outcome of one `PendingChunk::poll`.
pub enum GenerationPoll<J: CompletionHandle> {
    /// The chunk is filled, or its construction failed.
    Ready(Result<Chunk, GenerationError>),
    /// Still waiting. Poll again on the next tick.
    Pending(PendingChunk<J>),
}

/// A chunk whose voxels are being filled by the worker pool.
pub struct PendingChunk<J: CompletionHandle = BatchJob> {
    coordinate: Point3<i32>,
    size: ChunkSize,
    job: J,
    ticks_waited: u32,
    max_wait_ticks: u32,
    started: Instant,
}

impl<J: CompletionHandle> PendingChunk<J> {
    /// `max_wait_ticks` is clamped to at least one tick.
    pub fn new(coordinate: Point3<i32>, size: ChunkSize, job: J, max_wait_ticks: u32) -> Self {
        PendingChunk {
            coordinate,
            size,
            job,
            ticks_waited: 0,
            max_wait_ticks: max_wait_ticks.max(1),
            started: Instant::now(),
        }
    }

    pub fn coordinate(&self) -> Point3<i32> {
        self.coordinate
    }

    pub fn ticks_waited(&self) -> u32 {
        self.ticks_waited
    }

    /// Advances the wait by one tick.
    pub fn poll(mut self) -> GenerationPoll<J> {
        self.ticks_waited += 1;

        if self.job.is_completed() {
            return GenerationPoll::Ready(self.finish());
        }

        if self.ticks_waited < self.max_wait_ticks {
            return GenerationPoll::Pending(self);
        }

        log::debug!(
            "Chunk {:?} not done after {} tick(s), forcing join",
            self.coordinate,
            self.ticks_waited
        );
        GenerationPoll::Ready(self.finish())
    }

    /// Joins the job immediately.
    pub fn wait(self) -> Result<Chunk, GenerationError> {
        self.finish()
    }

    fn finish(self) -> Result<Chunk, GenerationError> {
        let materials = self.job.complete()?;
        let chunk = Chunk::from_materials(self.coordinate, self.size, materials)?;

        log::trace!(
            "Chunk {:?} generated in {:?} over {} tick(s)",
            self.coordinate,
            self.started.elapsed(),
            self.ticks_waited
        );

        Ok(chunk)
    }
}
