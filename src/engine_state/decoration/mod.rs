//! # Chunk Decoration
//!
//! Populates generated chunks with trees and scattered items, exactly once per chunk,
//! under a fixed per-tick budget.
//!
//! ## Architecture
//!
//! - `DecorationQueue`: Single consumer owning the pending chunks and the collaborators
//! - `DecorationSender`: Cloneable producer handle, usable from any thread
//! - `trees` / `scatter`: The two placement passes
//! - `OccupiedGroundSet`: Ground cells claimed during one chunk's pass
//! - `Spawner`: External collaborator that materializes items
//!
//! ## Scheduling
//!
//! Producers push chunks through an mpsc channel. Each `process()` call moves whatever
//! arrived into the FIFO and decorates at most `max_itemize_chunks_in_frame` chunks,
//! leaving the rest for the next tick. Producers and the queue share a counter of chunks
//! accepted but not yet taken off the queue, so the backlog can be read without
//! draining the channel.
//!
//! ## Exactly Once
//!
//! A chunk's lifecycle state is checked and advanced under its lock before anything is
//! written. Enqueueing a chunk twice, or decorating one that is already itemized, is
//! rejected with a `DecorationError` and leaves the world untouched.
//!
//! ## Locking
//!
//! The chunk lock is released before trees are written: tree voxels go through the
//! world, which locks whichever chunk owns each cell, including this one.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
};

use cgmath::Point3;
use fastrand::Rng;

use crate::{
    config::DecorationConfig,
    core::MtResource,
    error::DecorationError,
};

use super::voxels::{chunk::Chunk, coords::ChunkSize, world::VoxelAccess};

pub mod occupancy;
pub mod scatter;
pub mod spawn;
pub mod trees;

use self::{occupancy::OccupiedGroundSet, scatter::ScatterReport, spawn::Spawner};

/// Ground cells of one chunk, in the chunk's grid space.
pub struct ChunkGround<'a> {
    pub coordinate: Point3<i32>,
    pub size: ChunkSize,
    pub positions: &'a [Point3<i32>],
}

/// What one chunk's decoration pass produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecorationReport {
    pub coordinate: Point3<i32>,
    /// Ground cell of every tree trunk.
    pub tree_anchors: Vec<Point3<i32>>,
    pub scatter: Vec<ScatterReport>,
}

impl DecorationReport {
    pub fn items_spawned(&self) -> usize {
        self.scatter.iter().map(|report| report.spawned).sum()
    }
}

/// Producer side of the decoration queue.
#[derive(Clone)]
pub struct DecorationSender {
    sender: Sender<MtResource<Chunk>>,
    queued: Arc<AtomicUsize>,
}

impl DecorationSender {
    /// Queues a generated chunk for decoration.
    ///
    /// # Errors
    /// The chunk was already queued or decorated. Nothing is queued.
    pub fn enqueue(&self, chunk: &MtResource<Chunk>) -> Result<(), DecorationError> {
        let coordinate = {
            let mut guard = chunk.get_mut();
            if let Err(err) = guard.mark_enqueued() {
                log::warn!("Rejected decoration request: {}", err);
                return Err(err);
            }
            guard.coordinate()
        };

        self.queued.fetch_add(1, Ordering::AcqRel);
        if self.sender.send(chunk.clone()).is_err() {
            self.queued.fetch_sub(1, Ordering::AcqRel);
            log::error!(
                "Decoration queue is gone, chunk {:?} will not be decorated",
                coordinate
            );
        }
        Ok(())
    }
}

/// Frame-budgeted decoration pipeline.
pub struct DecorationQueue<W: VoxelAccess, S: Spawner> {
    world: W,
    spawner: S,
    config: DecorationConfig,
    seed: u32,
    sender: DecorationSender,
    receiver: Receiver<MtResource<Chunk>>,
    pending: VecDeque<MtResource<Chunk>>,
}

impl<W: VoxelAccess, S: Spawner> DecorationQueue<W, S> {
    /// Creates an empty queue writing through `world` and spawning through `spawner`.
    ///
    /// `seed` is the world seed; each chunk's random stream is derived from it and the
    /// chunk coordinate, so results do not depend on processing order.
    pub fn new(world: W, spawner: S, config: DecorationConfig, seed: u32) -> Self {
        let (sender, receiver) = channel();
        DecorationQueue {
            world,
            spawner,
            config,
            seed,
            sender: DecorationSender {
                sender,
                queued: Arc::new(AtomicUsize::new(0)),
            },
            receiver,
            pending: VecDeque::new(),
        }
    }

    /// A producer handle for other threads.
    pub fn sender(&self) -> DecorationSender {
        self.sender.clone()
    }

    pub fn enqueue(&self, chunk: &MtResource<Chunk>) -> Result<(), DecorationError> {
        self.sender.enqueue(chunk)
    }

    /// Chunks waiting for decoration, including those still in flight from producers.
    pub fn pending_len(&self) -> usize {
        self.sender.queued.load(Ordering::Acquire)
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    pub fn spawner_mut(&mut self) -> &mut S {
        &mut self.spawner
    }

    /// Decorates up to `max_itemize_chunks_in_frame` queued chunks.
    ///
    /// # Returns
    /// The number of chunks itemized during this call.
    pub fn process(&mut self) -> usize {
        self.collect_enqueued();

        let mut itemized = 0;
        while itemized < self.config.max_itemize_chunks_in_frame {
            let Some(chunk) = self.pending.pop_front() else {
                break;
            };
            self.sender.queued.fetch_sub(1, Ordering::AcqRel);

            if let Ok(report) = self.decorate(&chunk) {
                log::debug!(
                    "Decorated chunk {:?}: {} tree(s), {} item(s)",
                    report.coordinate,
                    report.tree_anchors.len(),
                    report.items_spawned()
                );
                itemized += 1;
            }
        }

        if itemized > 0 {
            log::trace!(
                "Itemized {} chunk(s) this tick, {} pending",
                itemized,
                self.pending_len()
            );
        }

        itemized
    }

    /// Places trees and scatter items on one chunk and marks it itemized.
    ///
    /// # Errors
    /// The chunk is already being decorated or has been decorated. Nothing is written.
    pub fn decorate(
        &mut self,
        chunk: &MtResource<Chunk>,
    ) -> Result<DecorationReport, DecorationError> {
        let (coordinate, size, positions) = {
            let mut guard = chunk.get_mut();
            if let Err(err) = guard.begin_itemizing() {
                log::warn!("Rejected decoration: {}", err);
                return Err(err);
            }
            (
                guard.coordinate(),
                guard.size(),
                guard.ground_positions().to_vec(),
            )
        };

        let ground = ChunkGround {
            coordinate,
            size,
            positions: &positions,
        };
        let mut rng = chunk_rng(self.seed, coordinate);
        let mut occupied = OccupiedGroundSet::new();

        let tree_anchors = trees::place_trees(
            &mut self.world,
            &mut rng,
            &self.config.trees,
            &ground,
            &mut occupied,
        );

        let scatter = self
            .config
            .scatter
            .iter()
            .map(|rule| {
                scatter::scatter_items(
                    &mut self.spawner,
                    &mut rng,
                    rule,
                    self.config.scatter_attempt_cap,
                    &ground,
                    &mut occupied,
                )
            })
            .collect();

        chunk.get_mut().finish_itemizing();

        Ok(DecorationReport {
            coordinate,
            tree_anchors,
            scatter,
        })
    }

    fn collect_enqueued(&mut self) {
        self.pending.extend(self.receiver.try_iter());
    }
}

/// Random stream of one chunk's decoration pass.
fn chunk_rng(seed: u32, coordinate: Point3<i32>) -> Rng {
    let mut state = u64::from(seed);
    for component in [coordinate.x, coordinate.y, coordinate.z] {
        state = state
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(u64::from(component as u32));
    }
    Rng::with_seed(state)
}
