//! # Scatter Placement
//!
//! Spawns a random number of items on free ground cells of a chunk. Positions are
//! drawn uniformly from the chunk's ground cells; occupied cells are skipped and the
//! spawner may reject the rest. A cell becomes occupied only when the spawner accepts
//! the item placed on it.
//!
//! Without an attempt cap the loop keeps drawing until the requested amount exists,
//! which never ends if fewer free cells remain than were requested. With a cap the
//! placement stops after `cap` draws and the report carries the shortfall.

use cgmath::{Vector3, Zero};
use fastrand::Rng;

use crate::{config::ScatterRule, engine_state::voxels::coords::grid_to_world};

use super::{
    occupancy::OccupiedGroundSet,
    spawn::{spawn_position, ItemStack, Spawner},
    ChunkGround,
};

/// Outcome of one scatter rule on one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScatterReport {
    pub item: String,
    pub requested: usize,
    pub spawned: usize,
    /// Ground cells drawn, including occupied and rejected ones.
    pub attempts: u64,
}

impl ScatterReport {
    pub fn is_complete(&self) -> bool {
        self.spawned >= self.requested
    }
}

/// Spawns the items of `rule` on the chunk described by `ground`.
pub fn scatter_items<S: Spawner>(
    spawner: &mut S,
    rng: &mut Rng,
    rule: &ScatterRule,
    attempt_cap: Option<u32>,
    ground: &ChunkGround<'_>,
    occupied: &mut OccupiedGroundSet,
) -> ScatterReport {
    let mut report = ScatterReport {
        item: rule.item.name.clone(),
        requested: rng.usize(rule.min_amount..=rule.max_amount),
        spawned: 0,
        attempts: 0,
    };

    if ground.positions.is_empty() {
        if report.requested > 0 {
            log::warn!(
                "Chunk {:?} has no ground, skipping {} {:?}",
                ground.coordinate,
                report.requested,
                rule.item.name
            );
        }
        return report;
    }

    while report.spawned < report.requested {
        if attempt_cap.is_some_and(|cap| report.attempts >= u64::from(cap)) {
            break;
        }
        report.attempts += 1;

        let cell = ground.positions[rng.usize(..ground.positions.len())];
        if occupied.contains(cell) {
            continue;
        }

        let stack = ItemStack::new(
            rule.item.clone(),
            rng.u32(rule.min_stack..=rule.max_stack),
        );
        let position = spawn_position(grid_to_world(cell, ground.coordinate, ground.size));

        if spawner.try_spawn(Vector3::zero(), position, &stack) {
            occupied.insert(cell);
            report.spawned += 1;
        }
    }

    if !report.is_complete() {
        log::warn!(
            "Chunk {:?}: spawned {} of {} {:?} after {} attempt(s)",
            ground.coordinate,
            report.spawned,
            report.requested,
            rule.item.name,
            report.attempts
        );
    }

    report
}
