//! # Tree Placement
//!
//! Grows a handful of trees on random ground cells of a chunk. Each tree is a vertical
//! trunk with a randomly thinned spherical canopy around its top. A tree claims the
//! 3x3 square of ground around its trunk, and a candidate whose square touches an
//! already claimed cell is skipped. Attempts are capped, so a crowded chunk simply
//! receives fewer trees.

use cgmath::Point3;
use fastrand::Rng;

use crate::{
    config::TreeConfig,
    engine_state::voxels::{coords::grid_to_world, world::VoxelAccess},
};

use super::{occupancy::OccupiedGroundSet, ChunkGround};

/// Places trees and returns the ground cell of every trunk.
pub fn place_trees<W: VoxelAccess>(
    world: &mut W,
    rng: &mut Rng,
    config: &TreeConfig,
    ground: &ChunkGround<'_>,
    occupied: &mut OccupiedGroundSet,
) -> Vec<Point3<i32>> {
    let mut anchors = Vec::new();
    if ground.positions.is_empty() {
        return anchors;
    }

    let target = rng.usize(config.min_count..=config.max_count);
    let mut attempts = 0;

    while anchors.len() < target && attempts < config.max_attempts {
        attempts += 1;

        let anchor = ground.positions[rng.usize(..ground.positions.len())];
        if !occupied.is_footprint_clear(anchor) {
            continue;
        }

        grow_tree(world, rng, config, ground, anchor);
        occupied.claim_footprint(anchor);
        anchors.push(anchor);
    }

    if anchors.len() < target {
        log::trace!(
            "Chunk {:?}: placed {} of {} tree(s) in {} attempt(s)",
            ground.coordinate,
            anchors.len(),
            target,
            attempts
        );
    }

    anchors
}

fn grow_tree<W: VoxelAccess>(
    world: &mut W,
    rng: &mut Rng,
    config: &TreeConfig,
    ground: &ChunkGround<'_>,
    anchor: Point3<i32>,
) {
    let height = rng.i32(config.min_trunk_height..config.max_trunk_height);
    let mut place = |offset_x: i32, offset_y: i32, offset_z: i32, material| {
        let grid = Point3::new(anchor.x + offset_x, anchor.y + offset_y, anchor.z + offset_z);
        world.set_voxel(grid_to_world(grid, ground.coordinate, ground.size), material);
    };

    for y in 1..=height {
        place(0, y, 0, config.trunk_material);
    }

    let radius = config.leaf_radius;
    for x in -radius..=radius {
        for y in -1..=radius {
            for z in -radius..=radius {
                if x * x + y * y + z * z > radius * radius {
                    continue;
                }
                // trunk column below the crown
                if x == 0 && z == 0 && y <= 0 {
                    continue;
                }
                if rng.f32() < config.leaf_probability {
                    place(x, height + y, z, config.leaf_material);
                }
            }
        }
    }
}
