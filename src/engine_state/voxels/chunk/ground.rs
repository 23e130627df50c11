//! # Ground Scan
//!
//! Finds the cells of a chunk that can anchor a decoration: the topmost block of each
//! column, provided the cell directly above it is empty and still inside the chunk.
//! Columns whose top block touches the chunk ceiling are left to the chunk above.

use cgmath::Point3;

use crate::engine_state::voxels::{coords::ChunkSize, material::Material};

/// Scans every column of `materials` and returns its ground cell, if any.
///
/// Positions are returned in column order (X fastest, then Z).
pub fn find_ground_positions(materials: &[Material], size: ChunkSize) -> Vec<Point3<i32>> {
    let mut ground = Vec::new();

    for z in 0..size.z as i32 {
        for x in 0..size.x as i32 {
            if let Some(position) = column_ground(materials, size, x, z) {
                ground.push(position);
            }
        }
    }

    ground
}

fn column_ground(materials: &[Material], size: ChunkSize, x: i32, z: i32) -> Option<Point3<i32>> {
    let top = size.y as i32 - 1;
    let material_at = |y: i32| {
        size.index(Point3::new(x, y, z))
            .and_then(|index| materials.get(index).copied())
            .unwrap_or_default()
    };

    let surface_y = (0..=top).rev().find(|&y| material_at(y).is_block())?;
    if surface_y == top || !material_at(surface_y + 1).is_empty() {
        return None;
    }
    Some(Point3::new(x, surface_y, z))
}
