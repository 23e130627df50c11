//! # Coordinate Module
//!
//! Conversions between the three coordinate spaces used by the generator:
//!
//! * **Chunk space** - integer position of a chunk (`Point3<i32>`), one unit per chunk
//! * **Grid space** - cell position local to a chunk, `0..size` on each axis
//! * **World space** - absolute cell position, `chunk * size + grid`
//!
//! Buffers are laid out row-major with X varying fastest, then Y, then Z.

use std::fmt;

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Largest extent accepted on any chunk axis.
pub const MAX_CHUNK_EXTENT: u32 = 256;

/// Dimensions of a chunk in cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize::new(16, 64, 16)
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

impl ChunkSize {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        ChunkSize { x, y, z }
    }

    /// Checks that every axis is within `1..=MAX_CHUNK_EXTENT`.
    ///
    /// A malformed size is a fatal precondition violation for chunk construction.
    pub fn validate(&self) -> Result<(), GenerationError> {
        for (axis, extent) in [("x", self.x), ("y", self.y), ("z", self.z)] {
            if extent == 0 || extent > MAX_CHUNK_EXTENT {
                return Err(GenerationError::InvalidChunkSize {
                    size: *self,
                    reason: format!("{axis} extent must be within 1..={MAX_CHUNK_EXTENT}"),
                });
            }
        }
        Ok(())
    }

    /// Total number of cells in a chunk of this size.
    #[inline]
    pub fn volume(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Whether a grid position lies inside the chunk.
    #[inline]
    pub fn contains(&self, grid: Point3<i32>) -> bool {
        grid.x >= 0
            && grid.y >= 0
            && grid.z >= 0
            && (grid.x as u32) < self.x
            && (grid.y as u32) < self.y
            && (grid.z as u32) < self.z
    }

    /// Flat buffer index of a grid position, `None` when out of bounds.
    #[inline]
    pub fn index(&self, grid: Point3<i32>) -> Option<usize> {
        if !self.contains(grid) {
            return None;
        }
        let (x, y, z) = (grid.x as usize, grid.y as usize, grid.z as usize);
        Some(x + self.x as usize * (y + self.y as usize * z))
    }

    /// Grid position of a flat buffer index. The index must be below `volume()`.
    #[inline]
    pub fn position_of(&self, index: usize) -> Point3<i32> {
        let sx = self.x as usize;
        let sy = self.y as usize;
        Point3::new(
            (index % sx) as i32,
            ((index / sx) % sy) as i32,
            (index / (sx * sy)) as i32,
        )
    }

    fn as_vector(&self) -> Vector3<i32> {
        Vector3::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

/// World position of a chunk's first cell.
#[inline]
pub fn chunk_origin(chunk: Point3<i32>, size: ChunkSize) -> Point3<i32> {
    let s = size.as_vector();
    Point3::new(chunk.x * s.x, chunk.y * s.y, chunk.z * s.z)
}

/// Converts a chunk-local grid position into a world position.
#[inline]
pub fn grid_to_world(grid: Point3<i32>, chunk: Point3<i32>, size: ChunkSize) -> Point3<i32> {
    let origin = chunk_origin(chunk, size);
    Point3::new(origin.x + grid.x, origin.y + grid.y, origin.z + grid.z)
}

/// Chunk that owns a world position.
#[inline]
pub fn world_to_chunk(world: Point3<i32>, size: ChunkSize) -> Point3<i32> {
    let s = size.as_vector();
    Point3::new(
        world.x.div_euclid(s.x),
        world.y.div_euclid(s.y),
        world.z.div_euclid(s.z),
    )
}

/// Grid position of a world position inside its owning chunk.
#[inline]
pub fn world_to_local(world: Point3<i32>, size: ChunkSize) -> Point3<i32> {
    let s = size.as_vector();
    Point3::new(
        world.x.rem_euclid(s.x),
        world.y.rem_euclid(s.y),
        world.z.rem_euclid(s.z),
    )
}
