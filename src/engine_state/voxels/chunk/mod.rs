//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size cuboid of voxel cells stored
//! as a flat, row-major buffer of `Material`s, together with the ground cells that
//! decorations may anchor to and the chunk's decoration lifecycle.
//!
//! ## Lifecycle
//!
//! ```text
//! Generated -> Enqueued -> Itemizing -> Itemized
//! ```
//!
//! `Itemized` is terminal. A chunk can skip `Enqueued` when decorated directly, but it
//! can never move backwards, so decorations are never applied twice.

use cgmath::Point3;

use crate::error::{DecorationError, GenerationError};

use super::{coords::ChunkSize, material::Material};

pub mod ground;

/// Decoration lifecycle of a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Voxels are filled, no decoration has been requested.
    Generated,
    /// Waiting in the decoration queue.
    Enqueued,
    /// Trees and items are being placed.
    Itemizing,
    /// Decoration finished. Terminal.
    Itemized,
}

/// A generated chunk of the voxel world.
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not world coordinates).
    coordinate: Point3<i32>,
    size: ChunkSize,
    /// One material per cell, indexed by `ChunkSize::index`.
    materials: Vec<Material>,
    /// Grid positions eligible as decoration anchors.
    ground_positions: Vec<Point3<i32>>,
    state: ChunkState,
}

impl Chunk {
    /// Builds a chunk from a filled voxel buffer.
    ///
    /// # Errors
    /// * `InvalidChunkSize` if `size` is malformed
    /// * `BufferMismatch` if `materials` does not hold exactly `size.volume()` cells
    pub fn from_materials(
        coordinate: Point3<i32>,
        size: ChunkSize,
        materials: Vec<Material>,
    ) -> Result<Self, GenerationError> {
        size.validate()?;
        if materials.len() != size.volume() {
            return Err(GenerationError::BufferMismatch {
                expected: size.volume(),
                actual: materials.len(),
            });
        }

        let ground_positions = ground::find_ground_positions(&materials, size);

        Ok(Chunk {
            coordinate,
            size,
            materials,
            ground_positions,
            state: ChunkState::Generated,
        })
    }

    /// Builds a chunk from a raw byte buffer, one byte per cell.
    ///
    /// # Errors
    /// Everything `from_materials` rejects, plus `InvalidMaterial` for any byte that
    /// does not name a material.
    pub fn from_raw_bytes(
        coordinate: Point3<i32>,
        size: ChunkSize,
        bytes: &[u8],
    ) -> Result<Self, GenerationError> {
        let materials = bytes
            .iter()
            .map(|&byte| Material::from_u8(byte).ok_or(GenerationError::InvalidMaterial(byte)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_materials(coordinate, size, materials)
    }

    pub fn coordinate(&self) -> Point3<i32> {
        self.coordinate
    }

    pub fn size(&self) -> ChunkSize {
        self.size
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// The voxel buffer as bytes, for the persistence layer.
    pub fn raw_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.materials)
    }

    pub fn ground_positions(&self) -> &[Point3<i32>] {
        &self.ground_positions
    }

    /// Rescans the ground cells after the voxel buffer was edited.
    pub fn recompute_ground_positions(&mut self) {
        self.ground_positions = ground::find_ground_positions(&self.materials, self.size);
    }

    /// Material at a grid position, `None` when out of bounds.
    pub fn get(&self, grid: Point3<i32>) -> Option<Material> {
        self.size
            .index(grid)
            .map(|index| self.materials[index])
    }

    /// Writes a material at a grid position. Returns `false` when out of bounds.
    pub fn set(&mut self, grid: Point3<i32>, material: Material) -> bool {
        match self.size.index(grid) {
            Some(index) => {
                self.materials[index] = material;
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_itemized(&self) -> bool {
        self.state == ChunkState::Itemized
    }

    /// `Generated -> Enqueued`.
    pub fn mark_enqueued(&mut self) -> Result<(), DecorationError> {
        match self.state {
            ChunkState::Generated => {
                self.state = ChunkState::Enqueued;
                Ok(())
            }
            _ => Err(self.rejection()),
        }
    }

    /// `Generated | Enqueued -> Itemizing`.
    pub fn begin_itemizing(&mut self) -> Result<(), DecorationError> {
        match self.state {
            ChunkState::Generated | ChunkState::Enqueued => {
                self.state = ChunkState::Itemizing;
                Ok(())
            }
            _ => Err(self.rejection()),
        }
    }

    /// `Itemizing -> Itemized`. Any other state is left untouched.
    pub fn finish_itemizing(&mut self) {
        if self.state == ChunkState::Itemizing {
            self.state = ChunkState::Itemized;
        }
    }

    fn rejection(&self) -> DecorationError {
        match self.state {
            ChunkState::Itemizing => DecorationError::AlreadyItemizing(self.coordinate),
            ChunkState::Itemized => DecorationError::AlreadyItemized(self.coordinate),
            ChunkState::Generated | ChunkState::Enqueued => {
                DecorationError::AlreadyEnqueued(self.coordinate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_chunk() -> Chunk {
        let size = ChunkSize::new(4, 4, 4);
        let materials = (0..size.volume())
            .map(|index| {
                if size.position_of(index).y == 0 {
                    Material::Grass
                } else {
                    Material::Air
                }
            })
            .collect();
        Chunk::from_materials(Point3::new(0, 0, 0), size, materials).unwrap()
    }

    #[test]
    fn test_buffer_mismatch_is_rejected() {
        let size = ChunkSize::new(4, 4, 4);
        let err = Chunk::from_materials(Point3::new(0, 0, 0), size, vec![Material::Air; 63])
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::BufferMismatch {
                expected: 64,
                actual: 63
            }
        ));
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let size = ChunkSize::new(0, 4, 4);
        let err = Chunk::from_materials(Point3::new(0, 0, 0), size, Vec::new()).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidChunkSize { .. }));
    }

    #[test]
    fn test_raw_bytes_round_trip_and_validation() {
        let chunk = flat_chunk();
        let bytes = chunk.raw_bytes().to_vec();
        let restored = Chunk::from_raw_bytes(chunk.coordinate(), chunk.size(), &bytes).unwrap();
        assert_eq!(restored.materials(), chunk.materials());

        let mut corrupt = bytes;
        corrupt[3] = 200;
        let err = Chunk::from_raw_bytes(chunk.coordinate(), chunk.size(), &corrupt).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidMaterial(200)));
    }

    #[test]
    fn test_ground_positions_are_derived() {
        let chunk = flat_chunk();
        assert_eq!(chunk.ground_positions().len(), 16);
        assert!(chunk.ground_positions().iter().all(|p| p.y == 0));
    }

    #[test]
    fn test_get_and_set_respect_bounds() {
        let mut chunk = flat_chunk();
        assert!(chunk.set(Point3::new(1, 1, 1), Material::Wood));
        assert_eq!(chunk.get(Point3::new(1, 1, 1)), Some(Material::Wood));
        assert!(!chunk.set(Point3::new(4, 0, 0), Material::Wood));
        assert_eq!(chunk.get(Point3::new(0, -1, 0)), None);
    }

    #[test]
    fn test_lifecycle_never_goes_backwards() {
        let mut chunk = flat_chunk();
        assert_eq!(chunk.state(), ChunkState::Generated);
        chunk.mark_enqueued().unwrap();
        assert_eq!(
            chunk.mark_enqueued(),
            Err(DecorationError::AlreadyEnqueued(chunk.coordinate()))
        );
        chunk.begin_itemizing().unwrap();
        assert_eq!(
            chunk.begin_itemizing(),
            Err(DecorationError::AlreadyItemizing(chunk.coordinate()))
        );
        chunk.finish_itemizing();
        assert!(chunk.is_itemized());
        assert_eq!(
            chunk.mark_enqueued(),
            Err(DecorationError::AlreadyItemized(chunk.coordinate()))
        );
        assert_eq!(
            chunk.begin_itemizing(),
            Err(DecorationError::AlreadyItemized(chunk.coordinate()))
        );
    }
}
