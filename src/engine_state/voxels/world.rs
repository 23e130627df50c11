//! # World Module
//!
//! This module provides the `World` struct which stores every generated chunk and
//! exposes world-space voxel access on top of them.
//!
//! ## Architecture
//!
//! The world is a sparse map from chunk coordinates to shared chunks. Only chunks that
//! have been generated are present, so the world is unbounded in every direction.
//! World-space reads and writes are routed to the owning chunk; cells of chunks that are
//! not loaded read as `Air` and writes to them are dropped.
//!
//! ## Thread Safety
//!
//! Chunks are stored as `MtResource<Chunk>` so the decoration queue and the world can
//! both hold the same chunk. Voxel writes lock one chunk at a time.

use std::collections::HashMap;

use cgmath::Point3;

use crate::core::MtResource;

use super::{
    chunk::Chunk,
    coords::{world_to_chunk, world_to_local, ChunkSize},
    material::Material,
};

/// World-space voxel access used by the decoration pipeline.
pub trait VoxelAccess {
    /// Writes `material` at a world cell.
    fn set_voxel(&mut self, world: Point3<i32>, material: Material);
    /// Reads the material at a world cell.
    fn get_voxel(&self, world: Point3<i32>) -> Material;
}

/// A voxel world composed of equally sized chunks.
pub struct World {
    chunk_size: ChunkSize,
    chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
}

impl World {
    /// Creates a new, empty world whose chunks all have `chunk_size` cells.
    pub fn new(chunk_size: ChunkSize) -> Self {
        World {
            chunk_size,
            chunks: HashMap::new(),
        }
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Stores a chunk and returns the shared handle to it.
    ///
    /// If a chunk already exists at the same coordinate the existing one is kept and
    /// returned, since it may already carry decorations.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> MtResource<Chunk> {
        let position = chunk.coordinate();
        if let Some(existing) = self.chunks.get(&position) {
            log::warn!("Chunk {:?} generated twice, keeping the first", position);
            return existing.clone();
        }

        let chunk = MtResource::new(chunk);
        self.chunks.insert(position, chunk.clone());
        chunk
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    pub fn get_chunk_at(&self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    /// Writes a material at a world cell. Returns `false` if the chunk is not loaded.
    pub fn write_voxel(&self, world: Point3<i32>, material: Material) -> bool {
        let chunk_position = world_to_chunk(world, self.chunk_size);
        match self.chunks.get(&chunk_position) {
            Some(chunk) => chunk
                .get_mut()
                .set(world_to_local(world, self.chunk_size), material),
            None => {
                log::trace!(
                    "Dropping write of {:?} at {:?}: chunk {:?} not loaded",
                    material,
                    world,
                    chunk_position
                );
                false
            }
        }
    }

    /// Reads a world cell. Cells of chunks that are not loaded read as `Air`.
    pub fn read_voxel(&self, world: Point3<i32>) -> Material {
        self.chunks
            .get(&world_to_chunk(world, self.chunk_size))
            .and_then(|chunk| chunk.get().get(world_to_local(world, self.chunk_size)))
            .unwrap_or_default()
    }
}

impl VoxelAccess for World {
    fn set_voxel(&mut self, world: Point3<i32>, material: Material) {
        self.write_voxel(world, material);
    }

    fn get_voxel(&self, world: Point3<i32>) -> Material {
        self.read_voxel(world)
    }
}

impl VoxelAccess for MtResource<World> {
    fn set_voxel(&mut self, world: Point3<i32>, material: Material) {
        self.get().write_voxel(world, material);
    }

    fn get_voxel(&self, world: Point3<i32>) -> Material {
        self.get().read_voxel(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_chunk(position: Point3<i32>, size: ChunkSize) -> Chunk {
        Chunk::from_materials(position, size, vec![Material::Air; size.volume()]).unwrap()
    }

    #[test]
    fn test_writes_route_to_owning_chunk() {
        let size = ChunkSize::new(4, 4, 4);
        let mut world = World::new(size);
        world.insert_chunk(empty_chunk(Point3::new(-1, 0, 0), size));

        world.set_voxel(Point3::new(-1, 2, 3), Material::Wood);
        assert_eq!(world.get_voxel(Point3::new(-1, 2, 3)), Material::Wood);

        let chunk = world.get_chunk_at(Point3::new(-1, 0, 0)).unwrap();
        assert_eq!(chunk.get().get(Point3::new(3, 2, 3)), Some(Material::Wood));
    }

    #[test]
    fn test_unloaded_chunks_read_air_and_drop_writes() {
        let world = World::new(ChunkSize::new(4, 4, 4));
        assert!(!world.write_voxel(Point3::new(100, 0, 0), Material::Stone));
        assert_eq!(world.read_voxel(Point3::new(100, 0, 0)), Material::Air);
    }

    #[test]
    fn test_insert_keeps_existing_chunk() {
        let size = ChunkSize::new(2, 2, 2);
        let mut world = World::new(size);
        let first = world.insert_chunk(empty_chunk(Point3::new(0, 0, 0), size));
        let second = world.insert_chunk(empty_chunk(Point3::new(0, 0, 0), size));
        assert!(first.ptr_eq(&second));
        assert_eq!(world.len(), 1);
    }
}
