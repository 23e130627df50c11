//! # Voxel World Generation
//!
//! This module contains the voxel data model and everything needed to fill it.
//!
//! ## Architecture
//!
//! * **Material**: The 8-bit voxel type and its ordering invariant
//! * **Coords**: Chunk dimensions and conversions between grid, chunk and world space
//! * **Field**: The deterministic density/material function
//! * **Chunk**: A fixed-size buffer of materials plus its ground cells and lifecycle
//! * **Generator / Tasks**: Parallel chunk fill with a bounded-wait join
//! * **World**: Sparse store of generated chunks with world-space voxel access
//!
//! ## Data Flow
//!
//! 1. The host asks the `ChunkGenerator` for a chunk coordinate
//! 2. Worker tasks evaluate the field for every cell of the chunk
//! 3. The host polls the `PendingChunk` each tick until it yields a `Chunk`
//! 4. The chunk is stored in the `World` and handed to the decoration queue
//!
//! ## Thread Safety
//!
//! * The field is immutable and shared by all workers
//! * Each batch task owns its output until it is sent back
//! * Chunks in the world are wrapped in `MtResource` and locked per access

pub mod chunk;
pub mod coords;
pub mod field;
pub mod generator;
pub mod material;
pub mod tasks;
pub mod world;
