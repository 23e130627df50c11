//! # Voxel Task System
//!
//! Worker tasks that fill chunk voxel buffers, and the bounded-wait handle the host
//! polls while they run.

pub mod chunk_generation_task;
