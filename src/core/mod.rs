//! # Core Module
//!
//! Shared-ownership primitives used across the generator.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//!
//! Chunks are handed between generation workers, the world store and the decoration
//! queue as `MtResource<Chunk>`, so every holder observes the same lifecycle state.
//!
//! ## Usage
//! ```rust
//! use voxel_worldgen::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
