//! # Error Types
//!
//! Error taxonomy for chunk generation, decoration and configuration.
//!
//! * `GenerationError` - precondition violations while building a chunk. These are fatal
//!   for the chunk in question and are always surfaced to the caller.
//! * `DecorationError` - lifecycle violations (double enqueue, double itemization).
//!   The offending call is rejected as a no-op.
//! * `ConfigError` - configuration could not be read, parsed or validated.

use cgmath::Point3;
use thiserror::Error;

use crate::engine_state::voxels::coords::ChunkSize;

/// Errors raised while generating or constructing a chunk.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid chunk size {size}: {reason}")]
    InvalidChunkSize { size: ChunkSize, reason: String },

    #[error("batch size must be at least one cell")]
    InvalidBatchSize,

    #[error("voxel buffer holds {actual} cells but the chunk volume is {expected}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("value {0} is not a valid material")]
    InvalidMaterial(u8),

    #[error("generation of chunk {coordinate:?} lost {missing} batch(es) to a dead worker")]
    WorkerLost {
        coordinate: Point3<i32>,
        missing: usize,
    },
}

/// Errors raised when a chunk is pushed through the decoration pipeline out of order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecorationError {
    #[error("chunk {0:?} is already queued for decoration")]
    AlreadyEnqueued(Point3<i32>),

    #[error("chunk {0:?} is currently being decorated")]
    AlreadyItemizing(Point3<i32>),

    #[error("chunk {0:?} has already been decorated")]
    AlreadyItemized(Point3<i32>),
}

/// Errors raised while loading a `WorldGenConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
