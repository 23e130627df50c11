//! # Configuration
//!
//! `WorldGenConfig` gathers every tunable of the generator. It is read from JSON with
//! `serde_json`; missing fields fall back to their defaults, so an empty object is a
//! valid configuration.
//!
//! ```json
//! {
//!     "seed": 1337,
//!     "chunk_size": { "x": 16, "y": 64, "z": 16 },
//!     "dispatch": { "worker_count": 0, "batch_size": 32, "max_wait_ticks": 3 },
//!     "decoration": { "max_itemize_chunks_in_frame": 10 }
//! }
//! ```
//!
//! Every loaded configuration is validated before use.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    engine_state::{
        decoration::spawn::ItemTemplate,
        voxels::{coords::ChunkSize, field::FieldParams, material::Material},
    },
    error::ConfigError,
};

/// Worker pool and bounded-wait settings for chunk generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Worker threads. `0` uses the available parallelism.
    pub worker_count: usize,
    /// Cells evaluated per worker task.
    pub batch_size: usize,
    /// Ticks a pending chunk waits before its job is joined synchronously.
    pub max_wait_ticks: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            worker_count: 0,
            batch_size: 32,
            max_wait_ticks: 3,
        }
    }
}

/// Tree placement settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Inclusive range of trees requested per chunk.
    pub min_count: usize,
    pub max_count: usize,
    /// Placement attempts per chunk before giving up on the remaining trees.
    pub max_attempts: usize,
    /// Trunk height is drawn from `min_trunk_height..max_trunk_height`.
    pub min_trunk_height: i32,
    pub max_trunk_height: i32,
    pub leaf_radius: i32,
    /// Chance that an in-radius canopy cell receives a leaf.
    pub leaf_probability: f32,
    pub trunk_material: Material,
    pub leaf_material: Material,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            min_count: 1,
            max_count: 3,
            max_attempts: 20,
            min_trunk_height: 4,
            max_trunk_height: 7,
            leaf_radius: 2,
            leaf_probability: 0.7,
            trunk_material: Material::Wood,
            leaf_material: Material::Leaves,
        }
    }
}

/// One scattered item type and how many of it each chunk receives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterRule {
    pub item: ItemTemplate,
    /// Inclusive range of instances per chunk.
    pub min_amount: usize,
    pub max_amount: usize,
    /// Inclusive range of the stack size of each instance.
    pub min_stack: u32,
    pub max_stack: u32,
}

impl ScatterRule {
    pub fn new(item: ItemTemplate, min_amount: usize, max_amount: usize) -> Self {
        ScatterRule {
            item,
            min_amount,
            max_amount,
            min_stack: 1,
            max_stack: 1,
        }
    }
}

/// Decoration pipeline settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    /// Chunks decorated per `process()` call.
    pub max_itemize_chunks_in_frame: usize,
    pub trees: TreeConfig,
    pub scatter: Vec<ScatterRule>,
    /// Position draws allowed per scatter rule. `None` retries until the requested
    /// amount is placed, which never terminates if the spawner keeps rejecting.
    pub scatter_attempt_cap: Option<u32>,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        DecorationConfig {
            max_itemize_chunks_in_frame: 10,
            trees: TreeConfig::default(),
            scatter: vec![ScatterRule::new(ItemTemplate::new("Hobbit"), 3, 7)],
            scatter_attempt_cap: Some(4096),
        }
    }
}

/// Complete generator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    pub seed: u32,
    pub chunk_size: ChunkSize,
    /// Radius in chunks of the region loaded by the binary.
    pub region_radius: i32,
    pub field: FieldParams,
    pub dispatch: DispatchConfig,
    pub decoration: DecorationConfig,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        WorldGenConfig {
            seed: 0,
            chunk_size: ChunkSize::default(),
            region_radius: 2,
            field: FieldParams::default(),
            dispatch: DispatchConfig::default(),
            decoration: DecorationConfig::default(),
        }
    }
}

impl WorldGenConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldGenConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunk_size
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.region_radius < 0 {
            return Err(invalid("region_radius must not be negative"));
        }
        self.field.validate()?;

        if self.dispatch.batch_size == 0 {
            return Err(invalid("dispatch.batch_size must be at least 1"));
        }
        if self.dispatch.max_wait_ticks == 0 {
            return Err(invalid("dispatch.max_wait_ticks must be at least 1"));
        }

        let decoration = &self.decoration;
        if decoration.max_itemize_chunks_in_frame == 0 {
            return Err(invalid(
                "decoration.max_itemize_chunks_in_frame must be at least 1",
            ));
        }

        let trees = &decoration.trees;
        if trees.min_count > trees.max_count {
            return Err(invalid("decoration.trees.min_count exceeds max_count"));
        }
        if trees.min_trunk_height < 1 || trees.min_trunk_height >= trees.max_trunk_height {
            return Err(invalid(
                "decoration.trees trunk height range must be non-empty and start at 1 or more",
            ));
        }
        if trees.leaf_radius < 0 {
            return Err(invalid("decoration.trees.leaf_radius must not be negative"));
        }
        if !(0.0..=1.0).contains(&trees.leaf_probability) {
            return Err(invalid(
                "decoration.trees.leaf_probability must be within 0..=1",
            ));
        }
        if !trees.trunk_material.is_block() || !trees.leaf_material.is_block() {
            return Err(invalid("decoration.trees materials must be blocks"));
        }

        for rule in &decoration.scatter {
            if rule.min_amount > rule.max_amount {
                return Err(ConfigError::Invalid(format!(
                    "scatter rule for {:?}: min_amount exceeds max_amount",
                    rule.item.name
                )));
            }
            if rule.min_stack == 0 || rule.min_stack > rule.max_stack {
                return Err(ConfigError::Invalid(format!(
                    "scatter rule for {:?}: stack range must be non-empty and start at 1 or more",
                    rule.item.name
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
