//! # Spawn Collaborator
//!
//! Item types handed to the spawn subsystem, and the `Spawner` trait it implements.
//! Turning a stack into a live object, including any collision or placement checks,
//! happens on the other side of this trait.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// An item type that can be scattered over chunks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
}

impl ItemTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        ItemTemplate { name: name.into() }
    }
}

/// A number of items of one template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    pub item: ItemTemplate,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: ItemTemplate, count: u32) -> Self {
        ItemStack { item, count }
    }
}

/// Materializes decoration items in the world.
pub trait Spawner {
    /// Attempts to place `stack` at `world_position`.
    ///
    /// A zero `direction` lets the spawner pick one.
    ///
    /// # Returns
    /// `true` if the item now exists in the world.
    fn try_spawn(
        &mut self,
        direction: Vector3<f32>,
        world_position: Point3<f32>,
        stack: &ItemStack,
    ) -> bool;
}

/// Offset from a ground cell's corner to the middle of its top face.
pub const CORNER_TO_TOP_MID: Vector3<f32> = Vector3 {
    x: 0.5,
    y: 1.0,
    z: 0.5,
};

/// World position an item anchored on the ground cell `world_cell` is spawned at.
pub fn spawn_position(world_cell: Point3<i32>) -> Point3<f32> {
    Point3::new(
        world_cell.x as f32,
        world_cell.y as f32,
        world_cell.z as f32,
    ) + CORNER_TO_TOP_MID
}

/// Accepts every placement and logs it. Used by the standalone generator, which has
/// no entity system behind it.
#[derive(Debug, Default)]
pub struct LoggingSpawner {
    spawned: HashMap<String, u64>,
}

impl LoggingSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items placed so far, per template name.
    pub fn spawned(&self) -> &HashMap<String, u64> {
        &self.spawned
    }

    pub fn total(&self) -> u64 {
        self.spawned.values().sum()
    }
}

impl Spawner for LoggingSpawner {
    fn try_spawn(
        &mut self,
        _direction: Vector3<f32>,
        world_position: Point3<f32>,
        stack: &ItemStack,
    ) -> bool {
        log::trace!(
            "Spawned {} x {} at {:?}",
            stack.count,
            stack.item.name,
            world_position
        );
        *self.spawned.entry(stack.item.name.clone()).or_default() += u64::from(stack.count);
        true
    }
}
