//! # Material Module
//!
//! This module defines the materials a voxel cell can hold.
//!
//! ## Ordering
//!
//! The discriminants are part of the storage format and follow a fixed layout:
//! 1. `Air` is `0`, so a zeroed buffer reads as empty space
//! 2. Every placeable block sits in the contiguous range `Stone..=Lava`
//! 3. `Object` is always the highest value and marks a cell claimed by a non-voxel object
//!
//! New block materials must be inserted before `Object`.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

/// The underlying integer type used to store a material in a voxel buffer.
pub type MaterialSize = u8;

/// Enumerates every material a voxel cell can hold.
#[repr(u8)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    FromPrimitive,
    Serialize,
    Deserialize,
    bytemuck::NoUninit,
)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Empty space. Also the value of an unassigned cell.
    #[default]
    Air = 0,
    Stone,
    Brick,
    /// Rare pocket material found in dense noise regions.
    Magic,
    Dirt,
    Grass,
    Sand,
    Clay,
    Coal,
    Iron,
    Gold,
    Diamond,
    Wood,
    Leaves,
    Water,
    Lava,
    /// Cell occupied by a non-voxel object. Never meshed, never mined.
    Object,
}

impl Material {
    /// First material of the placeable block range.
    pub const FIRST_BLOCK: Material = Material::Stone;
    /// Last material of the placeable block range.
    pub const LAST_BLOCK: Material = Material::Lava;

    /// Converts a stored value back into a `Material`.
    ///
    /// Returns `None` for values outside the enumerated range.
    pub fn from_u8(value: MaterialSize) -> Option<Self> {
        num::FromPrimitive::from_u8(value)
    }

    /// Whether this is the "no material" sentinel.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Material::Air
    }

    /// Whether this material is a placeable block.
    ///
    /// `Air` and `Object` are never blocks.
    #[inline]
    pub fn is_block(self) -> bool {
        (Self::FIRST_BLOCK..=Self::LAST_BLOCK).contains(&self)
    }

    /// Whether the cell is claimed by a non-voxel object.
    #[inline]
    pub fn is_object(self) -> bool {
        self == Material::Object
    }

    /// Resource tier of an ore material, `None` for everything else.
    ///
    /// Tier 1 is the most common ore, tier 4 the rarest.
    pub fn resource_tier(self) -> Option<u8> {
        match self {
            Material::Coal => Some(1),
            Material::Iron => Some(2),
            Material::Gold => Some(3),
            Material::Diamond => Some(4),
            _ => None,
        }
    }
}

impl From<Material> for MaterialSize {
    fn from(material: Material) -> Self {
        material as MaterialSize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_is_zero_and_default() {
        assert_eq!(Material::Air as u8, 0);
        assert_eq!(Material::default(), Material::Air);
        assert!(Material::Air.is_empty());
        assert!(!Material::Air.is_block());
    }

    #[test]
    fn test_object_is_highest_and_not_a_block() {
        let highest = (0..=u8::MAX).filter_map(Material::from_u8).max().unwrap();
        assert_eq!(highest, Material::Object);
        assert!(Material::Object.is_object());
        assert!(!Material::Object.is_block());
    }

    #[test]
    fn test_block_range_is_contiguous() {
        let first = Material::FIRST_BLOCK as u8;
        let last = Material::LAST_BLOCK as u8;
        for value in first..=last {
            let material = Material::from_u8(value).unwrap();
            assert!(material.is_block(), "{material:?} should be a block");
        }
        assert_eq!(Material::from_u8(last + 2), None);
    }

    #[test]
    fn test_resource_tiers() {
        assert_eq!(Material::Coal.resource_tier(), Some(1));
        assert_eq!(Material::Diamond.resource_tier(), Some(4));
        assert_eq!(Material::Stone.resource_tier(), None);
    }

    #[test]
    fn test_materials_cast_to_bytes() {
        let buffer = [Material::Air, Material::Grass, Material::Object];
        let bytes: &[u8] = bytemuck::cast_slice(&buffer);
        assert_eq!(bytes, &[0, 5, 16]);
    }
}
