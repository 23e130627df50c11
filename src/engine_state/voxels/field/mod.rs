//! # Density / Material Field
//!
//! A pure function from a world cell to the material it holds. The field is built
//! from three noise layers:
//!
//! 1. A 2D height layer producing `surface_height = base_height + amplitude * height`
//! 2. A 3D density layer separating rock, cave voids and magic pockets
//! 3. A 3D resource layer picking ores and decorative blocks inside rock
//!
//! ## Branch Order
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. Sky above the surface (when `open_sky` is set)
//! 2. Topsoil band directly below the surface
//! 3. Subsoil band below the topsoil
//! 4. Rock (`density < cave_threshold`): ore bands from rarest to most common, then
//!    brick, then the near-surface sand band, then stone
//! 5. Cave void (`density < magic_threshold`), returned explicitly as `Air`
//! 6. Magic pocket
//!
//! Ore bands overlap on purpose. A deep cell with very high resource noise satisfies
//! every band, and the rarest one is chosen because it is checked first. This bias is
//! part of the world format and must not be turned into exclusive probabilities.
//!
//! ## Thread Safety
//!
//! `DensityField` holds no mutable state and performs no allocation per sample, so a
//! single instance is shared by every generation worker through an `Arc`.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::material::Material;

pub mod noise;

use self::noise::{FractalNoise, NoiseLayer, NoiseSource};

/// One ore band of the rock branch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OreBand {
    /// Material placed when the band matches.
    pub material: Material,
    /// Depth factor the cell must exceed. `None` matches at any depth.
    pub min_depth_factor: Option<f64>,
    /// Resource noise the cell must exceed.
    pub min_noise: f64,
}

/// Tunable parameters of the density field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub base_height: f64,
    pub amplitude: f64,
    pub height_noise: NoiseLayer,
    pub density_noise: NoiseLayer,
    pub resource_noise: NoiseLayer,
    /// Thickness of the grass band below the surface.
    pub topsoil_depth: f64,
    /// Thickness of the dirt band below the topsoil.
    pub subsoil_depth: f64,
    /// Density below which a cell is rock.
    pub cave_threshold: f64,
    /// Density at or above which a cell is a magic pocket.
    pub magic_threshold: f64,
    /// Evaluated in order, first match wins.
    pub ore_bands: [OreBand; 4],
    /// Resource noise below which rock becomes brick.
    pub brick_below: f64,
    /// Distance below the surface where rock may turn into sand.
    pub sand_band_depth: f64,
    /// Resource noise above which rock in the sand band becomes sand.
    pub sand_above: f64,
    /// Return `Air` above the surface instead of falling through to the density branch.
    /// Off by default: cells above the surface are classified by density like any other.
    pub open_sky: bool,
}

impl Default for FieldParams {
    fn default() -> Self {
        FieldParams {
            base_height: 32.0,
            amplitude: 16.0,
            height_noise: NoiseLayer::new(0.01, 1),
            density_noise: NoiseLayer::new(0.03, 3),
            resource_noise: NoiseLayer::new(0.09, 3),
            topsoil_depth: 1.0,
            subsoil_depth: 3.0,
            cave_threshold: 0.65,
            magic_threshold: 0.9,
            ore_bands: [
                OreBand {
                    material: Material::Diamond,
                    min_depth_factor: Some(0.8),
                    min_noise: 0.95,
                },
                OreBand {
                    material: Material::Gold,
                    min_depth_factor: Some(0.6),
                    min_noise: 0.85,
                },
                OreBand {
                    material: Material::Iron,
                    min_depth_factor: Some(0.4),
                    min_noise: 0.75,
                },
                OreBand {
                    material: Material::Coal,
                    min_depth_factor: None,
                    min_noise: 0.7,
                },
            ],
            brick_below: 0.25,
            sand_band_depth: 10.0,
            sand_above: 0.6,
            open_sky: false,
        }
    }
}

impl FieldParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_height - self.amplitude <= 0.0 {
            return Err(ConfigError::Invalid(
                "field.base_height must exceed field.amplitude so the surface stays above y = 0"
                    .to_string(),
            ));
        }
        if !(self.cave_threshold < self.magic_threshold) {
            return Err(ConfigError::Invalid(
                "field.cave_threshold must be below field.magic_threshold".to_string(),
            ));
        }
        if self.topsoil_depth < 0.0 || self.subsoil_depth < 0.0 || self.sand_band_depth < 0.0 {
            return Err(ConfigError::Invalid(
                "field band depths must not be negative".to_string(),
            ));
        }
        for (name, layer) in [
            ("height_noise", self.height_noise),
            ("density_noise", self.density_noise),
            ("resource_noise", self.resource_noise),
        ] {
            if layer.octaves == 0 || !(layer.frequency > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "field.{name} needs at least one octave and a positive frequency"
                )));
            }
        }
        if let Some(band) = self.ore_bands.iter().find(|band| !band.material.is_block()) {
            return Err(ConfigError::Invalid(format!(
                "ore band material {:?} is not a block",
                band.material
            )));
        }
        Ok(())
    }

    /// Surface height for a normalized height noise sample.
    #[inline]
    pub fn surface_height(&self, height_noise: f64) -> f64 {
        self.base_height + self.amplitude * height_noise
    }

    /// Classifies one cell.
    ///
    /// `density` and `resource` are only evaluated by the branches that need them.
    pub fn classify(
        &self,
        y: f64,
        surface_height: f64,
        density: impl FnOnce() -> f64,
        resource: impl FnOnce() -> f64,
    ) -> Material {
        if self.open_sky && y > surface_height {
            return Material::Air;
        }

        let topsoil_bottom = surface_height - self.topsoil_depth;
        if y > topsoil_bottom && y <= surface_height {
            return Material::Grass;
        }
        if y > topsoil_bottom - self.subsoil_depth && y <= topsoil_bottom {
            return Material::Dirt;
        }

        let density = density();
        if density < self.cave_threshold {
            return self.classify_rock(y, surface_height, resource());
        }
        if density < self.magic_threshold {
            // Caves are assigned explicitly, not left to zero-initialized buffers.
            return Material::Air;
        }
        Material::Magic
    }

    fn classify_rock(&self, y: f64, surface_height: f64, resource: f64) -> Material {
        let depth_factor = (surface_height - y) / surface_height;

        for band in &self.ore_bands {
            let deep_enough = band
                .min_depth_factor
                .map_or(true, |min_depth| depth_factor > min_depth);
            if deep_enough && resource > band.min_noise {
                return band.material;
            }
        }

        if resource < self.brick_below {
            return Material::Brick;
        }
        if y > surface_height - self.sand_band_depth && resource > self.sand_above {
            return Material::Sand;
        }
        Material::Stone
    }
}

/// The world's density/material function.
pub struct DensityField<N: NoiseSource = FractalNoise> {
    params: FieldParams,
    noise: N,
}

impl DensityField<FractalNoise> {
    /// Builds the field with fractal simplex noise derived from `seed`.
    pub fn new(seed: u32, params: FieldParams) -> Self {
        let noise = FractalNoise::new(
            seed,
            params.height_noise,
            params.density_noise,
            params.resource_noise,
        );
        DensityField { params, noise }
    }
}

impl<N: NoiseSource> DensityField<N> {
    /// Builds the field on top of a custom noise source.
    pub fn with_noise(params: FieldParams, noise: N) -> Self {
        DensityField { params, noise }
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Terrain surface height of the column at `(x, z)`.
    pub fn surface_height_at(&self, x: i32, z: i32) -> f64 {
        self.params
            .surface_height(self.noise.height(x as f64, z as f64))
    }

    /// Material of the world cell at `world`.
    pub fn material_at(&self, world: Point3<i32>) -> Material {
        let (x, y, z) = (world.x as f64, world.y as f64, world.z as f64);
        let surface_height = self.params.surface_height(self.noise.height(x, z));

        self.params.classify(
            y,
            surface_height,
            || self.noise.density(x, y, z),
            || self.noise.resource(x, y, z),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Noise source returning fixed values everywhere.
    pub(crate) struct ConstantNoise {
        pub height: f64,
        pub density: f64,
        pub resource: f64,
    }

    impl NoiseSource for ConstantNoise {
        fn height(&self, _x: f64, _z: f64) -> f64 {
            self.height
        }

        fn density(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            self.density
        }

        fn resource(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            self.resource
        }
    }

    fn rock(y: f64, surface: f64, resource: f64) -> Material {
        FieldParams::default().classify(y, surface, || 0.1, || resource)
    }

    #[test]
    fn test_material_at_is_deterministic() {
        let a = DensityField::new(1234, FieldParams::default());
        let b = DensityField::new(1234, FieldParams::default());
        for x in -8..8 {
            for y in 0..64 {
                let p = Point3::new(x * 5, y, x * -3);
                assert_eq!(a.material_at(p), b.material_at(p));
                assert_eq!(a.material_at(p), a.material_at(p));
            }
        }
    }

    #[test]
    fn test_surface_bands_at_boundaries() {
        // height 0.5 -> surface 40.0 with the default base and amplitude
        let field = DensityField::with_noise(
            FieldParams::default(),
            ConstantNoise {
                height: 0.5,
                density: 0.1,
                resource: 0.5,
            },
        );
        assert_eq!(field.surface_height_at(0, 0), 40.0);
        assert_eq!(field.material_at(Point3::new(0, 40, 0)), Material::Grass);
        assert_eq!(field.material_at(Point3::new(0, 39, 0)), Material::Dirt);
        assert_eq!(field.material_at(Point3::new(0, 37, 0)), Material::Dirt);
        assert_eq!(field.material_at(Point3::new(0, 36, 0)), Material::Stone);
        // density 0.1 is rock above the surface too
        assert_eq!(field.material_at(Point3::new(0, 41, 0)), Material::Stone);
    }

    #[test]
    fn test_cells_above_surface_use_density_by_default() {
        let params = FieldParams::default();
        assert!(!params.open_sky);
        assert_eq!(params.classify(50.0, 40.0, || 0.1, || 0.5), Material::Stone);
        assert_eq!(params.classify(50.0, 40.0, || 0.7, || 0.5), Material::Air);
        assert_eq!(params.classify(50.0, 40.0, || 0.95, || 0.5), Material::Magic);
    }

    #[test]
    fn test_fractional_surface_band() {
        let params = FieldParams::default();
        assert_eq!(params.classify(40.0, 40.5, || 0.1, || 0.5), Material::Grass);
        assert_eq!(params.classify(39.0, 40.5, || 0.1, || 0.5), Material::Dirt);
        assert_eq!(params.classify(36.0, 40.5, || 0.1, || 0.5), Material::Stone);
    }

    #[test]
    fn test_density_branches() {
        let params = FieldParams::default();
        assert_eq!(params.classify(10.0, 40.0, || 0.64, || 0.5), Material::Stone);
        assert_eq!(params.classify(10.0, 40.0, || 0.65, || 0.5), Material::Air);
        assert_eq!(params.classify(10.0, 40.0, || 0.89, || 0.5), Material::Air);
        assert_eq!(params.classify(10.0, 40.0, || 0.9, || 0.5), Material::Magic);
    }

    #[test]
    fn test_resource_noise_only_sampled_in_rock() {
        let params = FieldParams::default();
        let material = params.classify(
            10.0,
            40.0,
            || 0.7,
            || panic!("resource noise must not be sampled in caves"),
        );
        assert_eq!(material, Material::Air);
    }

    #[test]
    fn test_rarest_ore_wins_when_every_band_matches() {
        // depth factor (40 - 2) / 40 = 0.95
        assert_eq!(rock(2.0, 40.0, 0.96), Material::Diamond);
        assert_eq!(rock(2.0, 40.0, 0.9), Material::Gold);
        assert_eq!(rock(2.0, 40.0, 0.8), Material::Iron);
        assert_eq!(rock(2.0, 40.0, 0.71), Material::Coal);
    }

    #[test]
    fn test_shallow_rock_skips_deep_bands() {
        // depth factor (40 - 20) / 40 = 0.5: too shallow for diamond and gold
        assert_eq!(rock(20.0, 40.0, 0.99), Material::Iron);
        // depth factor 0.25: only coal remains
        assert_eq!(rock(30.0, 40.0, 0.99), Material::Coal);
    }

    #[test]
    fn test_coal_beats_sand_near_surface() {
        // 5 below the surface is inside the sand band, but coal is checked first
        assert_eq!(rock(35.0, 40.0, 0.72), Material::Coal);
        assert_eq!(rock(35.0, 40.0, 0.65), Material::Sand);
        assert_eq!(rock(20.0, 40.0, 0.65), Material::Stone);
    }

    #[test]
    fn test_brick_and_stone() {
        assert_eq!(rock(35.0, 40.0, 0.1), Material::Brick);
        assert_eq!(rock(10.0, 40.0, 0.4), Material::Stone);
    }

    #[test]
    fn test_open_sky_returns_air_above_surface() {
        let params = FieldParams {
            open_sky: true,
            ..FieldParams::default()
        };
        assert_eq!(params.classify(50.0, 40.0, || 0.1, || 0.5), Material::Air);
        assert_eq!(
            params.classify(41.0, 40.0, || panic!("density must not be sampled"), || 0.5),
            Material::Air
        );
        assert_eq!(params.classify(40.0, 40.0, || 0.1, || 0.5), Material::Grass);
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let params = FieldParams {
            cave_threshold: 0.95,
            ..FieldParams::default()
        };
        assert!(params.validate().is_err());
        assert!(FieldParams::default().validate().is_ok());
    }
}
