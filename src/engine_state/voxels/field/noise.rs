//! # Noise Sources
//!
//! The three noise layers sampled by the density field, behind a trait so the
//! classification logic can be driven by synthetic values.

use noise::{Fbm, MultiFractal, NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

/// Frequency and octave count of one fractal noise layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayer {
    pub frequency: f64,
    pub octaves: usize,
}

impl NoiseLayer {
    pub const fn new(frequency: f64, octaves: usize) -> Self {
        NoiseLayer { frequency, octaves }
    }

    fn build(&self, seed: u32) -> Fbm<Simplex> {
        Fbm::<Simplex>::new(seed)
            .set_octaves(self.octaves)
            .set_frequency(self.frequency)
    }
}

/// Source of the normalized noise samples consumed by `DensityField`.
///
/// Every method returns a value in `[0, 1]` and must be a pure function of its inputs.
pub trait NoiseSource: Send + Sync {
    /// 2D terrain height noise.
    fn height(&self, x: f64, z: f64) -> f64;
    /// 3D density noise deciding between rock, caves and magic pockets.
    fn density(&self, x: f64, y: f64, z: f64) -> f64;
    /// Higher frequency 3D noise selecting ores and decorative blocks.
    fn resource(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Fractal simplex noise for all three layers, each layer seeded independently.
pub struct FractalNoise {
    height: Fbm<Simplex>,
    density: Fbm<Simplex>,
    resource: Fbm<Simplex>,
}

impl FractalNoise {
    pub fn new(seed: u32, height: NoiseLayer, density: NoiseLayer, resource: NoiseLayer) -> Self {
        FractalNoise {
            height: height.build(seed),
            density: density.build(seed.wrapping_add(1)),
            resource: resource.build(seed.wrapping_add(2)),
        }
    }
}

/// Maps raw fractal output (roughly `[-1, 1]`) into `[0, 1]`.
#[inline]
fn normalize(value: f64) -> f64 {
    ((value + 1.0) * 0.5).clamp(0.0, 1.0)
}

impl NoiseSource for FractalNoise {
    fn height(&self, x: f64, z: f64) -> f64 {
        normalize(self.height.get([x, z]))
    }

    fn density(&self, x: f64, y: f64, z: f64) -> f64 {
        normalize(self.density.get([x, y, z]))
    }

    fn resource(&self, x: f64, y: f64, z: f64) -> f64 {
        normalize(self.resource.get([x, y, z]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_noise(seed: u32) -> FractalNoise {
        FractalNoise::new(
            seed,
            NoiseLayer::new(0.01, 1),
            NoiseLayer::new(0.03, 3),
            NoiseLayer::new(0.09, 3),
        )
    }

    #[test]
    fn test_samples_are_normalized() {
        let noise = sample_noise(7);
        for i in -20..20 {
            let p = i as f64 * 3.7;
            for value in [
                noise.height(p, -p),
                noise.density(p, p * 0.5, -p),
                noise.resource(-p, p, p * 2.0),
            ] {
                assert!((0.0..=1.0).contains(&value), "{value} out of range");
            }
        }
    }

    #[test]
    fn test_same_seed_same_samples() {
        let a = sample_noise(42);
        let b = sample_noise(42);
        assert_eq!(a.density(10.0, 20.0, 30.0), b.density(10.0, 20.0, 30.0));
        assert_eq!(a.height(-5.0, 9.0), b.height(-5.0, 9.0));
    }
}
