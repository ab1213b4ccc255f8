//! Seeded random sampling for light emission.
//!
//! The generator is owned by whoever traces a batch of paths and is re-seeded
//! at the start of every batch, so a (seed, scene, settings) tuple always
//! produces the same paths. This is a reproducibility mechanism, not a source
//! of cryptographic randomness.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::geometry::Vec3;

pub struct EmissionSampler {
    rng: ChaCha8Rng,
}

impl EmissionSampler {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Uniform direction on the unit sphere: azimuth in [0, 2pi), height in [-1, 1)
    pub fn sample_uniform_sphere(&mut self) -> Vec3 {
        let theta: f32 = self.rng.random_range(0.0..TAU);
        let z: f32 = self.rng.random_range(-1.0..1.0);
        let r = f32::sqrt(f32::max(0.0, 1.0 - z * z));
        Vec3(r * f32::cos(theta), r * f32::sin(theta), z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_samples_are_unit_length() {
        let mut sampler = EmissionSampler::new(7);
        for _ in 0..1000 {
            let d = sampler.sample_uniform_sphere();
            assert!((d.length() - 1.0).abs() < 1e-4, "{d} is not unit length");
        }
    }

    #[test]
    fn test_reseed_repeats_sequence() {
        let mut sampler = EmissionSampler::new(42);
        let first: Vec<Vec3> = (0..16).map(|_| sampler.sample_uniform_sphere()).collect();
        sampler.reseed(42);
        let second: Vec<Vec3> = (0..16).map(|_| sampler.sample_uniform_sphere()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sphere_samples_cover_both_hemispheres() {
        let mut sampler = EmissionSampler::new(3);
        let upper = (0..2000)
            .filter(|_| sampler.sample_uniform_sphere().z() > 0.0)
            .count();
        assert!((800..1200).contains(&upper), "{upper} of 2000 samples in upper hemisphere");
    }
}
