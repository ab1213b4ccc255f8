//! User-tunable simulation parameters. The UI may write anything into these;
//! the frame orchestrator clamps them back into range at the start of every
//! frame before they are used.

use std::ops::RangeInclusive;

use tracing::warn;

use crate::render::LightType;

mod layers;

pub use layers::DebugLayers;

pub const PARTICLE_COUNT_RANGE: RangeInclusive<u32> = 1..=1000;
pub const MEAN_REFLECTIVITY_RANGE: RangeInclusive<f32> = 0.1..=0.9;
pub const VPL_RADIUS_RANGE: RangeInclusive<f32> = 0.01..=1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// N: number of light paths emitted per frame
    pub particle_count: u32,
    /// rho: assumed average albedo, controls how many paths survive each bounce
    pub mean_reflectivity: f32,
    /// the tracer's RNG is re-seeded with this every frame
    pub seed: u64,

    /// only render the primary light plus this virtual light
    pub light_filter: Option<usize>,
    /// only draw debug lines for this light path
    pub path_filter: Option<usize>,
    pub layers: DebugLayers,

    /// falloff used by the backend when shading with a VPL
    pub vpl_light_type: LightType,
    /// distance below which a VPL's 1/d^2 falloff is clamped
    pub vpl_radius: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            particle_count: 64,
            mean_reflectivity: 0.5,
            seed: 0,

            light_filter: None,
            path_filter: None,
            layers: DebugLayers::default(),

            vpl_light_type: LightType::CosineWeighted,
            vpl_radius: 0.1,
        }
    }
}

fn clamp_logged<T>(name: &str, value: &mut T, range: &RangeInclusive<T>) -> bool
where
    T: PartialOrd + Copy + std::fmt::Debug,
{
    let clamped = if *value < *range.start() {
        *range.start()
    } else if *value > *range.end() {
        *range.end()
    } else {
        return false;
    };

    warn!("{name} {value:?} out of range {range:?}, clamping to {clamped:?}");
    *value = clamped;
    true
}

impl SimulationSettings {
    /// Clamps every ranged value. Returns true if anything changed.
    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = false;
        changed |= clamp_logged("particle count", &mut self.particle_count, &PARTICLE_COUNT_RANGE);

        // NaN compares false against both bounds; treat it as the lower bound
        if self.mean_reflectivity.is_nan() {
            self.mean_reflectivity = *MEAN_REFLECTIVITY_RANGE.start();
            changed = true;
        }
        changed |= clamp_logged("mean reflectivity", &mut self.mean_reflectivity, &MEAN_REFLECTIVITY_RANGE);

        if self.vpl_radius.is_nan() {
            self.vpl_radius = *VPL_RADIUS_RANGE.start();
            changed = true;
        }
        changed |= clamp_logged("vpl radius", &mut self.vpl_radius, &VPL_RADIUS_RANGE);

        if self.vpl_light_type == LightType::Point {
            warn!("point falloff is reserved for the primary light, using cosine-weighted VPLs");
            self.vpl_light_type = LightType::CosineWeighted;
            changed = true;
        }

        changed
    }

    /// Drops debug selections that point past the end of this frame's data
    pub fn clamp_filters(&mut self, light_count: usize, path_count: usize) {
        if self.light_filter.is_some_and(|i| i >= light_count) {
            warn!("light filter {:?} out of range ({light_count} lights), clearing", self.light_filter);
            self.light_filter = None;
        }
        if self.path_filter.is_some_and(|i| i >= path_count) {
            warn!("path filter {:?} out of range ({path_count} paths), clearing", self.path_filter);
            self.path_filter = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        let mut settings = SimulationSettings::default();
        assert!(!settings.clamp_to_ranges());
    }

    #[test]
    fn test_clamp_out_of_range() {
        let mut settings = SimulationSettings {
            particle_count: 0,
            mean_reflectivity: 1.5,
            vpl_radius: -3.0,
            ..Default::default()
        };
        assert!(settings.clamp_to_ranges());
        assert_eq!(settings.particle_count, 1);
        assert_eq!(settings.mean_reflectivity, 0.9);
        assert_eq!(settings.vpl_radius, 0.01);

        settings.particle_count = 5000;
        settings.mean_reflectivity = 0.0;
        settings.clamp_to_ranges();
        assert_eq!(settings.particle_count, 1000);
        assert_eq!(settings.mean_reflectivity, 0.1);
    }

    #[test]
    fn test_nan_reflectivity() {
        let mut settings = SimulationSettings {
            mean_reflectivity: f32::NAN,
            ..Default::default()
        };
        assert!(settings.clamp_to_ranges());
        assert_eq!(settings.mean_reflectivity, 0.1);
    }

    #[test]
    fn test_clamp_filters() {
        let mut settings = SimulationSettings {
            light_filter: Some(3),
            path_filter: Some(9),
            ..Default::default()
        };
        settings.clamp_filters(4, 9);
        assert_eq!(settings.light_filter, Some(3));
        assert_eq!(settings.path_filter, None);
    }
}
