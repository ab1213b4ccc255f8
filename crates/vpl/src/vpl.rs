//! Virtual point lights, spawned at every hit of every light path and
//! re-weighted with Keller's instant radiosity compensation.

use tracing::debug;

use crate::{
    error::SimulationError,
    geometry::Vec3,
    lights::PointLight,
    tracer::{survival_count, LightPath},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualLight {
    pub position: Vec3,
    /// None for the primary light
    pub normal: Option<Vec3>,
    pub color: Vec3,
    /// chain position of the spawning node; None for the primary light
    pub bounce: Option<u32>,
}

impl VirtualLight {
    pub fn primary(light: &PointLight) -> Self {
        VirtualLight {
            position: light.position,
            normal: None,
            color: light.color,
            bounce: None,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.bounce.is_none()
    }
}

/// `N / floor(rho^bounce * N) * color`. Only `floor(rho^bounce * N)` of the N
/// paths can reach depth `bounce`, so each of their lights stands in for the
/// rest. Errors when no path survives to that depth.
pub fn compensate_vpl_color(
    particle_count: u32,
    mean_reflectivity: f32,
    bounce: u32,
    color: Vec3,
) -> Result<Vec3, SimulationError> {
    let survivors = survival_count(particle_count, mean_reflectivity, bounce);
    if survivors == 0 {
        return Err(SimulationError::ZeroSurvivors { particle_count, mean_reflectivity, bounce });
    }

    Ok(color * (particle_count as f32 / survivors as f32))
}

/// Primary light first, then one light per valid hit, path by path in chain order
pub fn spawn_virtual_lights(
    paths: &[LightPath],
    particle_count: u32,
    mean_reflectivity: f32,
    light: &PointLight,
) -> Result<Vec<VirtualLight>, SimulationError> {
    let mut lights = vec![VirtualLight::primary(light)];

    for path in paths {
        for (j, node, hit) in path.hits() {
            let bounce = j as u32;
            let color = compensate_vpl_color(particle_count, mean_reflectivity, bounce, node.outgoing_hit_color)?;
            lights.push(VirtualLight {
                position: hit.position,
                normal: Some(hit.normal),
                color,
                bounce: Some(bounce),
            });
        }
    }

    debug!("spawned {} virtual lights from {} paths", lights.len() - 1, paths.len());
    Ok(lights)
}
