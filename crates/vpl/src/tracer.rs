//! Light path construction: rays leave the point light in uniformly random
//! directions and bounce diffusely through the scene. Path `i` may take bounce
//! `b` only while `i < floor(rho^b * N)`, so the number of paths still
//! bouncing shrinks geometrically with depth.

use std::f32::consts::PI;

use tracing::trace;

use crate::{
    geometry::{Ray, RayHit, Vec3},
    sampling::EmissionSampler,
    scene::Scene,
    settings::SimulationSettings,
};

/// Hard cap on path length. Never reached for particle counts and
/// reflectivities inside the settings ranges (rho = 0.9, N = 1000 survives
/// at most 66 bounces).
pub const MAX_BOUNCES: u32 = 128;

/// Reflected rays start this far along their direction from the hit point
pub const RAY_OFFSET: f32 = 1e-4;

/// `floor(rho^bounce * N)`: how many of the N paths may take bounce `bounce`
pub fn survival_count(particle_count: u32, mean_reflectivity: f32, bounce: u32) -> u32 {
    let exponent = i32::try_from(bounce).unwrap_or(i32::MAX);
    (mean_reflectivity.powi(exponent) * particle_count as f32).floor() as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPathNode {
    pub ray: Ray,
    /// None if the ray missed, or if the path ended before it was traced
    pub hit: Option<RayHit>,
    pub incoming_ray_color: Vec3,
    /// incoming color attenuated by the hit surface's diffuse BRDF
    pub outgoing_hit_color: Vec3,
}

impl LightPathNode {
    fn new(ray: Ray, incoming_ray_color: Vec3) -> Self {
        LightPathNode {
            ray,
            hit: None,
            incoming_ray_color,
            outgoing_hit_color: Vec3::zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTermination {
    /// last traced ray left the scene
    Missed,
    /// path index fell outside the survival count for the next bounce
    SurvivalBudget,
    BounceLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightPath {
    pub index: u32,
    /// never empty; node 0 is emitted from the light
    pub nodes: Vec<LightPathNode>,
    pub termination: PathTermination,
}

impl LightPath {
    /// (chain position, node, hit) for every node whose ray hit something
    pub fn hits(&self) -> impl Iterator<Item = (usize, &LightPathNode, RayHit)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(j, node)| node.hit.map(|hit| (j, node, hit)))
    }

    pub fn bounce_count(&self) -> usize {
        self.hits().count()
    }

    /// Number of rays actually intersected against the scene
    pub fn traced_segments(&self) -> usize {
        match self.termination {
            PathTermination::Missed => self.bounce_count() + 1,
            _ => self.bounce_count(),
        }
    }

    /// The escaping ray, if the path ended in a miss
    pub fn lost_ray(&self) -> Option<Ray> {
        match self.termination {
            PathTermination::Missed => self.nodes.last().map(|node| node.ray),
            _ => None,
        }
    }
}

pub struct LightPathTracer {
    sampler: EmissionSampler,
}

impl LightPathTracer {
    pub fn new(seed: u64) -> Self {
        LightPathTracer { sampler: EmissionSampler::new(seed) }
    }

    /// Traces exactly `settings.particle_count` paths. The sampler is re-seeded
    /// first, so equal inputs always give equal paths.
    pub fn trace(&mut self, scene: &Scene, settings: &SimulationSettings) -> Vec<LightPath> {
        self.sampler.reseed(settings.seed);

        (0..settings.particle_count)
            .map(|index| {
                let direction = self.sampler.sample_uniform_sphere();
                trace_light_path(scene, index, direction, settings.particle_count, settings.mean_reflectivity)
            })
            .collect()
    }
}

pub fn trace_light_path(
    scene: &Scene,
    index: u32,
    direction: Vec3,
    particle_count: u32,
    mean_reflectivity: f32,
) -> LightPath {
    let light = &scene.light;
    let mut nodes = Vec::new();
    let mut current = LightPathNode::new(Ray::new(light.position, direction), light.color);
    let mut bounce = 0;

    let termination = loop {
        if bounce >= MAX_BOUNCES {
            break PathTermination::BounceLimit;
        }
        if index >= survival_count(particle_count, mean_reflectivity, bounce) {
            break PathTermination::SurvivalBudget;
        }

        let Some((object, hit)) = scene.closest_hit(current.ray) else {
            break PathTermination::Missed;
        };

        current.hit = Some(hit);
        current.outgoing_hit_color = current.incoming_ray_color * object.albedo / PI;

        let reflected = Vec3::reflect(current.ray.direction, hit.normal);
        let next = LightPathNode::new(
            Ray::new(hit.position + reflected * RAY_OFFSET, reflected),
            current.outgoing_hit_color,
        );
        nodes.push(std::mem::replace(&mut current, next));
        bounce += 1;
    };
    nodes.push(current);

    trace!("path {index}: {bounce} bounces, {termination:?}");
    LightPath { index, nodes, termination }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{
        test_scenes::{closed_room, single_quad, SceneMeshes},
        MeshId,
    };

    const MESHES: SceneMeshes = SceneMeshes { quad: MeshId(0), cube: MeshId(1) };

    #[test]
    fn test_survival_counts() {
        let counts: Vec<u32> = (0..5).map(|b| survival_count(10, 0.5, b)).collect();
        assert_eq!(counts, vec![10, 5, 2, 1, 0]);
        assert_eq!(survival_count(1000, 0.9, 65), 1);
        assert_eq!(survival_count(1000, 0.9, 66), 0);
    }

    #[test]
    fn test_head_on_hit_attenuates_by_albedo() {
        let scene = single_quad(MESHES).expect("valid scene");
        let path = trace_light_path(&scene, 0, Vec3(0.0, 0.0, -1.0), 1, 0.5);

        assert_eq!(path.termination, PathTermination::SurvivalBudget);
        assert_eq!(path.nodes.len(), 2);

        let first = path.nodes[0];
        let hit = first.hit.expect("should hit the quad");
        assert!((hit.position - Vec3::zero()).length() < 1e-5);
        let expected = Vec3::splat(0.73 / PI);
        assert!((first.outgoing_hit_color - expected).length() < 1e-6);

        // reflected straight back towards the light, untraced
        let second = path.nodes[1];
        assert!(second.hit.is_none());
        assert!((second.ray.direction - Vec3(0.0, 0.0, 1.0)).length() < 1e-5);
        assert_eq!(second.incoming_ray_color, first.outgoing_hit_color);
    }

    #[test]
    fn test_miss_is_a_lost_ray() {
        let scene = single_quad(MESHES).expect("valid scene");
        let path = trace_light_path(&scene, 0, Vec3(0.0, 1.0, 0.0), 10, 0.5);

        assert_eq!(path.termination, PathTermination::Missed);
        assert_eq!(path.nodes.len(), 1);
        assert_eq!(path.traced_segments(), 1);
        assert_eq!(path.lost_ray().map(|ray| ray.direction), Some(Vec3(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_path_outside_first_survival_count_is_not_traced() {
        let scene = closed_room(MESHES, Vec3::splat(0.5)).expect("valid scene");
        // survival_count(4, 0.1, 0) = 4, so index 4 would be a fifth path
        let path = trace_light_path(&scene, 4, Vec3(1.0, 0.0, 0.0), 4, 0.1);
        assert_eq!(path.traced_segments(), 0);
        assert_eq!(path.termination, PathTermination::SurvivalBudget);
    }

    #[test]
    fn test_closed_room_bounces_until_budget() {
        let scene = closed_room(MESHES, Vec3::splat(0.5)).expect("valid scene");
        let settings = SimulationSettings {
            particle_count: 10,
            mean_reflectivity: 0.5,
            seed: 0,
            ..Default::default()
        };

        let paths = LightPathTracer::new(0).trace(&scene, &settings);
        assert_eq!(paths.len(), 10);

        let expected = [4, 3, 2, 2, 2, 1, 1, 1, 1, 1];
        for (path, bounces) in paths.iter().zip(expected) {
            assert_eq!(path.termination, PathTermination::SurvivalBudget);
            assert_eq!(path.bounce_count(), bounces, "path {}", path.index);
        }
    }
}
