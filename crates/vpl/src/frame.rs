//! Per-frame control flow. `update` runs the simulation steps in a fixed order
//! (camera, transforms, settings, light paths, virtual lights) and `submit`
//! hands the result to a rendering backend.

use tracing::{debug, trace};

use crate::{
    error::SimulationError,
    geometry::Vec3,
    input::InputState,
    render::{
        BlendMode, DepthTest, LightConstants, LightType, LightingPass, LineVertex, ObjectConstants,
        RenderBackend, SceneConstants,
    },
    scene::Scene,
    settings::{DebugLayers, SimulationSettings},
    tracer::{LightPath, LightPathTracer},
    vpl::{spawn_virtual_lights, VirtualLight},
};

const PATH_RAY_COLOR: Vec3 = Vec3(1.0, 0.85, 0.2);
const LOST_RAY_COLOR: Vec3 = Vec3(1.0, 0.2, 0.2);
const HIT_POINT_COLOR: Vec3 = Vec3(0.2, 1.0, 1.0);
const HIT_NORMAL_COLOR: Vec3 = Vec3(0.3, 0.3, 1.0);

const LOST_RAY_LENGTH: f32 = 3.0;
const HIT_POINT_SIZE: f32 = 0.02;
const HIT_NORMAL_LENGTH: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub path_count: usize,
    /// excluding the primary light
    pub vpl_count: usize,
    pub lost_rays: usize,
    pub deepest_bounce: usize,
}

impl FrameStats {
    fn gather(paths: &[LightPath], lights: &[VirtualLight]) -> Self {
        FrameStats {
            path_count: paths.len(),
            vpl_count: lights.len().saturating_sub(1),
            lost_rays: paths.iter().filter(|path| path.lost_ray().is_some()).count(),
            deepest_bounce: paths.iter().map(LightPath::bounce_count).max().unwrap_or(0),
        }
    }
}

/// Everything one simulation step produced. Rebuilt from scratch every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub light_paths: Vec<LightPath>,
    /// index 0 is the primary light
    pub virtual_lights: Vec<VirtualLight>,
    pub stats: FrameStats,
}

pub struct FrameOrchestrator {
    pub scene: Scene,
    pub settings: SimulationSettings,
    tracer: LightPathTracer,
}

impl FrameOrchestrator {
    pub fn new(scene: Scene, settings: SimulationSettings) -> Self {
        let tracer = LightPathTracer::new(settings.seed);
        FrameOrchestrator { scene, settings, tracer }
    }

    pub fn update(&mut self, input: &InputState) -> Result<Frame, SimulationError> {
        self.scene.camera.apply_input(input);
        self.scene.update_transforms()?;
        self.settings.clamp_to_ranges();

        let light_paths = self.tracer.trace(&self.scene, &self.settings);
        let virtual_lights = spawn_virtual_lights(
            &light_paths,
            self.settings.particle_count,
            self.settings.mean_reflectivity,
            &self.scene.light,
        )?;
        self.settings.clamp_filters(virtual_lights.len(), light_paths.len());

        let stats = FrameStats::gather(&light_paths, &virtual_lights);
        debug!(
            "frame: {} paths, {} vpls, {} lost rays, deepest bounce {}",
            stats.path_count, stats.vpl_count, stats.lost_rays, stats.deepest_bounce
        );

        Ok(Frame { light_paths, virtual_lights, stats })
    }

    /// Simulates and, only if that succeeded, renders one frame
    pub fn run_frame(
        &mut self,
        input: &InputState,
        backend: &mut impl RenderBackend,
        aspect_ratio: f32,
    ) -> Result<Frame, SimulationError> {
        let frame = self.update(input)?;
        self.submit(&frame, backend, aspect_ratio);
        Ok(frame)
    }

    pub fn submit(&self, frame: &Frame, backend: &mut impl RenderBackend, aspect_ratio: f32) {
        let camera = &self.scene.camera;
        let scene_constants = SceneConstants {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect_ratio),
            world_eye: camera.eye,
            particle_count: self.settings.particle_count,
        };
        let objects: Vec<ObjectConstants> = self
            .scene
            .objects()
            .iter()
            .map(|object| ObjectConstants {
                mesh: object.mesh,
                model: object.transform().model.forward,
                normal: object.transform().normal,
                albedo: object.albedo,
            })
            .collect();

        backend.begin_frame(&scene_constants, &objects);

        let primary = self.light_constants(&VirtualLight::primary(&self.scene.light));
        backend.shadow_pass(&primary);

        for (light_index, light) in self.selected_lights(&frame.virtual_lights) {
            let first = light_index == 0;
            let pass = LightingPass {
                light_index,
                light: self.light_constants(light),
                blend: if first { BlendMode::Replace } else { BlendMode::Additive },
                depth_test: if first { DepthTest::Less } else { DepthTest::Equal },
                shadowed: first,
            };
            trace!("lighting pass {light_index}");
            backend.lighting_pass(&pass);
        }

        let lines = self.debug_lines(&frame.light_paths);
        if !lines.is_empty() {
            backend.debug_lines(&lines);
        }

        backend.end_frame();
    }

    fn light_constants(&self, light: &VirtualLight) -> LightConstants {
        LightConstants {
            world_position: light.position,
            color: light.color,
            normal: light.normal.unwrap_or_default(),
            intensity: self.scene.light.intensity,
            radius: self.settings.vpl_radius,
            light_type: if light.is_primary() { LightType::Point } else { self.settings.vpl_light_type },
        }
    }

    // the primary light always renders; a light filter adds only the selected VPL
    fn selected_lights<'a>(&self, lights: &'a [VirtualLight]) -> Vec<(usize, &'a VirtualLight)> {
        match self.settings.light_filter {
            Some(selected) => lights
                .iter()
                .enumerate()
                .filter(|&(i, _)| i == 0 || i == selected)
                .collect(),
            None => lights.iter().enumerate().collect(),
        }
    }

    fn debug_lines(&self, paths: &[LightPath]) -> Vec<LineVertex> {
        let layers = self.settings.layers;
        let mut lines = Vec::new();
        let mut segment = |a: Vec3, b: Vec3, color: Vec3| {
            lines.push(LineVertex { position: a, color });
            lines.push(LineVertex { position: b, color });
        };

        let selected = paths
            .iter()
            .filter(|path| self.settings.path_filter.is_none_or(|i| path.index as usize == i));

        for path in selected {
            for (_, node, hit) in path.hits() {
                if layers.contains(DebugLayers::PATH_RAYS) {
                    segment(node.ray.origin, hit.position, PATH_RAY_COLOR);
                }
                if layers.contains(DebugLayers::HIT_POINTS) {
                    for axis in [Vec3(1.0, 0.0, 0.0), Vec3(0.0, 1.0, 0.0), Vec3(0.0, 0.0, 1.0)] {
                        let offset = axis * HIT_POINT_SIZE;
                        segment(hit.position - offset, hit.position + offset, HIT_POINT_COLOR);
                    }
                }
                if layers.contains(DebugLayers::HIT_NORMALS) {
                    segment(hit.position, hit.position + hit.normal * HIT_NORMAL_LENGTH, HIT_NORMAL_COLOR);
                }
            }

            if layers.contains(DebugLayers::LOST_RAYS) {
                if let Some(ray) = path.lost_ray() {
                    segment(ray.origin, ray.at(LOST_RAY_LENGTH / ray.direction.length()), LOST_RAY_COLOR);
                }
            }
        }

        lines
    }
}
