use std::time::Duration;

use imgui::{Condition, TreeNodeFlags};

use vpl::{
    geometry::Vec3,
    render::LightType,
    settings::{DebugLayers, MEAN_REFLECTIVITY_RANGE, PARTICLE_COUNT_RANGE, VPL_RADIUS_RANGE},
    FrameOrchestrator, FrameStats,
};

use crate::RenderGui;

const LAYER_TOGGLES: [(&str, DebugLayers); 4] = [
    ("Path rays", DebugLayers::PATH_RAYS),
    ("Lost rays", DebugLayers::LOST_RAYS),
    ("Hit points", DebugLayers::HIT_POINTS),
    ("Hit normals", DebugLayers::HIT_NORMALS),
];

/// Simulation state plus what the panel shows about the last frame
pub(crate) struct SimulationView {
    pub orchestrator: FrameOrchestrator,
    pub stats: FrameStats,
    pub simulation_time: Duration,
}

impl SimulationView {
    pub fn new(orchestrator: FrameOrchestrator) -> Self {
        SimulationView {
            orchestrator,
            stats: FrameStats::default(),
            simulation_time: Duration::ZERO,
        }
    }
}

// -1 in the UI means "no selection"
fn filter_input(ui: &imgui::Ui, label: &str, filter: &mut Option<usize>) {
    let mut value = filter.map_or(-1, |i| i as i32);
    if ui.input_int(label, &mut value).build() {
        *filter = usize::try_from(value).ok();
    }
}

fn vec3_input(ui: &imgui::Ui, label: &str, value: &mut Vec3) {
    let mut components: [f32; 3] = (*value).into();
    if ui.input_float3(label, &mut components).build() {
        *value = components.into();
    }
}

impl RenderGui for SimulationView {
    fn render_imgui(&mut self, ui: &mut imgui::Ui) {
        let stats = self.stats;
        let simulation_time = self.simulation_time;
        let FrameOrchestrator { scene, settings, .. } = &mut self.orchestrator;

        ui.window("Simulation")
            .size([340.0, 520.0], Condition::FirstUseEver)
            .position([10.0, 10.0], Condition::FirstUseEver)
            .build(|| {
                ui.text(format!("Simulation time: {simulation_time:?}"));
                ui.text(format!("Light paths: {}", stats.path_count));
                ui.text(format!("Virtual lights: {}", stats.vpl_count));
                ui.text(format!("Lost rays: {}", stats.lost_rays));
                ui.text(format!("Deepest bounce: {}", stats.deepest_bounce));

                ui.separator();
                ui.slider(
                    "Particles",
                    *PARTICLE_COUNT_RANGE.start(),
                    *PARTICLE_COUNT_RANGE.end(),
                    &mut settings.particle_count,
                );
                ui.slider(
                    "Reflectivity",
                    *MEAN_REFLECTIVITY_RANGE.start(),
                    *MEAN_REFLECTIVITY_RANGE.end(),
                    &mut settings.mean_reflectivity,
                );
                ui.input_scalar("Seed", &mut settings.seed).build();

                if let Some(combo) = ui.begin_combo("VPL falloff", settings.vpl_light_type.name()) {
                    for light_type in LightType::VPL_TYPES {
                        if ui.selectable(light_type.name()) {
                            settings.vpl_light_type = light_type;
                        }
                    }
                    combo.end();
                }
                ui.slider(
                    "VPL radius",
                    *VPL_RADIUS_RANGE.start(),
                    *VPL_RADIUS_RANGE.end(),
                    &mut settings.vpl_radius,
                );

                if ui.collapsing_header("Debug", TreeNodeFlags::DEFAULT_OPEN) {
                    for (label, layer) in LAYER_TOGGLES {
                        let mut enabled = settings.layers.contains(layer);
                        if ui.checkbox(label, &mut enabled) {
                            settings.layers.set(layer, enabled);
                        }
                    }
                    filter_input(ui, "Light filter", &mut settings.light_filter);
                    filter_input(ui, "Path filter", &mut settings.path_filter);
                }

                if ui.collapsing_header("Light", TreeNodeFlags::DEFAULT_OPEN) {
                    vec3_input(ui, "Position", &mut scene.light.position);
                    let mut color: [f32; 3] = scene.light.color.into();
                    if ui.color_edit3("Color", &mut color) {
                        scene.light.color = color.into();
                    }
                    ui.slider("Intensity", 0.0, 20.0, &mut scene.light.intensity);
                }

                ui.separator();
                let camera = &scene.camera;
                ui.text(format!("Camera: {} yaw {:.1} pitch {:.1}", camera.eye, camera.yaw, camera.pitch));
                ui.text("Hold right mouse to look, WASD/QE to move");
            });
    }
}
