use vpl::{scene::test_scenes, settings::SimulationSettings};

#[derive(Debug, clap::Parser)]
pub(crate) struct CommandLineArguments {
    #[arg(long, default_value_t = 1280, help = "Window width in physical pixels")]
    pub width: u32,
    #[arg(long, default_value_t = 720, help = "Window height in physical pixels")]
    pub height: u32,

    #[arg(long, default_value = "cornell_box", help = "Builtin scene to load")]
    pub scene_name: String,
    #[arg(long, help = "Print the builtin scene names and exit")]
    pub list_scenes: bool,

    #[arg(short = 'n', long, help = "Light paths traced per frame")]
    pub particles: Option<u32>,
    #[arg(short = 'r', long, help = "Mean reflectivity used for path survival")]
    pub reflectivity: Option<f32>,
    #[arg(short, long, help = "Seed the path tracer is reset to every frame")]
    pub seed: Option<u64>,
}

impl CommandLineArguments {
    pub fn settings(&self) -> SimulationSettings {
        let defaults = SimulationSettings::default();
        SimulationSettings {
            particle_count: self.particles.unwrap_or(defaults.particle_count),
            mean_reflectivity: self.reflectivity.unwrap_or(defaults.mean_reflectivity),
            seed: self.seed.unwrap_or(defaults.seed),
            ..defaults
        }
    }

    pub fn scene(&self) -> Option<&'static test_scenes::TestSceneDescriptor> {
        test_scenes::all_test_scenes()
            .iter()
            .find(|descriptor| descriptor.name == self.scene_name)
    }
}
