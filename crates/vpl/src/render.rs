//! The contract with the rendering backend. The simulation produces these
//! payloads every frame; how they reach the GPU is up to the implementor.

use crate::{
    geometry::{Matrix4x4, Vec3},
    scene::MeshId,
};

/// Falloff model the shader uses for a light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightType {
    /// omnidirectional, used for the primary light
    Point,
    /// hemisphere step: full intensity in front of the VPL's surface, none behind
    SignCosineWeighted,
    /// intensity scaled by the cosine to the VPL's surface normal
    #[default]
    CosineWeighted,
}

impl LightType {
    /// Types a VPL may be rendered with
    pub const VPL_TYPES: [LightType; 2] = [LightType::SignCosineWeighted, LightType::CosineWeighted];

    pub fn name(&self) -> &'static str {
        match self {
            LightType::Point => "Point",
            LightType::SignCosineWeighted => "Sign cosine weighted",
            LightType::CosineWeighted => "Cosine weighted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConstants {
    pub view: Matrix4x4,
    pub projection: Matrix4x4,
    pub world_eye: Vec3,
    pub particle_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectConstants {
    pub mesh: MeshId,
    pub model: Matrix4x4,
    pub normal: Matrix4x4,
    pub albedo: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConstants {
    pub world_position: Vec3,
    pub color: Vec3,
    /// zero for the primary light
    pub normal: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub light_type: LightType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Replace,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTest {
    Less,
    Equal,
}

/// One full draw of every object lit by a single light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingPass {
    /// index into this frame's virtual light list
    pub light_index: usize,
    pub light: LightConstants,
    pub blend: BlendMode,
    pub depth_test: DepthTest,
    /// sample the primary light's shadow map, for backends that render one
    pub shadowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    pub position: Vec3,
    pub color: Vec3,
}

/// Called in this order each frame: `begin_frame`, `shadow_pass`, one
/// `lighting_pass` per light, `debug_lines`, `end_frame`
pub trait RenderBackend {
    fn begin_frame(&mut self, scene: &SceneConstants, objects: &[ObjectConstants]);

    /// Depth from the primary light, for the first lighting pass to sample.
    /// The wgpu viewer does not render shadow maps: its implementation is
    /// only a trace log and `LightingPass::shadowed` is ignored there.
    fn shadow_pass(&mut self, light: &LightConstants);

    fn lighting_pass(&mut self, pass: &LightingPass);

    /// Pairs of vertices, one line segment each
    fn debug_lines(&mut self, vertices: &[LineVertex]);

    fn end_frame(&mut self);
}
