use crate::geometry::Vec3;

/// The scene's single real light. Emits uniformly in all directions and is the
/// origin of every light path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        PointLight {
            position: Vec3(0.0, 1.8, 0.0),
            color: Vec3(1.0, 1.0, 1.0),
            intensity: 1.0,
        }
    }
}
