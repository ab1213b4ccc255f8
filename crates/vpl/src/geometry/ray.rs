use super::Vec3;

/// World- or local-space ray. The direction is not required to be unit length;
/// the intersection routines only compare parametric distances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Ray { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A valid intersection, always in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub position: Vec3,
    pub normal: Vec3,
}

impl RayHit {
    pub fn square_distance_from(&self, point: Vec3) -> f32 {
        (self.position - point).square_magnitude()
    }
}
