//! Ray intersection against the two primitive shapes the scene is built from.
//!
//! Both primitives live in a unit-sized local space centered at the origin:
//! - `Quad`: the square [-0.5, 0.5]² on the plane z = 0, facing +z
//! - `Box`: the cube [-0.5, 0.5]³
//!
//! Objects place them in the world with an `ObjectTransform`; intersection
//! happens in local space and results are mapped back to world space.

use crate::geometry::{ObjectTransform, Ray, RayHit};

mod cuboid;
mod quad;

pub use cuboid::{intersect_box, BOX_FACE_EPSILON};
pub use quad::intersect_quad;

/// Every object intersects as exactly one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Quad,
    Box,
}

impl Shape {
    pub fn intersect(&self, ray: Ray, transform: &ObjectTransform) -> Option<RayHit> {
        match self {
            Shape::Quad => intersect_quad(ray, transform),
            Shape::Box => intersect_box(ray, transform),
        }
    }
}

// world ray -> local ray; translation only affects the origin
fn to_local(ray: Ray, transform: &ObjectTransform) -> Ray {
    Ray {
        origin: transform.model.apply_inverse_point(ray.origin),
        direction: transform.model.apply_inverse_vector(ray.direction),
    }
}
