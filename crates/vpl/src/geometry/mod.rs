mod matrix4x4;
mod ray;
pub mod shapes;
mod transform;
mod vec3;

pub use matrix4x4::Matrix4x4;
pub use ray::{Ray, RayHit};
pub use transform::{ObjectTransform, Transform};
pub use vec3::Vec3;

pub use shapes::Shape;
