mod camera;
mod object;
mod scene;
pub mod test_scenes;

pub use camera::Camera;
pub use object::{MeshId, Object, ObjectDesc};
pub use scene::{Scene, SceneBuilder};
