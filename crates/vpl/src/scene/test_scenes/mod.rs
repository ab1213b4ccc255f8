//! Built-in scenes. The viewer loads `cornell_box`; the tests use the smaller
//! ones to check the tracer against geometry with known answers.

use crate::{
    error::SceneError,
    geometry::{Shape, Vec3},
    lights::PointLight,
    scene::{Camera, MeshId, ObjectDesc, Scene, SceneBuilder},
};

/// Handles of the two meshes every built-in scene draws with, allocated by
/// the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneMeshes {
    pub quad: MeshId,
    pub cube: MeshId,
}

const WHITE: Vec3 = Vec3(0.73, 0.73, 0.73);
const RED: Vec3 = Vec3(0.65, 0.05, 0.05);
const GREEN: Vec3 = Vec3(0.12, 0.45, 0.15);

// template for the cornell box walls, returns a SceneBuilder so other functions can add on top.
// Room spans x in [-1, 1], y in [0, 2], z in [-1, 1] and is open towards -z.
#[rustfmt::skip]
fn cornell_box_walls(meshes: SceneMeshes) -> SceneBuilder {
    let mut scene_builder = SceneBuilder::new();
    let wall = |name: &str| ObjectDesc::new(name, Shape::Quad, meshes.quad).scale(Vec3(2.0, 2.0, 1.0));

    scene_builder.add_object(wall("Floor")    .position(Vec3( 0.0, 0.0, 0.0)).rotation(Vec3(-90.0,   0.0, 0.0)).albedo(WHITE));
    scene_builder.add_object(wall("Ceiling")  .position(Vec3( 0.0, 2.0, 0.0)).rotation(Vec3( 90.0,   0.0, 0.0)).albedo(WHITE));
    scene_builder.add_object(wall("BackWall") .position(Vec3( 0.0, 1.0, 1.0)).rotation(Vec3(  0.0, 180.0, 0.0)).albedo(WHITE));
    scene_builder.add_object(wall("LeftWall") .position(Vec3(-1.0, 1.0, 0.0)).rotation(Vec3(  0.0,  90.0, 0.0)).albedo(RED));
    scene_builder.add_object(wall("RightWall").position(Vec3( 1.0, 1.0, 0.0)).rotation(Vec3(  0.0, -90.0, 0.0)).albedo(GREEN));

    scene_builder.add_light(PointLight {
        position: Vec3(0.0, 1.8, 0.0),
        color: Vec3(1.0, 1.0, 1.0),
        intensity: 8.0,
    });
    scene_builder.add_camera(Camera {
        eye: Vec3(0.0, 1.0, -3.5),
        ..Default::default()
    });

    scene_builder
}

/// Cornell box with a tall and a short box
pub fn cornell_box(meshes: SceneMeshes) -> Result<Scene, SceneError> {
    let mut scene_builder = cornell_box_walls(meshes);

    scene_builder.add_object(
        ObjectDesc::new("TallBox", Shape::Box, meshes.cube)
            .position(Vec3(-0.35, 0.6, 0.3))
            .rotation(Vec3(0.0, 20.0, 0.0))
            .scale(Vec3(0.6, 1.2, 0.6))
            .albedo(WHITE),
    );
    scene_builder.add_object(
        ObjectDesc::new("ShortBox", Shape::Box, meshes.cube)
            .position(Vec3(0.4, 0.3, -0.3))
            .rotation(Vec3(0.0, -18.0, 0.0))
            .scale(Vec3::splat(0.6))
            .albedo(WHITE),
    );

    scene_builder.build()
}

/// Six inward-facing quads enclosing the light, oversized so that every ray
/// emitted or reflected inside the room hits something
#[rustfmt::skip]
pub fn closed_room(meshes: SceneMeshes, albedo: Vec3) -> Result<Scene, SceneError> {
    let mut scene_builder = SceneBuilder::new();
    let wall = |name: &str| ObjectDesc::new(name, Shape::Quad, meshes.quad).scale(Vec3(4.5, 4.5, 1.0)).albedo(albedo);

    scene_builder.add_object(wall("Floor")    .position(Vec3( 0.0, -1.0,  0.0)).rotation(Vec3(-90.0,   0.0, 0.0)));
    scene_builder.add_object(wall("Ceiling")  .position(Vec3( 0.0,  1.0,  0.0)).rotation(Vec3( 90.0,   0.0, 0.0)));
    scene_builder.add_object(wall("BackWall") .position(Vec3( 0.0,  0.0,  1.0)).rotation(Vec3(  0.0, 180.0, 0.0)));
    scene_builder.add_object(wall("FrontWall").position(Vec3( 0.0,  0.0, -1.0)).rotation(Vec3(  0.0,   0.0, 0.0)));
    scene_builder.add_object(wall("LeftWall") .position(Vec3(-1.0,  0.0,  0.0)).rotation(Vec3(  0.0,  90.0, 0.0)));
    scene_builder.add_object(wall("RightWall").position(Vec3( 1.0,  0.0,  0.0)).rotation(Vec3(  0.0, -90.0, 0.0)));

    scene_builder.add_light(PointLight {
        position: Vec3::zero(),
        ..Default::default()
    });

    scene_builder.build()
}

fn closed_white_room(meshes: SceneMeshes) -> Result<Scene, SceneError> {
    closed_room(meshes, WHITE)
}

/// Single unit quad at the origin facing a light 1 unit in front of it
pub fn single_quad(meshes: SceneMeshes) -> Result<Scene, SceneError> {
    let mut scene_builder = SceneBuilder::new();
    scene_builder.add_object(ObjectDesc::new("Quad", Shape::Quad, meshes.quad).albedo(WHITE));
    scene_builder.add_light(PointLight {
        position: Vec3(0.0, 0.0, 1.0),
        ..Default::default()
    });

    scene_builder.build()
}

pub struct TestSceneDescriptor {
    pub name: &'static str,
    pub scene_func: fn(SceneMeshes) -> Result<Scene, SceneError>,
}

pub fn all_test_scenes() -> &'static [TestSceneDescriptor] {
    const SCENES: &[TestSceneDescriptor] = &[
        TestSceneDescriptor { name: "cornell_box", scene_func: cornell_box },
        TestSceneDescriptor { name: "closed_room", scene_func: closed_white_room },
        TestSceneDescriptor { name: "single_quad", scene_func: single_quad },
    ];
    SCENES
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESHES: SceneMeshes = SceneMeshes { quad: MeshId(0), cube: MeshId(1) };

    #[test]
    fn test_cornell_box_builds() {
        let scene = cornell_box(MESHES).expect("valid scene");
        assert_eq!(scene.objects().len(), 7);
        assert_eq!(scene.object("TallBox").map(|o| o.mesh), Some(MESHES.cube));
    }

    #[test]
    fn test_cornell_walls_face_inwards() {
        let scene = cornell_box(MESHES).expect("valid scene");
        let center = Vec3(0.0, 1.0, 0.0);
        for name in ["Floor", "Ceiling", "BackWall", "LeftWall", "RightWall"] {
            let wall = scene.object(name).expect("wall exists");
            let normal = wall.transform().transform_normal(Vec3(0.0, 0.0, 1.0));
            let to_center = center - wall.position;
            assert!(Vec3::dot(normal, to_center) > 0.0, "{name} faces away from the room");
        }
    }

    #[test]
    fn test_closed_room_has_no_exit() {
        use crate::{geometry::Ray, sampling::EmissionSampler};

        let scene = closed_room(MESHES, Vec3::splat(0.5)).expect("valid scene");
        let mut sampler = EmissionSampler::new(11);
        for _ in 0..500 {
            let ray = Ray::new(scene.light.position, sampler.sample_uniform_sphere());
            assert!(scene.closest_hit(ray).is_some(), "ray {:?} escaped", ray.direction);
        }
    }
}
