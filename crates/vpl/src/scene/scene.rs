use std::collections::HashSet;

use tracing::debug;

use crate::{
    error::SceneError,
    geometry::{Ray, RayHit},
    lights::PointLight,
};

use super::{
    camera::Camera,
    object::{Object, ObjectDesc},
};

pub struct Scene {
    pub camera: Camera,
    pub light: PointLight,

    objects: Vec<Object>,
}

impl Scene {
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|object| object.name == name)
    }

    /// Rebuilds every object's model and normal matrices from its transform fields
    pub fn update_transforms(&mut self) -> Result<(), SceneError> {
        for object in &mut self.objects {
            object.update_transform()?;
        }
        Ok(())
    }

    /// Closest valid hit over all objects, compared by squared distance from the
    /// ray origin. On equal distances the earlier object wins.
    pub fn closest_hit(&self, ray: Ray) -> Option<(&Object, RayHit)> {
        let mut closest: Option<(&Object, RayHit, f32)> = None;
        for object in &self.objects {
            let Some(hit) = object.intersect(ray) else {
                continue;
            };

            let square_distance = hit.square_distance_from(ray.origin);
            if closest.is_none_or(|(_, _, best)| square_distance < best) {
                closest = Some((object, hit, square_distance));
            }
        }

        closest.map(|(object, hit, _)| (object, hit))
    }
}

#[derive(Default)]
pub struct SceneBuilder {
    camera: Option<Camera>,
    light: Option<PointLight>,
    objects: Vec<ObjectDesc>,
}

impl SceneBuilder {
    pub fn new() -> SceneBuilder {
        SceneBuilder::default()
    }

    pub fn add_object(&mut self, object: ObjectDesc) {
        self.objects.push(object);
    }

    pub fn add_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.light = Some(light);
    }

    /// Validates the object list (unique names, every object has a shape,
    /// every transform invertible) and builds the scene
    pub fn build(self) -> Result<Scene, SceneError> {
        let mut names = HashSet::new();
        let mut objects = Vec::with_capacity(self.objects.len());

        for desc in self.objects {
            if !names.insert(desc.name.clone()) {
                return Err(SceneError::DuplicateObjectName(desc.name));
            }
            let shape = desc.shape.ok_or_else(|| SceneError::MissingShape(desc.name.clone()))?;
            objects.push(Object::new(desc, shape)?);
        }

        debug!("built scene with {} objects", objects.len());

        Ok(Scene {
            camera: self.camera.unwrap_or_default(),
            light: self.light.unwrap_or_default(),
            objects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{Shape, Vec3},
        scene::MeshId,
    };

    fn wall(name: &str) -> ObjectDesc {
        ObjectDesc::new(name, Shape::Quad, MeshId(0))
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut builder = SceneBuilder::new();
        builder.add_object(wall("Wall"));
        builder.add_object(wall("Floor"));
        builder.add_object(wall("Wall"));

        let err = builder.build().err();
        assert_eq!(err, Some(SceneError::DuplicateObjectName("Wall".to_string())));
    }

    #[test]
    fn test_missing_shape_rejected() {
        let mut builder = SceneBuilder::new();
        builder.add_object(ObjectDesc { shape: None, ..wall("Ghost") });

        let err = builder.build().err();
        assert_eq!(err, Some(SceneError::MissingShape("Ghost".to_string())));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut builder = SceneBuilder::new();
        builder.add_object(wall("Flat").scale(Vec3(1.0, 0.0, 1.0)));

        let err = builder.build().err();
        assert_eq!(err, Some(SceneError::SingularTransform("Flat".to_string())));
    }

    #[test]
    fn test_equal_distance_first_object_wins() {
        let mut builder = SceneBuilder::new();
        builder.add_object(wall("A").albedo(Vec3(1.0, 0.0, 0.0)));
        builder.add_object(wall("B").albedo(Vec3(0.0, 1.0, 0.0)));
        let scene = builder.build().expect("valid scene");

        let ray = Ray::new(Vec3(0.0, 0.0, 2.0), Vec3(0.0, 0.0, -1.0));
        let (object, _) = scene.closest_hit(ray).expect("should hit");
        assert_eq!(object.name, "A");
    }

    #[test]
    fn test_moved_object_needs_transform_update() {
        let mut builder = SceneBuilder::new();
        builder.add_object(wall("Target"));
        let mut scene = builder.build().expect("valid scene");

        let ray = Ray::new(Vec3(5.0, 0.0, 2.0), Vec3(0.0, 0.0, -1.0));
        assert!(scene.closest_hit(ray).is_none());

        scene.object_mut("Target").expect("exists").position = Vec3(5.0, 0.0, 0.0);
        scene.update_transforms().expect("invertible");
        let (_, hit) = scene.closest_hit(ray).expect("should hit after move");
        assert!((hit.position - Vec3(5.0, 0.0, 0.0)).length() < 1e-5);
    }
}
