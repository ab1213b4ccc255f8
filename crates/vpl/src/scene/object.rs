//! Renderable objects. Unlike the rendering backend, the simulation only cares
//! about an object's placement, its albedo and which primitive it intersects as;
//! mesh data stays with the backend and is referred to by handle.

use crate::{
    error::SceneError,
    geometry::{ObjectTransform, Ray, RayHit, Shape, Vec3},
};

/// Index into the rendering backend's mesh arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,

    pub position: Vec3,
    /// (pitch, yaw, roll) in degrees
    pub rotation: Vec3,
    pub scale: Vec3,

    pub mesh: MeshId,
    pub albedo: Vec3,
    pub shape: Shape,

    // derived from position / rotation / scale by `update_transform`
    transform: ObjectTransform,
}

impl Object {
    pub(crate) fn new(desc: ObjectDesc, shape: Shape) -> Result<Object, SceneError> {
        let mut object = Object {
            name: desc.name,
            position: desc.position,
            rotation: desc.rotation,
            scale: desc.scale,
            mesh: desc.mesh,
            albedo: desc.albedo,
            shape,
            transform: ObjectTransform::default(),
        };
        object.update_transform()?;
        Ok(object)
    }

    /// Recomputes model and normal matrices from the transform fields. Must run
    /// before any intersection query in a frame that may have moved the object.
    pub fn update_transform(&mut self) -> Result<(), SceneError> {
        self.transform = ObjectTransform::from_trs(self.position, self.rotation, self.scale)
            .ok_or_else(|| SceneError::SingularTransform(self.name.clone()))?;
        Ok(())
    }

    pub fn transform(&self) -> &ObjectTransform {
        &self.transform
    }

    pub fn intersect(&self, ray: Ray) -> Option<RayHit> {
        self.shape.intersect(ray, &self.transform)
    }
}

/// Unvalidated object description, turned into an `Object` by `SceneBuilder::build`
#[derive(Debug, Clone)]
pub struct ObjectDesc {
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub mesh: MeshId,
    pub albedo: Vec3,
    pub shape: Option<Shape>,
}

impl ObjectDesc {
    pub fn new(name: impl Into<String>, shape: Shape, mesh: MeshId) -> Self {
        ObjectDesc {
            name: name.into(),
            position: Vec3::zero(),
            rotation: Vec3::zero(),
            scale: Vec3::splat(1.0),
            mesh,
            albedo: Vec3::splat(1.0),
            shape: Some(shape),
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation_degrees: Vec3) -> Self {
        self.rotation = rotation_degrees;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn albedo(mut self, albedo: Vec3) -> Self {
        self.albedo = albedo;
        self
    }
}
