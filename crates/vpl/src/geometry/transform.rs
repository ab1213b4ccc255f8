use super::{Matrix4x4, Vec3};

/// A model matrix paired with its inverse, so rays can be taken into local
/// space without inverting once per intersection test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub forward: Matrix4x4,
    pub inverse: Matrix4x4,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Transform { forward: Matrix4x4::identity(), inverse: Matrix4x4::identity() }
    }

    pub fn translate(direction: Vec3) -> Self {
        Transform {
            forward: Matrix4x4::translation(direction),
            inverse: Matrix4x4::translation(-direction),
        }
    }

    /// Fails for singular matrices
    pub fn try_from_matrix(forward: Matrix4x4) -> Option<Self> {
        let inverse = forward.invert()?;
        Some(Transform { forward, inverse })
    }

    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.forward.apply_point(point)
    }

    pub fn apply_vector(&self, vector: Vec3) -> Vec3 {
        self.forward.apply_vector(vector)
    }

    pub fn apply_inverse_point(&self, point: Vec3) -> Vec3 {
        self.inverse.apply_point(point)
    }

    pub fn apply_inverse_vector(&self, vector: Vec3) -> Vec3 {
        self.inverse.apply_vector(vector)
    }
}

/// Everything the intersection routines need to know about an object's
/// placement: model matrix (plus inverse) and the normal matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObjectTransform {
    pub model: Transform,
    // inverse-transpose of the linear (rotate * scale) part
    pub normal: Matrix4x4,
}

impl ObjectTransform {
    /// Builds the transform for `translate * rotate * scale`. Rotation is
    /// (pitch, yaw, roll) in degrees.
    pub fn from_trs(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Option<Self> {
        let linear = Matrix4x4::rotation_yaw_pitch_roll(rotation_degrees.to_radians())
            * Matrix4x4::scale(scale);
        let normal = linear.invert()?.transposed();
        let model = Transform::try_from_matrix(Matrix4x4::translation(position) * linear)?;

        Some(ObjectTransform { model, normal })
    }

    pub fn transform_normal(&self, local_normal: Vec3) -> Vec3 {
        self.normal.apply_vector(local_normal).unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_translate_inverse() {
        let t = Transform::translate(Vec3(1.0, 2.0, 3.0));
        let p = Vec3(4.0, 5.0, 6.0);
        let back = t.apply_inverse_point(t.apply_point(p));
        assert!((back - p).length() < EPSILON);
    }

    #[test]
    fn test_normal_matrix_under_non_uniform_scale() {
        // a plane tilted 45 degrees, squashed along y: the normal must stay
        // perpendicular to the transformed surface, not follow the squash
        let t = ObjectTransform::from_trs(
            Vec3::zero(),
            Vec3(0.0, 0.0, 45.0),
            Vec3(1.0, 0.25, 1.0),
        ).expect("invertible");

        let tangent = t.model.apply_vector(Vec3(1.0, 0.0, 0.0));
        let normal = t.transform_normal(Vec3(0.0, 1.0, 0.0));
        assert!(Vec3::dot(tangent, normal).abs() < EPSILON);
        assert!((normal.length() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_scale_is_rejected() {
        assert!(ObjectTransform::from_trs(Vec3::zero(), Vec3::zero(), Vec3(1.0, 1.0, 0.0)).is_none());
    }
}
