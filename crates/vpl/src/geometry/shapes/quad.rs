use crate::geometry::{ObjectTransform, Ray, RayHit, Vec3};

use super::to_local;

const HALF_EXTENT: f32 = 0.5;

pub fn intersect_quad(ray: Ray, transform: &ObjectTransform) -> Option<RayHit> {
    let local_ray = to_local(ray, transform);

    // parallel to the plane
    if local_ray.direction.z() == 0.0 {
        return None;
    }

    let t = -local_ray.origin.z() / local_ray.direction.z();
    if t <= 0.0 {
        return None;
    }

    let local_hit = local_ray.at(t);
    if local_hit.x().abs() > HALF_EXTENT || local_hit.y().abs() > HALF_EXTENT {
        return None;
    }

    Some(RayHit {
        position: transform.model.apply_point(local_hit),
        normal: transform.transform_normal(Vec3(0.0, 0.0, 1.0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn identity() -> ObjectTransform {
        ObjectTransform::from_trs(Vec3::zero(), Vec3::zero(), Vec3::splat(1.0)).unwrap()
    }

    #[test]
    fn test_head_on_hit() {
        let ray = Ray::new(Vec3(0.1, -0.2, 3.0), Vec3(0.0, 0.0, -1.0));
        let hit = intersect_quad(ray, &identity()).expect("should hit");
        assert!((hit.position - Vec3(0.1, -0.2, 0.0)).length() < EPSILON);
        assert!((hit.normal - Vec3(0.0, 0.0, 1.0)).length() < EPSILON);
    }

    #[test]
    fn test_hit_from_behind_keeps_geometric_normal() {
        let ray = Ray::new(Vec3(0.0, 0.0, -2.0), Vec3(0.0, 0.0, 5.0));
        let hit = intersect_quad(ray, &identity()).expect("quads are two-sided");
        assert!((hit.normal - Vec3(0.0, 0.0, 1.0)).length() < EPSILON);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Vec3(0.0, 0.0, 0.0), Vec3(1.0, 0.0, 0.0));
        assert!(intersect_quad(ray, &identity()).is_none());
    }

    #[test]
    fn test_plane_behind_origin_misses() {
        let ray = Ray::new(Vec3(0.0, 0.0, 1.0), Vec3(0.0, 0.0, 1.0));
        assert!(intersect_quad(ray, &identity()).is_none());
    }

    #[test]
    fn test_outside_extent_misses() {
        let ray = Ray::new(Vec3(0.6, 0.0, 1.0), Vec3(0.0, 0.0, -1.0));
        assert!(intersect_quad(ray, &identity()).is_none());
    }

    #[test]
    fn test_transformed_quad() {
        // floor-like quad: 4x4, rotated to face +y, lifted to y = 1
        let transform = ObjectTransform::from_trs(
            Vec3(0.0, 1.0, 0.0),
            Vec3(-90.0, 0.0, 0.0),
            Vec3(4.0, 4.0, 1.0),
        ).unwrap();

        let ray = Ray::new(Vec3(1.5, 5.0, -1.5), Vec3(0.0, -2.0, 0.0));
        let hit = intersect_quad(ray, &transform).expect("should hit scaled quad");
        assert!((hit.position - Vec3(1.5, 1.0, -1.5)).length() < EPSILON);
        assert!((hit.normal - Vec3(0.0, 1.0, 0.0)).length() < EPSILON);

        let outside = Ray::new(Vec3(2.5, 5.0, 0.0), Vec3(0.0, -1.0, 0.0));
        assert!(intersect_quad(outside, &transform).is_none());
    }
}
