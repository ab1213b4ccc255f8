use crate::geometry::{ObjectTransform, Ray, RayHit, Vec3};

use super::to_local;

const HALF_EXTENT: f32 = 0.5;

/// How close (in local units) a hit coordinate must be to ±0.5 to count as
/// lying on that face.
pub const BOX_FACE_EPSILON: f32 = 1e-4;

// narrows [t_min, t_max] by one axis slab, None if the interval becomes empty
fn clip_slab(origin: f32, direction: f32, t_min: f32, t_max: f32) -> Option<(f32, f32)> {
    if direction == 0.0 {
        // parallel: either always inside the slab or never
        return if origin < -HALF_EXTENT || origin > HALF_EXTENT {
            None
        } else {
            Some((t_min, t_max))
        };
    }

    let inv_d = 1.0 / direction;
    let t0 = (-HALF_EXTENT - origin) * inv_d;
    let t1 = (HALF_EXTENT - origin) * inv_d;
    let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

    let t_min = f32::max(near, t_min);
    let t_max = f32::min(far, t_max);

    if t_min > t_max {
        None
    } else {
        Some((t_min, t_max))
    }
}

// First axis (x, y, z order) whose coordinate sits on a face. Edge and
// corner hits resolve to the lowest axis index.
fn face_normal(local_hit: Vec3) -> Option<Vec3> {
    (0..3)
        .find(|&axis| (local_hit[axis].abs() - HALF_EXTENT).abs() < BOX_FACE_EPSILON)
        .map(|axis| {
            let sign = local_hit[axis].signum();
            match axis {
                0 => Vec3(sign, 0.0, 0.0),
                1 => Vec3(0.0, sign, 0.0),
                _ => Vec3(0.0, 0.0, sign),
            }
        })
}

pub fn intersect_box(ray: Ray, transform: &ObjectTransform) -> Option<RayHit> {
    let local_ray = to_local(ray, transform);

    // t_min starts at 0 so hits behind the origin are rejected, which also
    // means a ray starting inside the box never reports a hit
    let mut t_min = 0.0;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        (t_min, t_max) = clip_slab(local_ray.origin[axis], local_ray.direction[axis], t_min, t_max)?;
    }

    if !(t_min < t_max && t_min > 0.0) {
        return None;
    }

    let local_hit = local_ray.at(t_min);
    let local_normal = face_normal(local_hit)?;

    Some(RayHit {
        position: transform.model.apply_point(local_hit),
        normal: transform.transform_normal(local_normal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_vec3_approx_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPSILON, "Expected {a} ≈ {b}");
    }

    fn identity() -> ObjectTransform {
        ObjectTransform::from_trs(Vec3::zero(), Vec3::zero(), Vec3::splat(1.0)).unwrap()
    }

    #[test]
    fn test_front_face_normal() {
        let ray = Ray::new(Vec3(0.0, 0.0, 5.0), Vec3(0.0, 0.0, -1.0));
        let hit = intersect_box(ray, &identity()).expect("should hit");
        assert_vec3_approx_eq(hit.position, Vec3(0.0, 0.0, 0.5));
        assert_vec3_approx_eq(hit.normal, Vec3(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_each_face() {
        let cases = [
            (Vec3(3.0, 0.1, 0.2), Vec3(-1.0, 0.0, 0.0), Vec3(1.0, 0.0, 0.0)),
            (Vec3(-3.0, 0.1, 0.2), Vec3(1.0, 0.0, 0.0), Vec3(-1.0, 0.0, 0.0)),
            (Vec3(0.1, 3.0, 0.2), Vec3(0.0, -1.0, 0.0), Vec3(0.0, 1.0, 0.0)),
            (Vec3(0.1, -3.0, 0.2), Vec3(0.0, 1.0, 0.0), Vec3(0.0, -1.0, 0.0)),
            (Vec3(0.1, 0.2, -3.0), Vec3(0.0, 0.0, 1.0), Vec3(0.0, 0.0, -1.0)),
        ];

        for (origin, direction, expected_normal) in cases {
            let hit = intersect_box(Ray::new(origin, direction), &identity())
                .unwrap_or_else(|| panic!("ray from {origin} should hit"));
            assert_vec3_approx_eq(hit.normal, expected_normal);
        }
    }

    #[test]
    fn test_corner_hit_prefers_x_axis() {
        // aimed exactly at the (+x, +y, +z) corner
        let ray = Ray::new(Vec3(1.5, 1.5, 1.5), Vec3(-1.0, -1.0, -1.0));
        let hit = intersect_box(ray, &identity()).expect("should hit corner");
        assert_vec3_approx_eq(hit.normal, Vec3(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_edge_hit_prefers_lower_axis() {
        // +y/+z edge, x in the middle
        let ray = Ray::new(Vec3(0.0, 1.5, 1.5), Vec3(0.0, -1.0, -1.0));
        let hit = intersect_box(ray, &identity()).expect("should hit edge");
        assert_vec3_approx_eq(hit.normal, Vec3(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_parallel_outside_slab_misses() {
        let ray = Ray::new(Vec3(0.0, 0.7, 5.0), Vec3(0.0, 0.0, -1.0));
        assert!(intersect_box(ray, &identity()).is_none());
    }

    #[test]
    fn test_box_behind_origin_misses() {
        let ray = Ray::new(Vec3(0.0, 0.0, 5.0), Vec3(0.0, 0.0, 1.0));
        assert!(intersect_box(ray, &identity()).is_none());
    }

    #[test]
    fn test_origin_inside_misses() {
        let ray = Ray::new(Vec3(0.0, 0.0, 0.0), Vec3(0.3, 0.2, 1.0));
        assert!(intersect_box(ray, &identity()).is_none());
    }

    #[test]
    fn test_rotated_scaled_box() {
        // stretched along local x, yawed so local +x points down world -z
        let transform = ObjectTransform::from_trs(
            Vec3(0.0, 0.0, 10.0),
            Vec3(0.0, 90.0, 0.0),
            Vec3(2.0, 1.0, 1.0),
        ).unwrap();

        let ray = Ray::new(Vec3(0.0, 0.0, 0.0), Vec3(0.0, 0.0, 1.0));
        let hit = intersect_box(ray, &transform).expect("should hit");
        assert_vec3_approx_eq(hit.position, Vec3(0.0, 0.0, 9.0));
        assert_vec3_approx_eq(hit.normal, Vec3(0.0, 0.0, -1.0));
    }
}
