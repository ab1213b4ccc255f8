use std::ops::{Index, Mul};

use super::Vec3;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4x4 {
    // row-major, column vectors (p' = M * p)
    pub data: [[f32; 4]; 4],
}

impl Index<usize> for Matrix4x4 {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index / 4][index % 4]
    }
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4::identity()
    }
}

impl Matrix4x4 {
    pub fn identity() -> Self {
        Matrix4x4 {
            data: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub fn create(a11: f32, a12: f32, a13: f32, a14: f32,
                  a21: f32, a22: f32, a23: f32, a24: f32,
                  a31: f32, a32: f32, a33: f32, a34: f32,
                  a41: f32, a42: f32, a43: f32, a44: f32) -> Self {
        Matrix4x4 {
            data: [[a11, a12, a13, a14],
                   [a21, a22, a23, a24],
                   [a31, a32, a33, a34],
                   [a41, a42, a43, a44]]
        }
    }

    /// Gauss-Jordan elimination with partial pivoting. Returns `None` for
    /// singular matrices (e.g. an object scaled to zero along some axis).
    pub fn invert(&self) -> Option<Self> {
        let mut a = self.data;
        let mut inv = Matrix4x4::identity().data;

        for col in 0..4 {
            let pivot = (col..4)
                .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
                .unwrap_or(col);

            if a[pivot][col].abs() < f32::EPSILON * 1e-3 {
                return None;
            }

            a.swap(col, pivot);
            inv.swap(col, pivot);

            let scale = 1.0 / a[col][col];
            for k in 0..4 {
                a[col][k] *= scale;
                inv[col][k] *= scale;
            }

            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    a[row][k] -= factor * a[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }

        Some(Matrix4x4 { data: inv })
    }

    pub fn matmul(a: Matrix4x4, b: Matrix4x4) -> Self {
        let mut m = Matrix4x4::identity();
        for i in 0..4 {
            for j in 0..4 {
                let mut dot = 0.0;
                for k in 0..4 {
                    dot += a.data[i][k] * b.data[k][j]
                }
                m.data[i][j] = dot;
            }
        }
        m
    }

    pub fn transpose(&mut self) {
        for i in 0..4 {
            for j in 0..i {
                let tmp = self.data[i][j];
                self.data[i][j] = self.data[j][i];
                self.data[j][i] = tmp;
            }
        }
    }

    pub fn transposed(&self) -> Matrix4x4 {
        let mut me = *self;
        me.transpose();
        me
    }

    pub fn translation(direction: Vec3) -> Matrix4x4 {
        let mut me = Self::identity();
        me.data[0][3] = direction.0;
        me.data[1][3] = direction.1;
        me.data[2][3] = direction.2;

        me
    }

    pub fn scale(scale: Vec3) -> Matrix4x4 {
        let mut me = Self::identity();
        me.data[0][0] = scale.0;
        me.data[1][1] = scale.1;
        me.data[2][2] = scale.2;

        me
    }

    // angles in radians
    #[rustfmt::skip]
    pub fn rotation_x(theta: f32) -> Matrix4x4 {
        let (s, c) = theta.sin_cos();
        Matrix4x4::create(
            1.0, 0.0, 0.0, 0.0,
            0.0,   c,  -s, 0.0,
            0.0,   s,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_y(theta: f32) -> Matrix4x4 {
        let (s, c) = theta.sin_cos();
        Matrix4x4::create(
              c, 0.0,   s, 0.0,
            0.0, 1.0, 0.0, 0.0,
             -s, 0.0,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_z(theta: f32) -> Matrix4x4 {
        let (s, c) = theta.sin_cos();
        Matrix4x4::create(
              c,  -s, 0.0, 0.0,
              s,   c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Yaw-pitch-roll rotation: roll about z is applied first, then pitch about x,
    /// then yaw about y. `angles` is (pitch, yaw, roll) in radians.
    pub fn rotation_yaw_pitch_roll(angles: Vec3) -> Matrix4x4 {
        let pitch = Matrix4x4::rotation_x(angles.0);
        let yaw = Matrix4x4::rotation_y(angles.1);
        let roll = Matrix4x4::rotation_z(angles.2);
        yaw * pitch * roll
    }

    /// Left-handed view matrix (camera looks down +z in view space)
    pub fn look_at_lh(eye: Vec3, target: Vec3, up: Vec3) -> Matrix4x4 {
        let forward = (target - eye).unit();
        let right = Vec3::cross(up, forward).unit();
        let up = Vec3::cross(forward, right);

        #[rustfmt::skip]
        let m = Matrix4x4::create(
            right.0,   right.1,   right.2,   -Vec3::dot(right, eye),
            up.0,      up.1,      up.2,      -Vec3::dot(up, eye),
            forward.0, forward.1, forward.2, -Vec3::dot(forward, eye),
            0.0,       0.0,       0.0,       1.0,
        );
        m
    }

    /// Left-handed perspective projection mapping view depth [near, far] to [0, 1]
    pub fn perspective_fov_lh(yfov: f32, aspect: f32, near: f32, far: f32) -> Matrix4x4 {
        let y_scale = 1.0 / f32::tan(yfov / 2.0);
        let x_scale = y_scale / aspect;
        let range = far / (far - near);

        #[rustfmt::skip]
        let m = Matrix4x4::create(
            x_scale, 0.0,     0.0,   0.0,
            0.0,     y_scale, 0.0,   0.0,
            0.0,     0.0,     range, -range * near,
            0.0,     0.0,     1.0,   0.0,
        );
        m
    }

    /// Column-major flattening, the layout WGSL `mat4x4<f32>` expects
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.transposed().data
    }
}

impl Mul for Matrix4x4 {
    type Output = Matrix4x4;

    fn mul(self, rhs: Matrix4x4) -> Self::Output {
        Matrix4x4::matmul(self, rhs)
    }
}

impl Matrix4x4 {
    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        let a = self.data[0][0] * p.0
            + self.data[0][1] * p.1
            + self.data[0][2] * p.2
            + self.data[0][3];
        let b = self.data[1][0] * p.0
            + self.data[1][1] * p.1
            + self.data[1][2] * p.2
            + self.data[1][3];
        let c = self.data[2][0] * p.0
            + self.data[2][1] * p.1
            + self.data[2][2] * p.2
            + self.data[2][3];
        let d = self.data[3][0] * p.0
            + self.data[3][1] * p.1
            + self.data[3][2] * p.2
            + self.data[3][3];
        Vec3(a / d, b / d, c / d)
    }

    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        let a = self.data[0][0] * v.0 + self.data[0][1] * v.1 + self.data[0][2] * v.2;
        let b = self.data[1][0] * v.0 + self.data[1][1] * v.1 + self.data[1][2] * v.2;
        let c = self.data[2][0] * v.0 + self.data[2][1] * v.1 + self.data[2][2] * v.2;
        Vec3(a, b, c)
    }
}

// assumes row major
impl From<[[f32; 4]; 4]> for Matrix4x4 {
    fn from(value: [[f32; 4]; 4]) -> Self {
        Self { data: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_matrix_approx_eq(a: &Matrix4x4, b: &Matrix4x4) {
        for i in 0..16 {
            assert!(
                (a[i] - b[i]).abs() < EPSILON,
                "element {i} differs: {} vs {}",
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn test_invert_round_trip() {
        let m = Matrix4x4::translation(Vec3(1.0, -2.0, 3.0))
            * Matrix4x4::rotation_yaw_pitch_roll(Vec3(0.3, 1.1, -0.4))
            * Matrix4x4::scale(Vec3(2.0, 0.5, 3.0));
        let inv = m.invert().expect("matrix should be invertible");
        assert_matrix_approx_eq(&(m * inv), &Matrix4x4::identity());
        assert_matrix_approx_eq(&(inv * m), &Matrix4x4::identity());
    }

    #[test]
    fn test_invert_singular() {
        let m = Matrix4x4::scale(Vec3(1.0, 0.0, 1.0));
        assert!(m.invert().is_none());
    }

    #[test]
    fn test_yaw_rotates_z_towards_x() {
        let m = Matrix4x4::rotation_yaw_pitch_roll(Vec3(0.0, 90f32.to_radians(), 0.0));
        let v = m.apply_vector(Vec3(0.0, 0.0, 1.0));
        assert!((v - Vec3(1.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_roll_applied_before_yaw() {
        // roll 90 takes x to y; yaw leaves y alone
        let m = Matrix4x4::rotation_yaw_pitch_roll(Vec3(0.0, 90f32.to_radians(), 90f32.to_radians()));
        let v = m.apply_vector(Vec3(1.0, 0.0, 0.0));
        assert!((v - Vec3(0.0, 1.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_look_at_maps_target_onto_positive_z() {
        let eye = Vec3(1.0, 2.0, 3.0);
        let target = Vec3(1.0, 2.0, 10.0);
        let view = Matrix4x4::look_at_lh(eye, target, Vec3(0.0, 1.0, 0.0));
        let p = view.apply_point(target);
        assert!((p - Vec3(0.0, 0.0, 7.0)).length() < EPSILON);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = Matrix4x4::perspective_fov_lh(1.0, 1.5, 0.1, 100.0);
        let near = proj.apply_point(Vec3(0.0, 0.0, 0.1));
        let far = proj.apply_point(Vec3(0.0, 0.0, 100.0));
        assert!(near.z().abs() < EPSILON);
        assert!((far.z() - 1.0).abs() < EPSILON);
    }
}
