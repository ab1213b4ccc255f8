use crate::{geometry::{Matrix4x4, Vec3}, input::InputState};

const MOUSE_SENSITIVITY: f32 = 0.1; // degrees per pixel
const MOVE_SPEED: f32 = 1.5; // units per second
const FAST_MULTIPLIER: f32 = 4.0;
const PITCH_LIMIT: f32 = 89.0;

/// Free-flying first person camera. Angles in degrees; yaw 0 looks down +z.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub yfov: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            eye: Vec3(0.0, 1.0, -3.5),
            yaw: 0.0,
            pitch: 0.0,
            yfov: 60.0,
            near_clip: 0.01,
            far_clip: 100.0,
        }
    }
}

impl Camera {
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        Vec3(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        Vec3(cos_yaw, 0.0, -sin_yaw)
    }

    pub fn target(&self) -> Vec3 {
        self.eye + self.forward()
    }

    pub fn view_matrix(&self) -> Matrix4x4 {
        Matrix4x4::look_at_lh(self.eye, self.target(), Vec3(0.0, 1.0, 0.0))
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Matrix4x4 {
        Matrix4x4::perspective_fov_lh(self.yfov.to_radians(), aspect_ratio, self.near_clip, self.far_clip)
    }

    /// Mouse-look while the look trigger is held, then WASD (+QE) movement
    /// relative to the new orientation
    pub fn apply_input(&mut self, input: &InputState) {
        if input.look_held {
            let (dx, dy) = input.mouse_delta;
            self.yaw += dx * MOUSE_SENSITIVITY;
            self.pitch -= dy * MOUSE_SENSITIVITY;
        }
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let axis = |positive: bool, negative: bool| (positive as i32 - negative as i32) as f32;
        let forward = self.forward() * axis(input.forward, input.back);
        let right = self.right() * axis(input.right, input.left);
        let up = Vec3(0.0, 1.0, 0.0) * axis(input.up, input.down);

        let direction = forward + right + up;
        if direction.near_zero() {
            return;
        }

        let speed = if input.fast { MOVE_SPEED * FAST_MULTIPLIER } else { MOVE_SPEED };
        self.eye += direction.unit() * speed * input.delta_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::default();
        let input = InputState {
            look_held: true,
            mouse_delta: (0.0, -10_000.0),
            ..Default::default()
        };
        camera.apply_input(&input);
        assert_eq!(camera.pitch, 89.0);

        let input = InputState { mouse_delta: (0.0, 10_000.0), ..input };
        camera.apply_input(&input);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn test_mouse_ignored_without_trigger() {
        let mut camera = Camera::default();
        let input = InputState { mouse_delta: (50.0, 50.0), ..Default::default() };
        camera.apply_input(&input);
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_move_forward_and_fast() {
        let mut camera = Camera { yaw: 90.0, ..Default::default() };
        let start = camera.eye;
        let input = InputState { forward: true, delta_time: 1.0, ..Default::default() };
        camera.apply_input(&input);
        assert!((camera.eye - (start + Vec3(MOVE_SPEED, 0.0, 0.0))).length() < EPSILON);

        let start = camera.eye;
        let input = InputState { right: true, fast: true, delta_time: 0.5, ..Default::default() };
        camera.apply_input(&input);
        let expected = start + Vec3(0.0, 0.0, -MOVE_SPEED * FAST_MULTIPLIER * 0.5);
        assert!((camera.eye - expected).length() < EPSILON);
    }

    #[test]
    fn test_target_is_one_unit_ahead() {
        let camera = Camera { pitch: 30.0, yaw: -45.0, ..Default::default() };
        assert!(((camera.target() - camera.eye).length() - 1.0).abs() < EPSILON);
    }
}
