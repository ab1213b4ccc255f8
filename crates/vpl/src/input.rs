/// Snapshot of the user's input for one frame, filled in by the platform layer
/// before the simulation step runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// mouse-look is only active while this is held
    pub look_held: bool,
    /// cursor movement since the previous frame, in pixels
    pub mouse_delta: (f32, f32),

    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// speed multiplier (shift)
    pub fast: bool,

    /// seconds since the previous frame
    pub delta_time: f32,
}

impl InputState {
    /// Clears per-frame accumulators, keeping held-key state
    pub fn end_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
    }
}
