use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use vpl::InputState;

/// Accumulates winit events into the simulation's per-frame `InputState`
#[derive(Default)]
pub(crate) struct InputTracker {
    pub state: InputState,
    last_cursor: Option<(f64, f64)>,
}

impl InputTracker {
    /// `ui_wants_mouse` suppresses mouse-look while the cursor is over the GUI
    pub fn handle_window_event(&mut self, event: &WindowEvent, ui_wants_mouse: bool, ui_wants_keyboard: bool) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                self.handle_key(code, event.state == ElementState::Pressed, ui_wants_keyboard);
            }

            WindowEvent::MouseInput { state, button: MouseButton::Right, .. } => {
                let pressed = *state == ElementState::Pressed;
                // releases always go through so look can't get stuck on
                if !pressed || !ui_wants_mouse {
                    self.state.look_held = pressed;
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                if let Some((x, y)) = self.last_cursor {
                    self.state.mouse_delta.0 += (current.0 - x) as f32;
                    self.state.mouse_delta.1 += (current.1 - y) as f32;
                }
                self.last_cursor = Some(current);
            }

            WindowEvent::CursorLeft { .. } => self.last_cursor = None,

            WindowEvent::Focused(false) => {
                // keys released while unfocused never arrive
                self.state = InputState::default();
                self.last_cursor = None;
            }

            _ => (),
        }
    }

    /// Presses are ignored while the GUI has keyboard focus, releases are not,
    /// so a key let go over a text field can't keep the camera moving
    pub fn handle_key(&mut self, code: KeyCode, pressed: bool, ui_wants_keyboard: bool) {
        if pressed && ui_wants_keyboard {
            return;
        }
        match code {
            KeyCode::KeyW => self.state.forward = pressed,
            KeyCode::KeyS => self.state.back = pressed,
            KeyCode::KeyA => self.state.left = pressed,
            KeyCode::KeyD => self.state.right = pressed,
            KeyCode::KeyE => self.state.up = pressed,
            KeyCode::KeyQ => self.state.down = pressed,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.state.fast = pressed,
            _ => (),
        }
    }

    pub fn end_frame(&mut self) {
        self.state.end_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_reaches_state_while_gui_has_focus() {
        let mut tracker = InputTracker::default();
        tracker.handle_key(KeyCode::KeyW, true, false);
        assert!(tracker.state.forward);

        // W let go after clicking into a text field
        tracker.handle_key(KeyCode::KeyW, false, true);
        assert!(!tracker.state.forward);
    }

    #[test]
    fn test_press_ignored_while_gui_has_focus() {
        let mut tracker = InputTracker::default();
        tracker.handle_key(KeyCode::KeyS, true, true);
        tracker.handle_key(KeyCode::ShiftLeft, true, true);
        assert!(!tracker.state.back);
        assert!(!tracker.state.fast);

        tracker.handle_key(KeyCode::KeyS, true, false);
        assert!(tracker.state.back);
    }
}
