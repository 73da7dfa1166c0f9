use std::collections::HashSet;

use glam::{Vec2, Vec3};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::push_constant::PushConstant;

/// Units per second that the arrow keys move `pos`.
pub const MOVE_SPEED: f32 = 1.0;

/// Tracks input state for keyboard and mouse.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !self.keys_down.contains(&key) {
                                self.keys_pressed.insert(key);
                            }
                            self.keys_down.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.mouse_buttons_down.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }
            _ => {}
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Direction requested by the arrow keys (x, y) and PageUp/PageDown (z).
    pub fn movement(&self) -> Vec3 {
        let axis = |neg: KeyCode, pos: KeyCode| {
            self.key_down(pos) as i32 as f32 - self.key_down(neg) as i32 as f32
        };
        Vec3::new(
            axis(KeyCode::ArrowLeft, KeyCode::ArrowRight),
            axis(KeyCode::ArrowDown, KeyCode::ArrowUp),
            axis(KeyCode::PageDown, KeyCode::PageUp),
        )
    }

    /// Writes the left button state into the record. Runs every frame, paused or not.
    pub fn apply_buttons(&self, pc: &mut PushConstant) {
        pc.mouse_pressed = self.mouse_down(MouseButton::Left) as u32;
    }

    /// Writes cursor position and arrow-key movement into the record.
    pub fn apply_motion(&self, pc: &mut PushConstant, size: Vec2, dt: f32) {
        pc.mouse = mouse_ndc(self.mouse_position, size).to_array();
        let pos = Vec3::from(pc.pos) + self.movement() * MOVE_SPEED * dt;
        pc.pos = pos.to_array();
    }
}

/// Window pixels to `[-1, 1]`, y up.
pub fn mouse_ndc(position: Vec2, size: Vec2) -> Vec2 {
    let n = (position / size - 0.5) * 2.0;
    Vec2::new(n.x, -n.y)
}
