//! Pointer input tracking for the viewer window.
//!
//! Collapses raw winit events into the per-frame queries the frame loop
//! consumes: where the pointer is, whether it moved, which clicks landed,
//! and how far a left-button drag travelled. A mouse click fires
//! on the left-button release; touch input maps onto the same surface,
//! with a touch start acting as a left press that clicks at the contact
//! point and touch movement feeding the same hover path as the mouse.
//!
//! Positions stay in physical pixels. The hit-testing layer converts to
//! normalized device coordinates against the current surface size.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event::{Touch, TouchPhase};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Left, // Default for other buttons
        }
    }
}

/// Pointer state tracking for mouse and touch.
///
/// Tracks both instantaneous events (pressed/released this frame) and
/// continuous state (currently held).
#[derive(Debug, Default)]
pub struct Input {
    held: HashSet<MouseButton>,
    pressed: HashSet<MouseButton>,
    released: HashSet<MouseButton>,

    pointer_position: Vec2,
    pointer_delta: Vec2,
    pointer_moved: bool,
    clicks: Vec<Vec2>,

    scroll_delta: f32,
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    /// Check if a mouse button is currently held down.
    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.held.contains(&button)
    }

    /// Check if a mouse button was released this frame.
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.released.contains(&button)
    }

    /// Current pointer position in physical pixels.
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Where the pointer moved to this frame, if it moved at all.
    pub fn pointer_moved(&self) -> Option<Vec2> {
        self.pointer_moved.then_some(self.pointer_position)
    }

    /// Where clicks landed this frame, in event order. A mouse click is
    /// the left-button release; a touch clicks where it starts. Kept as a
    /// list so two releases inside one frame stay two clicks.
    pub fn clicks(&self) -> &[Vec2] {
        &self.clicks
    }

    /// Accumulated pointer movement this frame while the left button is
    /// held, in pixels. Zero otherwise.
    pub fn drag_delta(&self) -> Vec2 {
        if self.held.contains(&MouseButton::Left) {
            self.pointer_delta
        } else {
            Vec2::ZERO
        }
    }

    /// Accumulated scroll wheel delta this frame.
    ///
    /// Positive values indicate scrolling up/forward.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Called at the start of each frame to clear per-frame state.
    pub(crate) fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
        self.pointer_delta = Vec2::ZERO;
        self.pointer_moved = false;
        self.clicks.clear();
        self.scroll_delta = 0.0;
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_button(*state, MouseButton::from(*button));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }
            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => {
                self.handle_touch(*phase, Vec2::new(location.x as f32, location.y as f32));
            }
            _ => {}
        }
    }

    fn handle_button(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => {
                self.pressed.insert(button);
                self.held.insert(button);
            }
            ElementState::Released => {
                self.held.remove(&button);
                self.released.insert(button);
                if button == MouseButton::Left {
                    self.clicks.push(self.pointer_position);
                }
            }
        }
    }

    fn handle_pointer_moved(&mut self, position: Vec2) {
        self.pointer_delta += position - self.pointer_position;
        self.pointer_position = position;
        self.pointer_moved = true;
    }

    fn handle_touch(&mut self, phase: TouchPhase, position: Vec2) {
        match phase {
            TouchPhase::Started => {
                // The pointer jumps to the contact point without counting
                // as drag movement, and the tap clicks right there.
                self.pointer_position = position;
                self.pressed.insert(MouseButton::Left);
                self.held.insert(MouseButton::Left);
                self.clicks.push(position);
            }
            TouchPhase::Moved => {
                self.handle_pointer_moved(position);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                // Lifting the finger is not a second click.
                self.held.remove(&MouseButton::Left);
                self.released.insert(MouseButton::Left);
            }
        }
    }
}
