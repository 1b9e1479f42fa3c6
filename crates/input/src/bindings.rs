use crate::action::Action;
use serde::{Deserialize, Serialize};

/// Keys the viewer reacts to. Hosts translate their own key codes into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    PageUp,
    PageDown,
    Shift,
    Escape,
}

/// Tunables for mapping raw input to actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Speed applied on key press, in m/s. 44.7 m/s is roughly 100 mph.
    pub speed: f32,
    /// Degrees of rotation per pixel of mouse drag.
    pub mouse_sensitivity: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            speed: 44.7,
            mouse_sensitivity: 0.2,
        }
    }
}

/// Maps key presses and releases to actions.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    config: InputConfig,
}

impl KeyBindings {
    pub fn new(config: InputConfig) -> Self {
        Self { config }
    }

    /// Translate a key transition into an action, if the key is bound.
    pub fn map(&self, key: Key, pressed: bool) -> Option<Action> {
        if pressed {
            self.press(key)
        } else {
            self.release(key)
        }
    }

    fn press(&self, key: Key) -> Option<Action> {
        let speed = self.config.speed;
        let action = match key {
            Key::D => Action::SetSideSpeed(speed),
            Key::A => Action::SetSideSpeed(-speed),
            Key::W => Action::SetForwardSpeed(speed),
            Key::S => Action::SetForwardSpeed(-speed),
            Key::PageUp => Action::SetVerticalSpeed(speed),
            Key::PageDown => Action::SetVerticalSpeed(-speed),
            Key::Shift => Action::SetViewCenterFixed(true),
            Key::Escape => Action::Quit,
        };
        Some(action)
    }

    fn release(&self, key: Key) -> Option<Action> {
        match key {
            Key::D | Key::A => Some(Action::SetSideSpeed(0.0)),
            Key::W | Key::S => Some(Action::SetForwardSpeed(0.0)),
            Key::PageUp | Key::PageDown => Some(Action::SetVerticalSpeed(0.0)),
            Key::Shift => Some(Action::SetViewCenterFixed(false)),
            Key::Escape => None,
        }
    }
}

/// Tracks a left-button drag and turns cursor motion into pan/tilt deltas.
#[derive(Debug, Clone, Default)]
pub struct MouseDrag {
    sensitivity: f32,
    pressed: bool,
    prev: (f64, f64),
}

impl MouseDrag {
    pub fn new(config: InputConfig) -> Self {
        Self {
            sensitivity: config.mouse_sensitivity,
            pressed: false,
            prev: (0.0, 0.0),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.pressed
    }

    pub fn press(&mut self, x: f64, y: f64) {
        self.pressed = true;
        self.prev = (x, y);
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    /// Cursor moved to `(x, y)`. Returns `[Pan, Tilt]` while dragging.
    ///
    /// Vertical motion is sign-flipped so dragging up tilts the view up.
    pub fn motion(&mut self, x: f64, y: f64) -> Option<[Action; 2]> {
        if !self.pressed {
            return None;
        }
        let dx = self.sensitivity * (x - self.prev.0) as f32;
        let dy = -self.sensitivity * (y - self.prev.1) as f32;
        self.prev = (x, y);
        tracing::trace!(dx, dy, "mouse drag");
        Some([Action::Pan(dx), Action::Tilt(dy)])
    }
}
