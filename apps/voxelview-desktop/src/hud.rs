use std::time::{Duration, Instant};
use voxelview_input::Key;
use voxelview_render::SceneState;
use winit::keyboard::KeyCode;

const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Frames-per-second over half-second windows.
#[derive(Debug)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
        }
    }

    /// Count a presented frame. Returns the rate once per elapsed window.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < FPS_WINDOW {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

/// Window title carrying the frame rate and camera position.
pub fn title(base: &str, fps: f32, state: &SceneState) -> String {
    let p = state.camera().position();
    let fixed = if state.is_view_center_fixed() {
        " | view fixed"
    } else {
        ""
    };
    format!(
        "{base} | {fps:.0} fps | pos ({:.1}, {:.1}, {:.1}) | pitch {:.1}{fixed}",
        p.x,
        p.y,
        p.z,
        state.camera().pitch_degrees()
    )
}

/// Physical key to viewer key. Unbound keys map to `None`.
pub fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}
