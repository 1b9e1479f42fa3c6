/// A camera control action produced from raw input.
///
/// Speeds are in meters per second, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Velocity along the camera's right axis.
    SetSideSpeed(f32),
    /// Velocity along the camera's up axis.
    SetVerticalSpeed(f32),
    /// Velocity along the look direction.
    SetForwardSpeed(f32),
    /// Keep the view center in place while translating.
    SetViewCenterFixed(bool),
    /// Yaw delta, staged until the next update.
    Pan(f32),
    /// Pitch delta, staged until the next update.
    Tilt(f32),
    /// Leave the viewer.
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_actions_carry_magnitude() {
        let a = Action::SetForwardSpeed(-44.7);
        assert!(matches!(a, Action::SetForwardSpeed(v) if v < 0.0));
    }
}
