use glam::Vec3;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera::SphericalView;
use crate::kinematics::JOINT_COUNT;
use crate::lighting::{Lighting, MAX_LIGHTS};
use crate::renderer::SAMPLE_COUNTS;

/// Camera step per key press for `phi` and `theta`, in radians.
pub const ANGLE_STEP: f32 = 0.05;
/// Camera step per key press for `r`.
pub const ZOOM_STEP: f32 = 0.1;
/// Joint step per key press, in degrees.
pub const JOINT_STEP_DEG: f32 = 5.0;
/// Light step per key press along one axis.
pub const LIGHT_STEP: f32 = 0.1;
/// Lights are kept inside `[-LIGHT_RANGE, LIGHT_RANGE]` on every axis.
pub const LIGHT_RANGE: f32 = 10.0;

/// Keys for increasing and decreasing each joint, in joint order.
const JOINT_KEYS: [(KeyCode, KeyCode); JOINT_COUNT] = [
    (KeyCode::KeyQ, KeyCode::KeyA),
    (KeyCode::KeyW, KeyCode::KeyS),
    (KeyCode::KeyE, KeyCode::KeyD),
    (KeyCode::KeyR, KeyCode::KeyF),
    (KeyCode::KeyT, KeyCode::KeyG),
    (KeyCode::KeyY, KeyCode::KeyH),
];

const LIGHT_SELECT_KEYS: [KeyCode; MAX_LIGHTS] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
];

/// A user command from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Adds to the camera azimuth.
    Orbit(f32),
    /// Adds to the camera polar angle.
    Tilt(f32),
    /// Adds to the camera distance.
    Zoom(f32),
    /// Adds `degrees` to one joint.
    Jog { joint: usize, degrees: f32 },
    /// Makes a light the target of later light actions.
    SelectLight(usize),
    /// Flips the selected light on or off.
    ToggleLight,
    /// Moves the selected light.
    MoveLight(Vec3),
    /// Steps to the next entry of [`SAMPLE_COUNTS`].
    CycleSampleCount,
    Quit,
}

/// Maps a key to its action, if it has one.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::Escape => Action::Quit,
        KeyCode::ArrowLeft => Action::Orbit(-ANGLE_STEP),
        KeyCode::ArrowRight => Action::Orbit(ANGLE_STEP),
        KeyCode::ArrowUp => Action::Tilt(-ANGLE_STEP),
        KeyCode::ArrowDown => Action::Tilt(ANGLE_STEP),
        KeyCode::PageUp => Action::Zoom(ZOOM_STEP),
        KeyCode::PageDown => Action::Zoom(-ZOOM_STEP),
        KeyCode::KeyB => Action::ToggleLight,
        KeyCode::KeyJ => Action::MoveLight(Vec3::new(-LIGHT_STEP, 0.0, 0.0)),
        KeyCode::KeyL => Action::MoveLight(Vec3::new(LIGHT_STEP, 0.0, 0.0)),
        KeyCode::KeyK => Action::MoveLight(Vec3::new(0.0, -LIGHT_STEP, 0.0)),
        KeyCode::KeyI => Action::MoveLight(Vec3::new(0.0, LIGHT_STEP, 0.0)),
        KeyCode::KeyU => Action::MoveLight(Vec3::new(0.0, 0.0, -LIGHT_STEP)),
        KeyCode::KeyO => Action::MoveLight(Vec3::new(0.0, 0.0, LIGHT_STEP)),
        KeyCode::KeyM => Action::CycleSampleCount,
        _ => {
            if let Some(light) = LIGHT_SELECT_KEYS.iter().position(|&k| k == key) {
                return Some(Action::SelectLight(light));
            }
            let (joint, up) = JOINT_KEYS
                .iter()
                .enumerate()
                .find_map(|(joint, &(inc, dec))| {
                    if key == inc {
                        Some((joint, true))
                    } else if key == dec {
                        Some((joint, false))
                    } else {
                        None
                    }
                })?;
            Action::Jog {
                joint,
                degrees: if up { JOINT_STEP_DEG } else { -JOINT_STEP_DEG },
            }
        }
    };
    Some(action)
}

/// Wraps an angle in degrees into `[-180, 180]`.
pub fn wrap_degrees(angle: f32) -> f32 {
    if angle > 180.0 {
        angle - 360.0
    } else if angle < -180.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Everything the keyboard can change: target camera view, joint angles,
/// lights and the requested MSAA sample count.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlState {
    /// View the camera eases toward.
    pub view: SphericalView,
    /// Joint angles in degrees, each in `[-180, 180]`.
    pub angles_deg: [f32; JOINT_COUNT],
    pub lighting: Lighting,
    /// Index of the light that light actions apply to.
    pub selected_light: usize,
    pub sample_count: u32,
}

impl ControlState {
    /// A state with no lights and MSAA off.
    pub fn new(view: SphericalView, angles_deg: [f32; JOINT_COUNT]) -> Self {
        Self {
            view,
            angles_deg: angles_deg.map(wrap_degrees),
            lighting: Lighting::new(),
            selected_light: 0,
            sample_count: 1,
        }
    }

    pub fn with_lighting(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Applies an action. Returns `true` if the viewer should quit.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Orbit(delta) => self.view.add_phi(delta),
            Action::Tilt(delta) => self.view.add_theta(delta),
            Action::Zoom(delta) => self.view.add_r(delta),
            Action::Jog { joint, degrees } => {
                if let Some(angle) = self.angles_deg.get_mut(joint) {
                    *angle = wrap_degrees(*angle + degrees);
                    log::debug!("joint {} -> {:.1}°", joint + 1, *angle);
                }
            }
            Action::SelectLight(index) => {
                if index < self.lighting.lights().len() {
                    self.selected_light = index;
                    log::debug!("light {} selected", index + 1);
                }
            }
            Action::ToggleLight => {
                if let Some(light) = self.lighting.lights_mut().get_mut(self.selected_light) {
                    light.enabled = !light.enabled;
                    log::debug!("light {} enabled: {}", self.selected_light + 1, light.enabled);
                }
            }
            Action::MoveLight(delta) => {
                if let Some(light) = self.lighting.lights_mut().get_mut(self.selected_light) {
                    light.position = (light.position + delta).clamp(Vec3::splat(-LIGHT_RANGE), Vec3::splat(LIGHT_RANGE));
                    log::debug!("light {} at {}", self.selected_light + 1, light.position);
                }
            }
            Action::CycleSampleCount => {
                let next = SAMPLE_COUNTS
                    .iter()
                    .position(|&c| c == self.sample_count)
                    .map_or(0, |i| (i + 1) % SAMPLE_COUNTS.len());
                self.sample_count = SAMPLE_COUNTS[next];
                log::debug!("requested MSAA sample count {}", self.sample_count);
            }
            Action::Quit => return true,
        }
        false
    }

    /// Handles key presses (including repeats). Returns `true` on quit.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return false;
        };
        if event.state != ElementState::Pressed {
            return false;
        }
        match event.physical_key {
            PhysicalKey::Code(key) => action_for_key(key).is_some_and(|action| self.apply(action)),
            PhysicalKey::Unidentified(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::Light;

    fn two_lights() -> ControlState {
        let mut lighting = Lighting::new();
        lighting.add(Light::default());
        lighting.add(Light {
            position: Vec3::new(-1.0, 0.0, 2.0),
            ..Light::default()
        });
        ControlState::new(SphericalView::default(), [0.0; JOINT_COUNT]).with_lighting(lighting)
    }

    #[test]
    fn joint_keys_map_to_jogs() {
        assert_eq!(
            action_for_key(KeyCode::KeyQ),
            Some(Action::Jog {
                joint: 0,
                degrees: 5.0
            })
        );
        assert_eq!(
            action_for_key(KeyCode::KeyH),
            Some(Action::Jog {
                joint: 5,
                degrees: -5.0
            })
        );
        assert_eq!(action_for_key(KeyCode::KeyZ), None);
        assert_eq!(action_for_key(KeyCode::Escape), Some(Action::Quit));
    }

    #[test]
    fn light_keys_map_to_light_actions() {
        assert_eq!(action_for_key(KeyCode::Digit3), Some(Action::SelectLight(2)));
        assert_eq!(action_for_key(KeyCode::KeyB), Some(Action::ToggleLight));
        assert_eq!(
            action_for_key(KeyCode::KeyO),
            Some(Action::MoveLight(Vec3::new(0.0, 0.0, LIGHT_STEP)))
        );
        assert_eq!(action_for_key(KeyCode::KeyM), Some(Action::CycleSampleCount));
    }

    #[test]
    fn jogging_wraps_at_180() {
        let mut state = ControlState::new(SphericalView::default(), [180.0, -180.0, 0.0, 0.0, 0.0, 0.0]);
        state.apply(Action::Jog {
            joint: 0,
            degrees: 5.0,
        });
        state.apply(Action::Jog {
            joint: 1,
            degrees: -5.0,
        });
        assert_eq!(state.angles_deg[0], -175.0);
        assert_eq!(state.angles_deg[1], 175.0);
    }

    #[test]
    fn camera_actions_respect_view_limits() {
        let mut state = ControlState::new(SphericalView::new(0.05, 0.0, 0.03), [0.0; JOINT_COUNT]);
        assert!(!state.apply(Action::Zoom(-ZOOM_STEP)));
        assert!(!state.apply(Action::Tilt(-ANGLE_STEP)));
        assert_eq!(state.view.r, 0.05);
        assert_eq!(state.view.theta, 0.03);
        state.apply(Action::Orbit(ANGLE_STEP));
        assert_eq!(state.view.phi, ANGLE_STEP);
    }

    #[test]
    fn toggle_affects_only_the_selected_light() {
        let mut state = two_lights();
        state.apply(Action::SelectLight(1));
        state.apply(Action::ToggleLight);

        let lights = state.lighting.lights();
        assert!(lights[0].enabled);
        assert!(!lights[1].enabled);
        assert_eq!(state.lighting.enabled().count(), 1);

        state.apply(Action::ToggleLight);
        assert!(state.lighting.lights()[1].enabled);
    }

    #[test]
    fn selecting_a_missing_light_keeps_the_selection() {
        let mut state = two_lights();
        state.apply(Action::SelectLight(1));
        state.apply(Action::SelectLight(3));
        assert_eq!(state.selected_light, 1);
    }

    #[test]
    fn moving_a_light_is_clamped_to_range() {
        let mut state = two_lights();
        state.apply(Action::MoveLight(Vec3::new(0.5, 0.0, -0.25)));
        assert_eq!(state.lighting.lights()[0].position, Vec3::new(2.5, 2.0, 2.75));
        assert_eq!(state.lighting.lights()[1].position, Vec3::new(-1.0, 0.0, 2.0));

        state.apply(Action::MoveLight(Vec3::new(0.0, 0.0, 100.0)));
        assert_eq!(state.lighting.lights()[0].position.z, LIGHT_RANGE);
    }

    #[test]
    fn light_actions_without_lights_do_nothing() {
        let mut state = ControlState::new(SphericalView::default(), [0.0; JOINT_COUNT]);
        let before = state.clone();
        state.apply(Action::ToggleLight);
        state.apply(Action::MoveLight(Vec3::X));
        assert_eq!(state, before);
    }

    #[test]
    fn sample_count_cycles_through_supported_values() {
        let mut state = ControlState::new(SphericalView::default(), [0.0; JOINT_COUNT]).with_sample_count(4);
        state.apply(Action::CycleSampleCount);
        assert_eq!(state.sample_count, 8);
        state.apply(Action::CycleSampleCount);
        assert_eq!(state.sample_count, 1);

        let mut odd = state.clone().with_sample_count(3);
        odd.apply(Action::CycleSampleCount);
        assert_eq!(odd.sample_count, 1);
    }

    #[test]
    fn quit_is_reported() {
        let mut state = ControlState::new(SphericalView::default(), [0.0; JOINT_COUNT]);
        assert!(state.apply(Action::Quit));
    }
}
