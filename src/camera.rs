use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Point the camera orbits around and looks at.
pub const LOOK_AT: Vec3 = Vec3::new(0.0, 0.0, 0.7);

/// Vertical field of view in degrees.
pub const FOV_Y_DEGREES: f32 = 40.0;

/// Components closer to their target than this stop easing.
const DEAD_BAND: f32 = 0.01;

/// Spherical camera coordinates around [`LOOK_AT`].
///
/// `phi` is the azimuth around +Z, `theta` the polar angle measured from +Z
/// and `r` the distance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphericalView {
    pub phi: f32,
    pub theta: f32,
    pub r: f32,
}

impl Default for SphericalView {
    fn default() -> Self {
        Self {
            phi: 1.0,
            theta: 1.0,
            r: 3.0,
        }
    }
}

impl SphericalView {
    pub fn new(r: f32, phi: f32, theta: f32) -> Self {
        Self { phi, theta, r }
    }

    /// Rotates around the vertical axis. Unbounded.
    pub fn add_phi(&mut self, delta: f32) {
        self.phi += delta;
    }

    /// Tilts the camera. A step that would leave `(0, π)` is ignored.
    pub fn add_theta(&mut self, delta: f32) {
        let theta = self.theta + delta;
        if theta > 0.0 && theta < std::f32::consts::PI {
            self.theta = theta;
        }
    }

    /// Zooms. A step that would make `r` negative is ignored.
    pub fn add_r(&mut self, delta: f32) {
        let r = self.r + delta;
        if r >= 0.0 {
            self.r = r;
        }
    }

    /// Offset of the eye from the origin.
    pub fn eye(&self) -> Vec3 {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        Vec3::new(
            self.r * cos_phi * sin_theta,
            self.r * sin_phi * sin_theta,
            self.r * cos_theta,
        )
    }
}

/// Camera that eases toward a target [`SphericalView`] at fixed rates.
///
/// # Example
/// ```
/// use armview::{CameraRig, SphericalView};
///
/// let mut rig = CameraRig::new(SphericalView::new(3.0, 0.0, 1.0));
/// let target = SphericalView::new(5.0, 0.0, 1.0);
/// rig.update(&target, 0.1);
/// assert!(rig.view().r > 3.0);
/// ```
#[derive(Clone, Debug)]
pub struct CameraRig {
    view: SphericalView,
    /// Azimuth rate in radians per second.
    pub phi_rate: f32,
    /// Polar rate in radians per second.
    pub theta_rate: f32,
    /// Zoom rate in units per second.
    pub r_rate: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(SphericalView::default())
    }
}

impl CameraRig {
    pub fn new(view: SphericalView) -> Self {
        Self {
            view,
            phi_rate: 1.0,
            theta_rate: 1.0,
            r_rate: 4.0,
        }
    }

    /// The eased view currently shown.
    pub fn view(&self) -> &SphericalView {
        &self.view
    }

    /// Moves each component toward `target` by at most `rate * dt`, never
    /// past it.
    pub fn update(&mut self, target: &SphericalView, dt: f32) {
        self.view.phi = ease(self.view.phi, target.phi, self.phi_rate * dt);
        self.view.theta = ease(self.view.theta, target.theta, self.theta_rate * dt);
        self.view.r = ease(self.view.r, target.r, self.r_rate * dt);
    }

    /// World-space eye position.
    pub fn eye(&self) -> Vec3 {
        self.view.eye()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), LOOK_AT, Vec3::Z)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let fov = FOV_Y_DEGREES.to_radians();
        let near = 0.05 / (fov / 2.0).tan();
        Mat4::perspective_rh(fov, aspect, near, near + 100.0)
    }
}

fn ease(current: f32, target: f32, max_step: f32) -> f32 {
    let difference = current - target;
    if difference.abs() < DEAD_BAND {
        current
    } else {
        current - difference.clamp(-max_step, max_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn theta_stays_inside_open_interval() {
        let mut view = SphericalView::new(1.0, 0.0, 0.03);
        view.add_theta(-0.05);
        assert_eq!(view.theta, 0.03);
        view.add_theta(0.05);
        assert_abs_diff_eq!(view.theta, 0.08, epsilon = 1e-6);

        let mut view = SphericalView::new(1.0, 0.0, PI - 0.01);
        view.add_theta(0.05);
        assert_eq!(view.theta, PI - 0.01);
    }

    #[test]
    fn r_never_goes_negative_and_phi_is_free() {
        let mut view = SphericalView::new(0.05, 0.0, 1.0);
        view.add_r(-0.1);
        assert_eq!(view.r, 0.05);
        view.add_phi(10.0);
        assert_eq!(view.phi, 10.0);
    }

    #[test]
    fn eye_from_spherical_coordinates() {
        let view = SphericalView::new(2.0, FRAC_PI_2, FRAC_PI_2);
        assert_abs_diff_eq!(view.eye(), Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-6);
        let top = SphericalView::new(3.0, 0.0, 0.0);
        assert_abs_diff_eq!(top.eye(), Vec3::new(0.0, 0.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn rig_eases_toward_target_and_stops_in_dead_band() {
        let mut rig = CameraRig::new(SphericalView::new(3.0, 0.0, 1.0));
        let target = SphericalView::new(2.0, 0.5, 1.005);
        rig.update(&target, 0.1);
        assert_abs_diff_eq!(rig.view().r, 2.6, epsilon = 1e-6);
        assert_abs_diff_eq!(rig.view().phi, 0.1, epsilon = 1e-6);
        assert_eq!(rig.view().theta, 1.0);
    }

    #[test]
    fn rig_settles_on_target_without_overshoot() {
        let mut rig = CameraRig::new(SphericalView::new(3.0, 0.0, 1.0));
        let target = SphericalView::new(3.1, 0.3, 0.9);
        for _ in 0..120 {
            rig.update(&target, 1.0 / 60.0);
            assert!(rig.view().r <= target.r + 1e-6);
        }
        assert_abs_diff_eq!(rig.view().r, target.r, epsilon = 1e-6);
        assert_abs_diff_eq!(rig.view().phi, target.phi, epsilon = 1e-6);
        assert_abs_diff_eq!(rig.view().theta, target.theta, epsilon = 1e-6);

        let settled = *rig.view();
        rig.update(&target, 1.0 / 60.0);
        assert_eq!(*rig.view(), settled);
    }

    #[test]
    fn projection_near_plane() {
        let rig = CameraRig::default();
        let projection = rig.projection_matrix(1.0);
        let near = 0.05 / 20.0_f32.to_radians().tan();
        // A point on the near plane maps to depth 0.
        let clip = projection * glam::Vec4::new(0.0, 0.0, -near, 1.0);
        assert_abs_diff_eq!(clip.z / clip.w, 0.0, epsilon = 1e-5);
    }
}
