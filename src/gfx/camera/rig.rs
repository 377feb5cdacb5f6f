//! Scroll- and pointer-driven camera rig
//!
//! The rig keeps two independent smoothing channels: a scroll channel whose
//! target is a deterministic function of page progress, and a pointer channel
//! used for small parallax nudges. Both channels converge toward their
//! targets by exponential smoothing each tick and are blended additively
//! into the final eye position. Direct assignment would cause visible
//! jitter, hence the lerp.

use cgmath::{perspective, EuclideanSpace, Matrix4, Point3, Rad, Vector2, Vector3, Zero};
use std::f32::consts::{PI, TAU};

use super::camera_utils::{convert_matrix4_to_array, CameraUniform, OPENGL_TO_WGPU_MATRIX};

/// Per-tick exponential smoothing factor shared by both channels.
pub const SMOOTHING: f32 = 0.05;

/// Horizontal gain applied to the pointer x offset.
const PARALLAX_GAIN_X: f32 = 0.5;
/// Vertical gain applied to the (inverted) pointer y offset.
const PARALLAX_GAIN_Y: f32 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    /// Smoothed scroll-channel position.
    scroll_pos: Vector3<f32>,
    /// Scroll-channel target, recomputed on every progress update.
    scroll_target: Vector3<f32>,
    /// Smoothed pointer-channel offset.
    parallax: Vector2<f32>,
    /// Pointer-channel target.
    parallax_target: Vector2<f32>,
    /// Blended eye position (scroll channel + parallax nudge).
    eye: Vector3<f32>,
    /// Look-at target. The backdrop always faces the origin.
    target: Vector3<f32>,
    up: Vector3<f32>,
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
    pub uniform: CameraUniform,
}

impl CameraRig {
    /// Creates a rig at the progress-zero pose, looking at the origin.
    pub fn new(aspect: f32) -> Self {
        let home = scroll_pose(0.0);
        let mut rig = Self {
            scroll_pos: home,
            scroll_target: home,
            parallax: Vector2::zero(),
            parallax_target: Vector2::zero(),
            eye: home,
            target: Vector3::zero(),
            up: Vector3::unit_y(),
            aspect,
            fovy: Rad(PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        rig.update_uniform();
        rig
    }

    /// Recomputes the scroll-channel target for a page progress in [0, 1].
    ///
    /// Out-of-range values are clamped; non-finite values are dropped.
    pub fn apply_scroll_offset(&mut self, progress: f32) {
        if !progress.is_finite() {
            log::debug!("ignoring non-finite scroll progress");
            return;
        }
        self.scroll_target = scroll_pose(progress.clamp(0.0, 1.0));
    }

    /// Sets the pointer-channel target from normalized offsets in [-1, 1].
    ///
    /// Out-of-range values are clamped; non-finite values are dropped.
    pub fn apply_pointer_offset(&mut self, nx: f32, ny: f32) {
        if !nx.is_finite() || !ny.is_finite() {
            log::debug!("ignoring non-finite pointer offset");
            return;
        }
        self.parallax_target = Vector2::new(
            nx.clamp(-1.0, 1.0) * PARALLAX_GAIN_X,
            -ny.clamp(-1.0, 1.0) * PARALLAX_GAIN_Y,
        );
    }

    /// Advances both smoothing channels by one tick and rebuilds the uniform.
    pub fn advance(&mut self) {
        self.scroll_pos += (self.scroll_target - self.scroll_pos) * SMOOTHING;
        self.parallax += (self.parallax_target - self.parallax) * SMOOTHING;
        self.eye = self.scroll_pos + Vector3::new(self.parallax.x, self.parallax.y, 0.0);
        self.update_uniform();
    }

    /// Updates the projection aspect ratio. Zero dimensions are ignored so
    /// the call is safe before the surface exists.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.update_uniform();
    }

    /// Current blended eye position.
    pub fn eye(&self) -> Vector3<f32> {
        self.eye
    }

    /// Current smoothed parallax offset (consumed by the particle field tilt).
    pub fn parallax(&self) -> Vector2<f32> {
        self.parallax
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        Matrix4::look_at_rh(eye, target, self.up)
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    fn update_uniform(&mut self) {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        self.uniform = CameraUniform {
            view_position: [self.eye.x, self.eye.y, self.eye.z, 1.0],
            view: convert_matrix4_to_array(view),
            proj: convert_matrix4_to_array(proj),
            view_proj: convert_matrix4_to_array(proj * view),
        };
    }
}

/// Deterministic scroll-channel pose: depth recedes linearly, height climbs
/// linearly, and the horizontal position sweeps a full sine period.
fn scroll_pose(progress: f32) -> Vector3<f32> {
    Vector3::new(
        (progress * TAU).sin() * 5.0,
        5.0 + progress * 10.0,
        15.0 - progress * 20.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_pose_matches_progress_zero() {
        let rig = CameraRig::new(1.0);
        let eye = rig.eye();
        assert!((eye.x - 0.0).abs() < 1e-6);
        assert!((eye.y - 5.0).abs() < 1e-6);
        assert!((eye.z - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_scroll_depth_converges_monotonically() {
        let mut rig = CameraRig::new(1.0);
        rig.apply_scroll_offset(0.5);
        let goal = 15.0 - 0.5 * 20.0;

        let mut previous_gap = (rig.eye().z - goal).abs();
        for _ in 0..200 {
            rig.advance();
            let gap = (rig.eye().z - goal).abs();
            assert!(gap <= previous_gap + 1e-6, "depth moved away from target");
            previous_gap = gap;
        }
        assert!(previous_gap < 0.01);
    }

    #[test]
    fn test_scroll_depth_never_overshoots() {
        let mut rig = CameraRig::new(1.0);
        rig.apply_scroll_offset(1.0);
        let goal = -5.0;

        // Moving from z = 15 down to z = -5: the lerp may not cross the
        // target by more than one smoothing step.
        for _ in 0..500 {
            let before = rig.eye().z;
            rig.advance();
            let step = (rig.eye().z - before).abs();
            assert!(rig.eye().z >= goal - step - 1e-6);
        }
    }

    #[test]
    fn test_full_scroll_converges_within_tolerance() {
        let mut rig = CameraRig::new(1.0);
        rig.apply_scroll_offset(1.0);
        for _ in 0..200 {
            rig.advance();
        }
        assert!((rig.eye().z - -5.0).abs() < 0.01);
        assert!((rig.eye().y - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut rig = CameraRig::new(1.0);
        rig.apply_scroll_offset(7.0);
        let clamped = rig.scroll_target;
        rig.apply_scroll_offset(1.0);
        assert_eq!(clamped, rig.scroll_target);
    }

    #[test]
    fn test_nan_progress_is_dropped() {
        let mut rig = CameraRig::new(1.0);
        rig.apply_scroll_offset(0.25);
        let before = rig.scroll_target;
        rig.apply_scroll_offset(f32::NAN);
        assert_eq!(before, rig.scroll_target);
        rig.advance();
        assert!(rig.eye().x.is_finite());
        assert!(rig.eye().y.is_finite());
        assert!(rig.eye().z.is_finite());
    }

    #[test]
    fn test_pointer_offset_blends_additively() {
        let mut rig = CameraRig::new(1.0);
        rig.apply_pointer_offset(1.0, 1.0);
        for _ in 0..400 {
            rig.advance();
        }
        // Scroll channel stays at home; parallax settles at its gains.
        assert!((rig.eye().x - 0.5).abs() < 0.01);
        assert!((rig.eye().y - (5.0 - 0.3)).abs() < 0.01);
        assert!((rig.eye().z - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_nan_pointer_is_dropped() {
        let mut rig = CameraRig::new(1.0);
        rig.apply_pointer_offset(f32::NAN, 0.0);
        rig.advance();
        assert_eq!(rig.parallax(), Vector2::zero());
    }

    #[test]
    fn test_resize_projection_ignores_zero_dimensions() {
        let mut rig = CameraRig::new(1.0);
        rig.resize_projection(0, 600);
        rig.resize_projection(800, 0);
        rig.resize_projection(1600, 800);
        assert!((rig.aspect - 2.0).abs() < 1e-6);
    }
}
