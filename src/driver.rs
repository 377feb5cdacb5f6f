//! Animation driver
//!
//! Owns the scene, the camera rig and the playback state, and advances all
//! of them one tick at a time. The host environment owns the scheduling
//! loop (a winit redraw cycle, a test loop) and calls [`AnimationDriver::tick`]
//! once per frame with the elapsed delta time and a [`FrameSink`] to draw
//! into.
//!
//! Tick order is fixed: camera smoothing, then node rotation, then particle
//! drift, then the draw call. A frame therefore never renders a camera pose
//! that lags behind that frame's geometry.

use std::f32::consts::{PI, TAU};

use crate::gfx::camera::{CameraRig, CameraUniform};
use crate::gfx::scene::Scene;

/// Per-node yaw offset used to desynchronize the scroll-keyed rotation.
const NODE_YAW_OFFSET: f32 = 0.1;

/// Drawing capability injected by the host.
///
/// The real implementation is [`crate::gfx::render_engine::RenderEngine`];
/// tests substitute a recording stub so the driver can run without a GPU.
pub trait FrameSink {
    fn render_frame(&mut self, scene: &Scene, camera: &CameraUniform);
}

/// Playback state of the driver.
///
/// Transitions only happen through explicit [`AnimationDriver::pause`] and
/// [`AnimationDriver::resume`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Running,
    Paused,
}

/// Drives all per-frame mutation of the backdrop.
pub struct AnimationDriver {
    scene: Scene,
    rig: CameraRig,
    playback: Playback,
    /// Accumulated running time in seconds. Does not advance while paused.
    elapsed: f32,
    /// Last accepted scroll progress in [0, 1].
    progress: f32,
    /// Set when progress changed since the previous tick; the node pass
    /// consumes it to apply the one-shot vertical nudge.
    progress_dirty: bool,
}

impl AnimationDriver {
    /// Creates a running driver owning the given scene and rig.
    pub fn new(scene: Scene, rig: CameraRig) -> Self {
        Self {
            scene,
            rig,
            playback: Playback::Running,
            elapsed: 0.0,
            progress: 0.0,
            progress_dirty: false,
        }
    }

    /// Advances one frame and draws it.
    ///
    /// While paused this returns immediately: no time accumulation, no
    /// geometry mutation, no draw call. The host keeps scheduling ticks so
    /// a resume takes effect on the very next one.
    pub fn tick(&mut self, dt: f32, sink: &mut dyn FrameSink) {
        if self.playback == Playback::Paused {
            return;
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed += dt;
        let elapsed = self.elapsed;

        // Camera smoothing before any geometry work
        self.rig.advance();

        // Scroll-keyed node rotation plus a gentle per-node drift. The drift
        // amplitude rides a per-node sine of elapsed time so the boxes never
        // move in lockstep; a scroll change resets the yaw to its keyed value
        // and nudges each node vertically once.
        let progress = self.progress;
        let dirty = std::mem::take(&mut self.progress_dirty);
        for (index, node) in self.scene.animated_nodes_mut() {
            let offset = index as f32 * NODE_YAW_OFFSET;
            if dirty {
                node.transform.yaw = progress * TAU + offset;
                node.transform.position.y += (progress * PI + offset).sin() * 0.01;
            }
            node.transform.yaw += (elapsed + index as f32).sin() * 0.0005;
        }

        // Particle drift
        let pointer_y = self.rig.parallax().y;
        self.scene.particles.advance(elapsed, pointer_y);

        sink.render_frame(&self.scene, &self.rig.uniform);
    }

    /// Forwards a normalized scroll progress to the camera rig and marks the
    /// node pass for the scroll-keyed rotation update.
    pub fn update_scroll(&mut self, progress: f32) {
        if !progress.is_finite() {
            log::debug!("ignoring non-finite scroll progress");
            return;
        }
        let progress = progress.clamp(0.0, 1.0);
        self.rig.apply_scroll_offset(progress);
        if progress != self.progress {
            self.progress = progress;
            self.progress_dirty = true;
        }
    }

    /// Forwards a normalized pointer offset to the camera rig.
    pub fn update_pointer(&mut self, nx: f32, ny: f32) {
        self.rig.apply_pointer_offset(nx, ny);
    }

    /// Updates the camera projection for a new surface size.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.rig.resize_projection(width, height);
    }

    /// Suspends all mutation and drawing. Level-triggered: an in-flight tick
    /// always completes.
    pub fn pause(&mut self) {
        self.playback = Playback::Paused;
    }

    /// Resumes mutation and drawing on the next tick.
    pub fn resume(&mut self) {
        self.playback = Playback::Running;
    }

    pub fn is_paused(&self) -> bool {
        self.playback == Playback::Paused
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// Adds or removes the debug helper pair. Idempotent in both directions.
    pub fn toggle_debug(&mut self, enabled: bool) {
        self.scene.set_overlay(enabled);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Total running time in seconds, excluding paused spans.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{build_scene, PARTICLE_COUNT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    /// Records draw calls and the camera state they were issued with.
    struct RecordingSink {
        frames: usize,
        last_eye: [f32; 4],
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                frames: 0,
                last_eye: [0.0; 4],
            }
        }
    }

    impl FrameSink for RecordingSink {
        fn render_frame(&mut self, _scene: &Scene, camera: &CameraUniform) {
            self.frames += 1;
            self.last_eye = camera.view_position;
        }
    }

    fn test_driver() -> AnimationDriver {
        let mut rng = StdRng::seed_from_u64(11);
        let scene = build_scene(&mut rng);
        AnimationDriver::new(scene, CameraRig::new(1.5))
    }

    fn node_yaws(driver: &AnimationDriver) -> Vec<f32> {
        driver.scene().nodes.iter().map(|n| n.transform.yaw).collect()
    }

    fn particle_ys(driver: &AnimationDriver) -> Vec<f32> {
        driver
            .scene()
            .particles
            .particles()
            .iter()
            .map(|p| p.position[1])
            .collect()
    }

    #[test]
    fn test_driver_starts_running() {
        let driver = test_driver();
        assert_eq!(driver.playback(), Playback::Running);
    }

    #[test]
    fn test_tick_draws_once_per_call() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();
        for _ in 0..10 {
            driver.tick(DT, &mut sink);
        }
        assert_eq!(sink.frames, 10);
    }

    #[test]
    fn test_pause_freezes_geometry_and_draws() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();
        driver.tick(DT, &mut sink);

        driver.pause();
        let yaws = node_yaws(&driver);
        let heights = particle_ys(&driver);
        let elapsed = driver.elapsed();

        for _ in 0..50 {
            driver.tick(DT, &mut sink);
        }

        assert_eq!(sink.frames, 1);
        assert_eq!(yaws, node_yaws(&driver));
        assert_eq!(heights, particle_ys(&driver));
        assert_eq!(elapsed, driver.elapsed());
    }

    #[test]
    fn test_resume_takes_effect_on_next_tick() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();

        driver.pause();
        driver.tick(DT, &mut sink);
        let elapsed = driver.elapsed();

        driver.resume();
        let yaws = node_yaws(&driver);
        driver.tick(DT, &mut sink);

        assert_eq!(sink.frames, 1);
        assert_ne!(yaws, node_yaws(&driver));
        // No catch-up: exactly one dt of time advanced
        assert!((driver.elapsed() - (elapsed + DT)).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_debug_is_idempotent() {
        let mut driver = test_driver();

        driver.toggle_debug(true);
        driver.toggle_debug(true);
        assert!(driver.scene().overlay_enabled());
        assert_eq!(driver.scene().overlay().unwrap().grid.line_count(), 42);

        driver.toggle_debug(false);
        driver.toggle_debug(false);
        assert!(!driver.scene().overlay_enabled());
    }

    #[test]
    fn test_particle_count_invariant_across_ticks() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();
        for _ in 0..300 {
            driver.tick(DT, &mut sink);
        }
        assert_eq!(driver.scene().particles.len(), PARTICLE_COUNT);
    }

    #[test]
    fn test_scroll_rotates_nodes_but_not_platform() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();

        let platform_yaw = driver
            .scene()
            .nodes
            .iter()
            .find(|n| n.name == "stone_platform")
            .unwrap()
            .transform
            .yaw;

        driver.update_scroll(0.5);
        driver.tick(DT, &mut sink);

        let scene = driver.scene();
        let concrete = scene.nodes.iter().find(|n| n.name == "concrete_block").unwrap();
        // Yaw keyed to progress (pi for half scroll) plus a tiny drift
        assert!((concrete.transform.yaw - PI).abs() < 0.01);

        let platform = scene.nodes.iter().find(|n| n.name == "stone_platform").unwrap();
        assert_eq!(platform.transform.yaw, platform_yaw);
    }

    #[test]
    fn test_camera_pose_rendered_matches_rig() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();

        driver.update_scroll(1.0);
        driver.tick(DT, &mut sink);

        // One smoothing step from z = 15 toward z = -5
        assert!((sink.last_eye[2] - 14.0).abs() < 1e-4);
        assert_eq!(sink.last_eye[2], driver.rig().eye().z);
    }

    #[test]
    fn test_end_to_end_scroll_convergence() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();

        // Progress zero: a single tick keeps the camera at the home pose
        driver.tick(DT, &mut sink);
        assert!((sink.last_eye[0] - 0.0).abs() < 1e-4);
        assert!((sink.last_eye[1] - 5.0).abs() < 1e-4);
        assert!((sink.last_eye[2] - 15.0).abs() < 1e-4);

        // Full scroll: 200 ticks converge the depth to within 0.01
        driver.update_scroll(1.0);
        for _ in 0..200 {
            driver.tick(DT, &mut sink);
        }
        assert!((sink.last_eye[2] - -5.0).abs() < 0.01);
    }

    #[test]
    fn test_invalid_scroll_input_is_dropped() {
        let mut driver = test_driver();
        let mut sink = RecordingSink::new();

        driver.update_scroll(f32::NAN);
        driver.update_scroll(42.0);
        driver.tick(DT, &mut sink);

        // Clamped to 1.0, never NaN
        assert!(sink.last_eye.iter().all(|c| c.is_finite()));
        for node in &driver.scene().nodes {
            assert!(node.transform.yaw.is_finite());
        }
    }

    #[test]
    fn test_resize_before_first_tick_is_safe() {
        let mut driver = test_driver();
        driver.handle_resize(0, 0);
        driver.handle_resize(1920, 1080);

        let mut sink = RecordingSink::new();
        driver.tick(DT, &mut sink);
        assert_eq!(sink.frames, 1);
    }
}
