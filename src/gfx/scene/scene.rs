//! The backdrop scene: nodes, particle field, light rig, fog and the
//! optional debug overlay.
//!
//! The scene is built exactly once per lifetime by [`crate::gfx::scene::builder`]
//! and handed to the animation driver, which owns all per-tick mutation from
//! then on.

use wgpu::Device;

use crate::gfx::gizmos::DebugOverlay;

use super::node::SceneNode;
use super::particles::ParticleField;

/// Uniform base illumination.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// A directional light defined by the point it shines from toward the origin.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// Position the light shines from; the shader normalizes this into the
    /// light direction.
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Linear distance fog. The fog color doubles as the clear color.
#[derive(Debug, Clone, Copy)]
pub struct Fog {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

/// Main scene containing nodes, particles and lighting
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub particles: ParticleField,
    pub ambient: AmbientLight,
    pub lights: Vec<DirectionalLight>,
    pub fog: Fog,
    overlay: Option<DebugOverlay>,
}

impl Scene {
    pub fn new(
        nodes: Vec<SceneNode>,
        particles: ParticleField,
        ambient: AmbientLight,
        lights: Vec<DirectionalLight>,
        fog: Fog,
    ) -> Self {
        Self {
            nodes,
            particles,
            ambient,
            lights,
            fog,
            overlay: None,
        }
    }

    /// Adds or removes the axis/grid helper pair as a unit.
    ///
    /// Idempotent in both directions: enabling twice keeps exactly one pair,
    /// disabling while absent is a no-op.
    pub fn set_overlay(&mut self, enabled: bool) {
        if enabled {
            if self.overlay.is_none() {
                self.overlay = Some(DebugOverlay::new());
            }
        } else {
            self.overlay = None;
        }
    }

    pub fn overlay(&self) -> Option<&DebugOverlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay.is_some()
    }

    /// Gets the total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates the nodes touched by the per-tick animation pass, with their
    /// animation index. The index drives per-node desynchronization, so it
    /// must be stable across ticks.
    pub fn animated_nodes_mut(&mut self) -> impl Iterator<Item = (usize, &mut SceneNode)> {
        self.nodes
            .iter_mut()
            .filter(|node| node.animated)
            .enumerate()
    }

    /// Initializes GPU resources for all nodes and the particle field.
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        node_layout: &wgpu::BindGroupLayout,
        particle_layout: &wgpu::BindGroupLayout,
    ) {
        for node in self.nodes.iter_mut() {
            node.init_gpu_resources(device, node_layout);
        }
        self.particles.init_gpu_resources(device, particle_layout);
    }

    /// Syncs all per-frame state (node transforms, particle positions) to
    /// the GPU.
    pub fn update_gpu(&self, queue: &wgpu::Queue) {
        for node in &self.nodes {
            node.update_gpu_uniform(queue);
        }
        self.particles.update_gpu(queue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::build_scene;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_scene() -> Scene {
        let mut rng = StdRng::seed_from_u64(1);
        build_scene(&mut rng)
    }

    #[test]
    fn test_overlay_toggle_is_idempotent() {
        let mut scene = test_scene();
        assert!(!scene.overlay_enabled());

        scene.set_overlay(true);
        scene.set_overlay(true);
        assert!(scene.overlay_enabled());
        // Exactly one pair present
        assert_eq!(scene.overlay().unwrap().axes.line_count(), 3);

        scene.set_overlay(false);
        scene.set_overlay(false);
        assert!(!scene.overlay_enabled());
    }

    #[test]
    fn test_animated_nodes_skip_the_platform() {
        let mut scene = test_scene();
        let total = scene.node_count();
        let animated = scene.animated_nodes_mut().count();
        assert_eq!(animated, total - 1);
    }

    #[test]
    fn test_animation_indices_are_stable() {
        let mut scene = test_scene();
        let first: Vec<(usize, String)> = scene
            .animated_nodes_mut()
            .map(|(i, n)| (i, n.name.clone()))
            .collect();
        let second: Vec<(usize, String)> = scene
            .animated_nodes_mut()
            .map(|(i, n)| (i, n.name.clone()))
            .collect();
        assert_eq!(first, second);
    }
}
