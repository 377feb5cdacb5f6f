//! Scene graph builder
//!
//! Constructs the fixed architectural layout plus a bounded random garnish:
//! five extra boxes with randomized size, placement and gray-scale material.
//! Called exactly once per scene lifetime; the only input is an RNG source,
//! so a seeded RNG reproduces the exact same scene.

use cgmath::Vector3;
use rand::Rng;
use std::f32::consts::PI;

use crate::gfx::geometry::generate_box;

use super::node::{MaterialParams, SceneNode, Transform};
use super::particles::ParticleField;
use super::scene::{AmbientLight, DirectionalLight, Fog, Scene};

/// Number of randomized filler boxes around the main structures.
const FILLER_COUNT: usize = 5;

/// Builds the backdrop scene.
pub fn build_scene<R: Rng>(rng: &mut R) -> Scene {
    let mut nodes = Vec::with_capacity(4 + FILLER_COUNT);

    // Main building, rough concrete
    nodes.push(SceneNode::new(
        "concrete_block",
        generate_box(4.0, 6.0, 4.0),
        Transform::at(Vector3::new(0.0, 0.0, 0.0)),
        MaterialParams::new([0.23, 0.23, 0.23, 1.0], 0.8, 0.2),
    ));

    // Glass tower, translucent
    nodes.push(SceneNode::new(
        "glass_tower",
        generate_box(2.0, 8.0, 2.0),
        Transform::at(Vector3::new(-5.0, 1.0, -3.0)),
        MaterialParams::new([0.53, 0.8, 1.0, 0.4], 0.1, 0.1),
    ));

    // Steel structure, pre-rotated
    let mut steel = Transform::at(Vector3::new(5.0, -1.0, -2.0));
    steel.yaw = PI / 6.0;
    nodes.push(SceneNode::new(
        "steel_structure",
        generate_box(3.0, 4.0, 3.0),
        steel,
        MaterialParams::new([0.33, 0.33, 0.33, 1.0], 0.3, 0.9),
    ));

    // Stone platform under everything; the only node the animation pass
    // leaves alone.
    nodes.push(
        SceneNode::new(
            "stone_platform",
            generate_box(15.0, 0.5, 15.0),
            Transform::at(Vector3::new(0.0, -3.5, 0.0)),
            MaterialParams::new([0.16, 0.16, 0.16, 1.0], 0.9, 0.1),
        )
        .with_static_transform(),
    );

    // Randomized abstract filler elements
    for i in 0..FILLER_COUNT {
        let size = rng.random_range(0.5..2.0);
        let mut transform = Transform::at(Vector3::new(
            rng.random_range(-5.0..5.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-5.0..5.0),
        ));
        transform.yaw = rng.random_range(0.0..PI);

        let lightness = rng.random_range(0.1..0.4);
        let roughness = rng.random_range(0.5..1.0);
        let metalness = rng.random_range(0.0..0.5);

        nodes.push(SceneNode::new(
            &format!("filler_{}", i),
            generate_box(size, size * 2.0, size),
            transform,
            MaterialParams::gray(lightness, roughness, metalness),
        ));
    }

    let particles = ParticleField::new(rng);

    let ambient = AmbientLight {
        color: [1.0, 1.0, 1.0],
        intensity: 0.3,
    };

    let lights = vec![
        // Main light
        DirectionalLight {
            position: [5.0, 10.0, 5.0],
            color: [1.0, 1.0, 1.0],
            intensity: 0.8,
        },
        // Fill light
        DirectionalLight {
            position: [-5.0, 5.0, -5.0],
            color: [0.42, 0.55, 1.0],
            intensity: 0.3,
        },
        // Rim light
        DirectionalLight {
            position: [0.0, 3.0, -10.0],
            color: [1.0, 1.0, 1.0],
            intensity: 0.4,
        },
    ];

    let fog = Fog {
        color: [0.059, 0.059, 0.059],
        near: 10.0,
        far: 50.0,
    };

    Scene::new(nodes, particles, ambient, lights, fog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::PARTICLE_COUNT;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scene_structure() {
        let mut rng = StdRng::seed_from_u64(9);
        let scene = build_scene(&mut rng);

        assert_eq!(scene.node_count(), 4 + FILLER_COUNT);
        assert_eq!(scene.particles.len(), PARTICLE_COUNT);
        assert_eq!(scene.lights.len(), 3);
        assert!(!scene.overlay_enabled());
    }

    #[test]
    fn test_platform_is_static() {
        let mut rng = StdRng::seed_from_u64(9);
        let scene = build_scene(&mut rng);
        let platform = scene
            .nodes
            .iter()
            .find(|n| n.name == "stone_platform")
            .unwrap();
        assert!(!platform.animated);
    }

    #[test]
    fn test_fillers_stay_within_footprint() {
        let mut rng = StdRng::seed_from_u64(123);
        let scene = build_scene(&mut rng);

        for node in scene.nodes.iter().filter(|n| n.name.starts_with("filler_")) {
            assert!(node.transform.position.x.abs() <= 5.0);
            assert!(node.transform.position.z.abs() <= 5.0);
            assert!(node.transform.position.y.abs() <= 1.0);

            // Gray-scale material with bounded parameters
            let [r, g, b, a] = node.material.color;
            assert_eq!(r, g);
            assert_eq!(g, b);
            assert_eq!(a, 1.0);
            assert!((0.1..0.4).contains(&r));
            assert!((0.5..1.0).contains(&node.material.roughness));
            assert!((0.0..0.5).contains(&node.material.metalness));
        }
    }

    #[test]
    fn test_seeded_builds_are_reproducible() {
        let scene_a = build_scene(&mut StdRng::seed_from_u64(7));
        let scene_b = build_scene(&mut StdRng::seed_from_u64(7));

        for (a, b) in scene_a.nodes.iter().zip(scene_b.nodes.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.transform.position, b.transform.position);
            assert_eq!(a.material.color, b.material.color);
        }
    }

    #[test]
    fn test_glass_tower_is_translucent() {
        let mut rng = StdRng::seed_from_u64(9);
        let scene = build_scene(&mut rng);
        let glass = scene.nodes.iter().find(|n| n.name == "glass_tower").unwrap();
        assert!((glass.material.color[3] - 0.4).abs() < 1e-6);
    }
}
