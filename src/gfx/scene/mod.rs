pub mod builder;
pub mod node;
pub mod particles;
pub mod scene;

// Re-export main types
pub use builder::build_scene;
pub use node::{MaterialParams, SceneNode, Transform};
pub use particles::{ParticleField, PARTICLE_COUNT};
pub use scene::{AmbientLight, DirectionalLight, Fog, Scene};
