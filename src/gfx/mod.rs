//! # Graphics Module
//!
//! Everything the backdrop draws with: the camera rig, procedural box
//! geometry, the scene graph of animated nodes and particles, the debug
//! helper overlay and the wgpu render engine that turns it all into frames.
//!
//! The render engine is the only part that touches the GPU. Scene, camera
//! and geometry are plain data and stay fully usable in headless tests.

pub mod camera;
pub mod geometry;
pub mod gizmos;
pub mod render_engine;
pub mod scene;
pub mod vertex;

// Re-export commonly used types
pub use camera::{CameraRig, CameraUniform};
pub use render_engine::RenderEngine;
pub use scene::Scene;
