// src/lib.rs
//! Backdrop
//!
//! An animated 3D background scene built on wgpu and winit: procedural box
//! architecture, a floating particle field and a camera that glides along a
//! scroll-keyed path with pointer parallax.

pub mod app;
pub mod driver;
pub mod error;
pub mod gfx;
pub mod input;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::BackdropApp;
pub use driver::{AnimationDriver, FrameSink, Playback};
pub use error::BackdropError;

/// Creates a default backdrop application instance
pub fn default() -> BackdropApp {
    BackdropApp::new()
}
