pub mod camera_utils;
pub mod rig;

// Re-export main types
pub use camera_utils::CameraUniform;
pub use rig::CameraRig;
