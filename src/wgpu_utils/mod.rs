//! Small wgpu helpers shared by the render engine.

pub mod uniform_buffer;

pub use uniform_buffer::UniformBuffer;
