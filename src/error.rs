//! Error types for the Backdrop engine
//!
//! Construction of the render surface is the only fallible operation in the
//! engine. A failure here is non-fatal by design: the host application keeps
//! running and simply leaves the backdrop disabled.

use thiserror::Error;

/// Errors that can occur while bringing up the backdrop.
#[derive(Debug, Error)]
pub enum BackdropError {
    /// No drawable surface could be created for the window.
    #[error("drawable surface unavailable")]
    SurfaceUnavailable(#[from] wgpu::CreateSurfaceError),

    /// No GPU adapter is compatible with the surface.
    #[error("no compatible GPU adapter found")]
    AdapterUnavailable,

    /// The adapter refused to provide a device.
    #[error("GPU device request failed")]
    DeviceUnavailable(#[from] wgpu::RequestDeviceError),
}
