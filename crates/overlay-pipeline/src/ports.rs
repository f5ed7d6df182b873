//! Query ports answered by the camera and windowing collaborators.

use thiserror::Error;

use overlay_geometry::Size;

use crate::config::{LensFacing, OutputTarget};

/// Resource-class failures at bind time. Surfaced to the UI shell as a
/// transient condition; the pipeline itself stays idle and re-bindable.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("camera access failed: {0}")]
    CameraUnavailable(String),
    #[error("display information unavailable: {0}")]
    DisplayUnavailable(String),
    #[error("detector unavailable: {0}")]
    DetectorUnavailable(String),
}

/// Capability listing for the camera hardware.
///
/// An `Ok(vec![])` answer is legal and means the requested stream
/// configuration is unsupported; negotiation then falls back to the
/// configured default resolution, exactly as it does on `Err`.
pub trait CameraCapabilities {
    fn supported_output_sizes(
        &self,
        facing: LensFacing,
        target: OutputTarget,
    ) -> Result<Vec<Size>, BindError>;
}

/// Current display geometry. Queried at every (re)binding and never cached
/// across rotations, because the answer is exactly what rotations change.
pub trait DisplayQuery {
    fn display_size(&self) -> Result<Size, BindError>;
}
