//! The detector capability boundary.
//!
//! Concrete detectors (barcode, face, object) live outside this crate; the
//! pipeline only needs "find regions in a frame" plus a way to release the
//! backing native resources. One trait object per binding replaces the
//! per-detector processor subclassing a framework would use.

use serde::Serialize;
use thiserror::Error;

use overlay_geometry::RectF;

use crate::frame::{AnalysisFrame, FrameFormat};

/// One detected object in detector-native coordinates: the unrotated sensor
/// space of the frame that produced it.
#[derive(Clone, Debug, Serialize)]
pub struct Region {
    pub bounds: RectF,
    /// Classification label, e.g. a barcode format or object class name.
    pub label: String,
    pub score: f32,
    /// Decoded content carried by the region, when the detector produces
    /// one (a barcode's raw value, recognized text, ...).
    pub payload: Option<String>,
}

/// Per-frame detector failure. Never fatal to the pipeline: the last-good
/// overlay is retained and the error is reported on the error channel.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detector backend failure: {0}")]
    Backend(String),
    #[error("unsupported frame format {0:?}")]
    UnsupportedFormat(FrameFormat),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Asynchronous region detector as seen by the pipeline.
///
/// `detect` runs on the pipeline's worker thread, never on the capture
/// context, so implementations may block for the duration of one inference.
/// `close` releases native resources and is called exactly once, after the
/// last `detect` has returned.
pub trait RegionDetector: Send {
    fn detect(&mut self, frame: &AnalysisFrame) -> Result<Vec<Region>, DetectError>;

    fn close(&mut self) {}
}
