//! Frame buffers and their ownership discipline.
//!
//! Buffers belong to the capture subsystem: one that is never handed back
//! stalls the camera stream. [`FrameLease`] makes the hand-back automatic
//! and exactly-once, whichever path a frame takes through the pipeline
//! (analyzed, dropped while busy, or ignored after stop).

use chrono::Utc;

use overlay_geometry::FrameGeometry;

use crate::config::LensFacing;

/// Pixel layout of an analysis frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    /// Planar YUV 4:2:0, the native analysis format on most camera stacks.
    Yuv420,
    /// Packed 8-bit BGR.
    Bgr8,
}

/// Raw frame as delivered by the capture subsystem.
pub struct AnalysisFrame {
    pub data: Vec<u8>,
    /// Buffer width in sensor orientation.
    pub width: u32,
    /// Buffer height in sensor orientation.
    pub height: u32,
    /// Clockwise rotation needed to upright the buffer for the display.
    pub rotation_degrees: i32,
    pub timestamp_ms: i64,
    pub format: FrameFormat,
}

impl AnalysisFrame {
    /// Build a frame stamped with the current wall-clock time.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        rotation_degrees: i32,
        format: FrameFormat,
    ) -> Self {
        Self {
            data,
            width,
            height,
            rotation_degrees,
            timestamp_ms: Utc::now().timestamp_millis(),
            format,
        }
    }

    /// The geometry inputs this frame contributes to overlay alignment.
    pub fn geometry(&self, facing: LensFacing) -> FrameGeometry {
        FrameGeometry {
            width: self.width,
            height: self.height,
            rotation_degrees: self.rotation_degrees,
            is_front_facing: facing.is_front(),
        }
    }
}

/// Scoped lease over a capture buffer, released exactly once on drop.
pub struct FrameLease {
    frame: AnalysisFrame,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl FrameLease {
    /// Lease a frame whose buffer needs no hand-back (owned copies, tests).
    pub fn detached(frame: AnalysisFrame) -> Self {
        Self {
            frame,
            release: None,
        }
    }

    /// Lease a frame with a release hook invoked when the lease drops.
    pub fn with_release(frame: AnalysisFrame, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            frame,
            release: Some(Box::new(release)),
        }
    }

    pub fn frame(&self) -> &AnalysisFrame {
        &self.frame
    }
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}
