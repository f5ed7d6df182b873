//! Negotiation-driven camera binding.
//!
//! A binding round happens at startup and again on every device rotation or
//! camera switch: query the display, query the hardware capability list,
//! negotiate an output size (or fall back), and stand up a fresh pipeline
//! with a clean geometry cache.

use serde::Serialize;
use tracing::{debug, warn};

use overlay_geometry::{select_output_size, Size};

use crate::config::{BindConfig, DisplayOrientation, OutputTarget};
use crate::detector::RegionDetector;
use crate::frame::FrameLease;
use crate::overlay::SharedOverlay;
use crate::pipeline::DetectionPipeline;
use crate::ports::{CameraCapabilities, DisplayQuery};

/// Resolution chosen by one negotiation round, with provenance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NegotiatedResolution {
    /// Chosen size, in sensor-landscape order.
    pub size: Size,
    /// Whether the configured fallback was bound instead of a negotiated
    /// hardware mode.
    pub is_fallback: bool,
}

/// Negotiate the output size for `target`, falling back to
/// `config.fallback_size` when negotiation is unavailable.
///
/// Fallback paths (failed display query, failed or empty capability query,
/// no mode under the quality cap) are configuration-class conditions: logged
/// at warn, never surfaced to the user.
pub fn negotiate_output_size(
    capabilities: &dyn CameraCapabilities,
    display: &dyn DisplayQuery,
    config: &BindConfig,
    target: OutputTarget,
) -> NegotiatedResolution {
    let fallback = NegotiatedResolution {
        size: config.fallback_size,
        is_fallback: true,
    };

    let display_size = match display.display_size() {
        Ok(size) => size,
        Err(err) => {
            warn!("display query failed: {err}; binding fallback {}", fallback.size);
            return fallback;
        }
    };

    let modes = match capabilities.supported_output_sizes(config.lens_facing, target) {
        Ok(modes) => modes,
        Err(err) => {
            warn!("capability query failed: {err}; binding fallback {}", fallback.size);
            return fallback;
        }
    };

    match select_output_size(&modes, display_size) {
        Ok(size) => {
            debug!(%size, %display_size, ?target, "negotiated output size");
            NegotiatedResolution {
                size,
                is_fallback: false,
            }
        }
        Err(err) => {
            warn!("resolution negotiation failed: {err}; binding fallback {}", fallback.size);
            fallback
        }
    }
}

/// Orient a negotiated size for the current display orientation. Negotiated
/// sizes are in sensor-landscape order, so portrait requests swap the axes;
/// the underlying oriented size is preserved either way.
pub fn oriented_target(size: Size, orientation: DisplayOrientation) -> Size {
    match orientation {
        DisplayOrientation::Portrait => size.transposed(),
        DisplayOrientation::Landscape => size,
    }
}

/// One live analysis binding: a negotiated resolution plus the pipeline
/// consuming the stream bound at it.
pub struct AnalysisBinding {
    config: BindConfig,
    resolution: NegotiatedResolution,
    overlay: SharedOverlay,
    pipeline: DetectionPipeline,
}

impl AnalysisBinding {
    /// Negotiate and stand up a pipeline for the analysis stream.
    pub fn bind(
        capabilities: &dyn CameraCapabilities,
        display: &dyn DisplayQuery,
        config: BindConfig,
        detector: Box<dyn RegionDetector>,
        overlay: SharedOverlay,
    ) -> Self {
        let resolution =
            negotiate_output_size(capabilities, display, &config, OutputTarget::Analysis);
        let pipeline = DetectionPipeline::spawn(detector, overlay.clone(), config.lens_facing);
        Self {
            config,
            resolution,
            overlay,
            pipeline,
        }
    }

    pub fn resolution(&self) -> NegotiatedResolution {
        self.resolution
    }

    /// The size to request from the capture subsystem for the given display
    /// orientation.
    pub fn target_resolution(&self, orientation: DisplayOrientation) -> Size {
        oriented_target(self.resolution.size, orientation)
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Forward one camera frame to the pipeline.
    pub fn submit(&mut self, lease: FrameLease) {
        self.pipeline.submit(lease);
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    /// Renegotiate and restart the pipeline with a fresh detector instance
    /// and a clean geometry cache. Used on device rotation; display and
    /// capability queries are repeated, never reused from the last round.
    pub fn rebind(
        &mut self,
        capabilities: &dyn CameraCapabilities,
        display: &dyn DisplayQuery,
        detector: Box<dyn RegionDetector>,
    ) {
        self.pipeline.stop();
        self.resolution =
            negotiate_output_size(capabilities, display, &self.config, OutputTarget::Analysis);
        self.pipeline =
            DetectionPipeline::spawn(detector, self.overlay.clone(), self.config.lens_facing);
    }

    /// Switch to the opposite lens and rebind. Mirroring follows the new
    /// facing automatically on the first frame through the geometry tracker.
    pub fn switch_camera(
        &mut self,
        capabilities: &dyn CameraCapabilities,
        display: &dyn DisplayQuery,
        detector: Box<dyn RegionDetector>,
    ) {
        self.config.lens_facing = self.config.lens_facing.toggled();
        self.rebind(capabilities, display, detector);
    }

    /// Stop the pipeline and clear the overlay.
    pub fn unbind(mut self) {
        self.pipeline.stop();
        self.overlay.clear();
    }
}
