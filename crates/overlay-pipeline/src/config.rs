//! Binding configuration shared by negotiation and the pipeline.

use serde::{Deserialize, Serialize};

use overlay_geometry::Size;

/// Which physical camera feeds the analysis stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LensFacing {
    #[default]
    Back,
    Front,
}

impl LensFacing {
    pub fn is_front(self) -> bool {
        matches!(self, LensFacing::Front)
    }

    /// The opposite lens, used when the user switches cameras.
    pub fn toggled(self) -> Self {
        match self {
            LensFacing::Back => LensFacing::Front,
            LensFacing::Front => LensFacing::Back,
        }
    }
}

/// Output stream a capability query is scoped to. Analysis and preview are
/// negotiated independently because the hardware reports different mode
/// lists per consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputTarget {
    Analysis,
    Preview,
}

/// Current display orientation relative to its natural axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayOrientation {
    Landscape,
    Portrait,
}

/// Canonical configuration for one camera binding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BindConfig {
    /// Lens the binding targets.
    pub lens_facing: LensFacing,
    /// Resolution bound when negotiation is unavailable (empty capability
    /// list, capability/display query failure, or no mode under the cap).
    pub fallback_size: Size,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            lens_facing: LensFacing::Back,
            fallback_size: Size::new(1920, 1080),
        }
    }
}
