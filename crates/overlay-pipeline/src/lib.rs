//! Live camera → detection → overlay binding runtime.
//!
//! The crate is split into focused submodules:
//! - `config`: lens facing, output targets, and binding configuration.
//! - `ports`: capability and display queries answered by the camera and
//!   windowing collaborators.
//! - `frame`: analysis frames and the release-exactly-once buffer lease.
//! - `detector`: the region-detector capability trait and its errors.
//! - `bind`: resolution negotiation with fallback, orientation handling,
//!   and the bind/rebind/unbind lifecycle.
//! - `pipeline`: the latest-wins detection worker.
//! - `overlay`: shared render state with the lazy image→view transform.
//!
//! Pure geometry (sizes, negotiation math, source-info tracking, the view
//! transform) lives in the `overlay-geometry` crate.

pub use bind::{negotiate_output_size, oriented_target, AnalysisBinding, NegotiatedResolution};
pub use config::{BindConfig, DisplayOrientation, LensFacing, OutputTarget};
pub use detector::{DetectError, Region, RegionDetector};
pub use frame::{AnalysisFrame, FrameFormat, FrameLease};
pub use overlay::{OverlayModel, OverlayShape, SharedOverlay};
pub use pipeline::DetectionPipeline;
pub use ports::{BindError, CameraCapabilities, DisplayQuery};

mod bind;
mod config;
mod detector;
mod frame;
mod overlay;
mod pipeline;
mod ports;
