//! Geometry for binding a live camera feed to a detection overlay.
//!
//! A camera sensor, the device display, and a detector all speak different
//! coordinate spaces. This crate holds the pure math that reconciles them:
//! - `size`: oriented sizes and their orientation-independent projection.
//! - `negotiate`: choosing an output resolution from hardware capabilities.
//! - `source_info`: tracking how frame buffers map into overlay space as
//!   rotation and lens facing change.
//! - `transform`: projecting oriented image coordinates onto a view surface.
//!
//! Everything here is synchronous and allocation-light; the runtime side
//! (frame delivery, detector hand-off, shared overlay state) lives in
//! `overlay-pipeline`.

pub use negotiate::{select_output_size, NegotiationError};
pub use size::{Size, SmartSize, SIZE_1080P};
pub use source_info::{FrameGeometry, FrameGeometryTracker, ImageSourceInfo};
pub use transform::{OverlayTransform, RectF};

mod negotiate;
mod size;
mod source_info;
mod transform;
