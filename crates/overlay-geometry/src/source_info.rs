//! Tracking how frame buffers map into the overlay's coordinate space.
//!
//! The capture subsystem delivers buffers in sensor orientation together
//! with a rotation relative to the display and the active lens facing. The
//! overlay wants one stable description of that stream: oriented dimensions
//! plus a mirror flag. Re-deriving and re-propagating it per frame is wasted
//! work, so the tracker caches the last inputs and only recomputes when
//! rotation, facing, or the buffer dimensions actually change.

use serde::Serialize;

use crate::size::Size;
use crate::transform::RectF;

/// Raw per-frame geometry as reported by the capture subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Buffer width in sensor orientation.
    pub width: u32,
    /// Buffer height in sensor orientation.
    pub height: u32,
    /// Clockwise rotation needed to upright the buffer: 0, 90, 180 or 270.
    pub rotation_degrees: i32,
    /// Whether the active lens faces the user.
    pub is_front_facing: bool,
}

impl FrameGeometry {
    /// Whether the rotation swaps the buffer's axes relative to the overlay.
    pub fn axes_swapped(self) -> bool {
        self.rotation_degrees.rem_euclid(180) != 0
    }

    /// The oriented stream description this geometry produces.
    pub fn source_info(self) -> ImageSourceInfo {
        let (width, height) = if self.axes_swapped() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        ImageSourceInfo {
            width,
            height,
            is_mirrored: self.is_front_facing,
        }
    }

    /// Map a rectangle from raw sensor coordinates into the oriented space
    /// described by [`source_info`](Self::source_info).
    ///
    /// Mirroring is deliberately not applied here; the view transform flips
    /// horizontally at render time, which keeps oriented coordinates
    /// identical for both lens facings.
    pub fn orient_rect(self, rect: RectF) -> RectF {
        let w = self.width as f32;
        let h = self.height as f32;
        match self.rotation_degrees.rem_euclid(360) {
            90 => RectF::new(h - rect.bottom, rect.left, h - rect.top, rect.right),
            180 => RectF::new(w - rect.right, h - rect.bottom, w - rect.left, h - rect.top),
            270 => RectF::new(rect.top, w - rect.right, rect.bottom, w - rect.left),
            _ => rect,
        }
    }
}

/// Oriented dimensions and mirror flag of the analysis stream, in the
/// overlay's native (unrotated, display-relative) coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImageSourceInfo {
    pub width: u32,
    pub height: u32,
    pub is_mirrored: bool,
}

impl ImageSourceInfo {
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Change-detection cache over [`FrameGeometry`].
///
/// Reports `changed = true` on the first observation and whenever any input
/// differs from the previous call; every other call is a no-op returning the
/// cached [`ImageSourceInfo`].
#[derive(Debug, Default)]
pub struct FrameGeometryTracker {
    last: Option<FrameGeometry>,
    info: ImageSourceInfo,
}

impl FrameGeometryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one frame's geometry, recomputing the source info only on
    /// transitions (first frame, rotation, lens switch, dimension change).
    pub fn update_if_needed(&mut self, geometry: FrameGeometry) -> (bool, ImageSourceInfo) {
        if self.last == Some(geometry) {
            return (false, self.info);
        }
        self.last = Some(geometry);
        self.info = geometry.source_info();
        (true, self.info)
    }

    /// The most recent source info, if any frame has been observed.
    pub fn current(&self) -> Option<ImageSourceInfo> {
        self.last.map(|_| self.info)
    }
}
