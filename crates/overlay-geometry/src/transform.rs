//! Projection of oriented image coordinates onto a view surface.

use serde::Serialize;

use crate::size::Size;
use crate::source_info::ImageSourceInfo;

/// Axis-aligned rectangle in a floating-point coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(self) -> f32 {
        self.right - self.left
    }

    pub fn height(self) -> f32 {
        self.bottom - self.top
    }
}

/// Mapping from oriented image-source coordinates to view coordinates.
///
/// The image is scaled uniformly to fill the view, cropping whichever axis
/// overflows symmetrically, and mirrored about the vertical view center when
/// the source stream is mirrored (front camera). Built lazily by the overlay
/// model whenever the source info or the view surface changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayTransform {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    view_width: f32,
    mirrored: bool,
}

impl OverlayTransform {
    /// A transform that maps every point to itself.
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            view_width: 0.0,
            mirrored: false,
        }
    }

    /// Compute the fill-and-crop mapping from `source` into `view`.
    ///
    /// Degenerate inputs (either surface has a zero axis) yield the identity
    /// so rendering before the first frame or before layout stays harmless.
    pub fn between(source: ImageSourceInfo, view: Size) -> Self {
        if source.width == 0 || source.height == 0 || view.width == 0 || view.height == 0 {
            return Self::identity();
        }

        let image_w = source.width as f32;
        let image_h = source.height as f32;
        let view_w = view.width as f32;
        let view_h = view.height as f32;

        let scale = (view_w / image_w).max(view_h / image_h);
        // The non-cropped axis scales exactly to the view, so its offset is 0.
        let offset_x = (image_w * scale - view_w) / 2.0;
        let offset_y = (image_h * scale - view_h) / 2.0;

        Self {
            scale,
            offset_x,
            offset_y,
            view_width: view_w,
            mirrored: source.is_mirrored,
        }
    }

    pub fn map_x(&self, x: f32) -> f32 {
        let mapped = x * self.scale - self.offset_x;
        if self.mirrored {
            self.view_width - mapped
        } else {
            mapped
        }
    }

    pub fn map_y(&self, y: f32) -> f32 {
        y * self.scale - self.offset_y
    }

    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.map_x(x), self.map_y(y))
    }

    /// Map a rectangle, keeping edges ordered when mirroring swaps them.
    pub fn map_rect(&self, rect: RectF) -> RectF {
        let x0 = self.map_x(rect.left);
        let x1 = self.map_x(rect.right);
        RectF {
            left: x0.min(x1),
            top: self.map_y(rect.top),
            right: x0.max(x1),
            bottom: self.map_y(rect.bottom),
        }
    }
}
