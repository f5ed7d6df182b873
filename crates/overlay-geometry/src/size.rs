use std::fmt;

use serde::{Deserialize, Serialize};

/// Oriented pixel dimensions of a buffer, display, or camera output.
///
/// Width and height are meaningful as stated: a 1080×1920 display is a
/// portrait display, not a landscape one. Comparison logic that must ignore
/// orientation goes through [`SmartSize`] instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel count, widened to avoid overflow on large sensor modes.
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The same size with its axes swapped.
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Orientation-independent projection of a [`Size`]: its longest and
/// shortest side. Invariant: `long >= short`.
///
/// Used only for capability comparison. The oriented [`Size`] that produced
/// a `SmartSize` is what gets bound to the camera, never the projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmartSize {
    pub long: u32,
    pub short: u32,
}

impl SmartSize {
    /// Whether this size fits inside `bound` on both axes.
    pub const fn fits_within(self, bound: SmartSize) -> bool {
        self.long <= bound.long && self.short <= bound.short
    }
}

impl From<Size> for SmartSize {
    fn from(size: Size) -> Self {
        Self {
            long: size.width.max(size.height),
            short: size.width.min(size.height),
        }
    }
}

impl fmt::Display for SmartSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.long, self.short)
    }
}

/// Quality ceiling for analysis streams: no output larger than
/// 1080p-equivalent is ever negotiated, whatever the hardware offers.
pub const SIZE_1080P: SmartSize = SmartSize {
    long: 1920,
    short: 1080,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_size_orders_axes() {
        assert_eq!(
            SmartSize::from(Size::new(1080, 2400)),
            SmartSize {
                long: 2400,
                short: 1080
            }
        );
        assert_eq!(
            SmartSize::from(Size::new(1920, 1080)),
            SmartSize::from(Size::new(1080, 1920))
        );
    }

    #[test]
    fn fits_within_requires_both_axes() {
        let cap = SIZE_1080P;
        assert!(SmartSize::from(Size::new(1920, 1080)).fits_within(cap));
        assert!(SmartSize::from(Size::new(1280, 960)).fits_within(cap));
        // Long side fits, short side does not.
        assert!(!SmartSize::from(Size::new(1920, 1440)).fits_within(cap));
        assert!(!SmartSize::from(Size::new(4000, 3000)).fits_within(cap));
    }

    #[test]
    fn transposed_swaps_axes() {
        assert_eq!(Size::new(640, 480).transposed(), Size::new(480, 640));
    }
}
