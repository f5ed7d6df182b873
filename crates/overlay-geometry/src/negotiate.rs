//! Output-resolution negotiation.
//!
//! The camera reports what it can produce, the display reports what it can
//! show, and a fixed 1080p ceiling bounds analysis cost. Negotiation picks
//! the single largest hardware mode that stays under both.

use thiserror::Error;

use crate::size::{Size, SmartSize, SIZE_1080P};

/// Failures that make a negotiation round unusable. Callers recover by
/// binding a hardcoded default resolution instead of surfacing these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NegotiationError {
    /// The hardware reported no supported sizes for the requested output
    /// target, which signals an unsupported stream configuration.
    #[error("camera reported no supported output sizes")]
    EmptyCapabilityList,
    /// Every offered capability exceeds the quality cap on at least one
    /// axis. Seen only on hardware whose smallest mode is above 1080p.
    #[error("no supported output size fits within {cap}")]
    NoFittingSize { cap: SmartSize },
}

/// Select the analysis/preview output size for a camera binding.
///
/// The cap is 1080p-equivalent when the display reaches 1080p on either
/// axis, otherwise the display itself: a sub-1080p screen never needs a
/// larger-than-screen buffer, and anything above 1080p buys no detection
/// quality worth the bandwidth.
///
/// Capabilities are ranked by pixel area, largest first, and the first entry
/// fitting the cap on both [`SmartSize`] axes wins. The sort is stable, so
/// equal-area entries keep their hardware enumeration order and repeated
/// negotiations with identical inputs cannot flap between modes.
pub fn select_output_size(
    capabilities: &[Size],
    display: Size,
) -> Result<Size, NegotiationError> {
    if capabilities.is_empty() {
        return Err(NegotiationError::EmptyCapabilityList);
    }

    let screen = SmartSize::from(display);
    let cap = if screen.long >= SIZE_1080P.long || screen.short >= SIZE_1080P.short {
        SIZE_1080P
    } else {
        screen
    };

    let mut ranked: Vec<Size> = capabilities.to_vec();
    ranked.sort_by(|a, b| b.area().cmp(&a.area()));

    ranked
        .into_iter()
        .find(|size| SmartSize::from(*size).fits_within(cap))
        .ok_or(NegotiationError::NoFittingSize { cap })
}
