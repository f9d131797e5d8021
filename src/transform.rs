//! In-place pixel transforms over raw RGB buffers.
//!
//! Transforms never fail: when a precondition does not hold the buffer is left
//! untouched and the outcome says why.

use std::fmt;

use log::{debug, warn};

use crate::buffer::{Encoding, ImageBuffer, CAPTURE_TRAILER_LEN, RGB_CHANNELS};

/// Why a transform left the buffer unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The buffer is not raw RGB.
    NotRawRgb,
    /// The capture header was already removed.
    HeaderAlreadyRemoved,
    /// The buffer is too small to hold a capture header, or has no data.
    TooSmall,
    /// The capture header must be removed before flipping.
    HeaderPresent,
    /// The buffer has no bytes.
    NoData,
    /// `width * height * 3` exceeds the buffer size.
    DimensionsExceedBuffer,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotRawRgb => "only rgb encoded images can be transformed",
            Self::HeaderAlreadyRemoved => "header already removed",
            Self::TooSmall => "data is too small or missing",
            Self::HeaderPresent => "header must be removed first",
            Self::NoData => "no image data",
            Self::DimensionsExceedBuffer => "image dimensions exceed buffer size",
        };
        f.write_str(reason)
    }
}

/// Result of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum TransformOutcome {
    /// The buffer was modified.
    Applied,
    /// The buffer was left unchanged.
    Skipped(SkipReason),
}

impl TransformOutcome {
    /// Whether the transform modified the buffer.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

fn skip(operation: &str, reason: SkipReason) -> TransformOutcome {
    warn!("abort {operation}: {reason}");
    TransformOutcome::Skipped(reason)
}

/// Remove the capture header from a raw RGB buffer.
///
/// The header occupies the last [`CAPTURE_TRAILER_LEN`] bytes; the first
/// `size - CAPTURE_TRAILER_LEN` bytes are kept.
pub fn strip_header(buffer: &mut ImageBuffer) -> TransformOutcome {
    const OP: &str = "remove header";

    if buffer.encoding() != Some(Encoding::RawRgb) {
        return skip(OP, SkipReason::NotRawRgb);
    }
    if !buffer.has_header {
        return skip(OP, SkipReason::HeaderAlreadyRemoved);
    }
    let size = buffer.size;
    let Some(data) = buffer.data.as_mut().filter(|_| size > CAPTURE_TRAILER_LEN) else {
        return skip(OP, SkipReason::TooSmall);
    };

    let new_size = size - CAPTURE_TRAILER_LEN;
    data.truncate(new_size);
    data.shrink_to_fit();
    buffer.size = new_size;
    buffer.has_header = false;
    debug!("removed {CAPTURE_TRAILER_LEN} byte header, {new_size} bytes remain");
    TransformOutcome::Applied
}

/// Borrow the pixel rows of a header-less raw RGB buffer.
///
/// Yields the pixel bytes and the row length, or the reason the buffer does
/// not qualify.
fn pixel_rows(buffer: &mut ImageBuffer) -> Result<(&mut [u8], usize), SkipReason> {
    if buffer.encoding() != Some(Encoding::RawRgb) {
        return Err(SkipReason::NotRawRgb);
    }
    if buffer.has_header {
        return Err(SkipReason::HeaderPresent);
    }
    let row_len = buffer.row_len();
    let pixel_len = row_len
        .checked_mul(buffer.height() as usize)
        .ok_or(SkipReason::DimensionsExceedBuffer)?;
    let data = buffer.data.as_deref_mut().ok_or(SkipReason::NoData)?;
    let pixels = data
        .get_mut(..pixel_len)
        .ok_or(SkipReason::DimensionsExceedBuffer)?;
    Ok((pixels, row_len))
}

/// Mirror a header-less raw RGB buffer left to right.
///
/// Every row is reversed byte by byte, which also reverses the channel order
/// inside each pixel, so the first and third byte of every pixel are swapped
/// back afterwards.
pub fn flip_horizontal(buffer: &mut ImageBuffer) -> TransformOutcome {
    let (pixels, row_len) = match pixel_rows(buffer) {
        Ok(rows) => rows,
        Err(reason) => return skip("h flip", reason),
    };
    if row_len == 0 {
        return TransformOutcome::Applied;
    }

    for row in pixels.chunks_exact_mut(row_len) {
        row.reverse();
        for pixel in row.chunks_exact_mut(RGB_CHANNELS) {
            pixel.swap(0, 2);
        }
    }
    TransformOutcome::Applied
}

/// Mirror a header-less raw RGB buffer top to bottom by swapping whole rows.
pub fn flip_vertical(buffer: &mut ImageBuffer) -> TransformOutcome {
    let (pixels, row_len) = match pixel_rows(buffer) {
        Ok(rows) => rows,
        Err(reason) => return skip("v flip", reason),
    };
    if row_len == 0 {
        return TransformOutcome::Applied;
    }

    let num_rows = pixels.len() / row_len;
    let (top, rest) = pixels.split_at_mut(num_rows / 2 * row_len);
    // An odd middle row stays at the front of `rest`.
    let bottom_start = (num_rows % 2) * row_len;
    if let Some(bottom) = rest.get_mut(bottom_start..) {
        for (upper, lower) in top
            .chunks_exact_mut(row_len)
            .zip(bottom.chunks_exact_mut(row_len).rev())
        {
            upper.swap_with_slice(lower);
        }
    }
    TransformOutcome::Applied
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for a header-less raw RGB buffer with random pixels.
    fn raw_buffer_strategy() -> impl Strategy<Value = ImageBuffer> {
        (1u32..=16, 1u32..=16).prop_flat_map(|(width, height)| {
            let len = width as usize * height as usize * RGB_CHANNELS;
            proptest::collection::vec(any::<u8>(), len).prop_map(move |bytes| {
                ImageBuffer::from_source(&bytes, len, width, height, Encoding::RawRgb, false)
                    .expect("source is large enough")
            })
        })
    }

    proptest! {
        /// Property: flipping horizontally twice restores the original.
        #[test]
        fn prop_flip_horizontal_involution(original in raw_buffer_strategy()) {
            let mut buffer = original.clone();
            prop_assert!(flip_horizontal(&mut buffer).is_applied());
            prop_assert!(flip_horizontal(&mut buffer).is_applied());
            prop_assert_eq!(buffer, original);
        }

        /// Property: flipping vertically twice restores the original.
        #[test]
        fn prop_flip_vertical_involution(original in raw_buffer_strategy()) {
            let mut buffer = original.clone();
            prop_assert!(flip_vertical(&mut buffer).is_applied());
            prop_assert!(flip_vertical(&mut buffer).is_applied());
            prop_assert_eq!(buffer, original);
        }

        /// Property: a horizontal flip moves pixel (x, y) to (width - 1 - x, y).
        #[test]
        fn prop_flip_horizontal_mirrors_pixels(original in raw_buffer_strategy()) {
            let mut buffer = original.clone();
            prop_assert!(flip_horizontal(&mut buffer).is_applied());
            let width = original.width();
            for y in 0..original.height() {
                for x in 0..width {
                    prop_assert_eq!(buffer.pixel_at(width - 1 - x, y), original.pixel_at(x, y));
                }
            }
        }
    }
}
