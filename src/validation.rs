//! Capture validation utilities.
//!
//! Layout checks used on the capture path, and a test-pattern check useful
//! for integration testing with virtual cameras.

use crate::buffer::{ImageBuffer, CAPTURE_TRAILER_LEN, RGB_CHANNELS};
use crate::error::CameraError;

/// RGB values of 100% color bars.
///
/// Colors in order: White, Yellow, Cyan, Green, Magenta, Red, Blue, Black
pub const COLOR_BARS: [(u8, u8, u8); 8] = [
    (255, 255, 255), // White
    (255, 255, 0),   // Yellow
    (0, 255, 255),   // Cyan
    (0, 255, 0),     // Green
    (255, 0, 255),   // Magenta
    (255, 0, 0),     // Red
    (0, 0, 255),     // Blue
    (0, 0, 0),       // Black
];

/// Tolerance for RGB color matching (accounts for sensor and driver rounding).
const COLOR_TOLERANCE: u8 = 15;

/// Size of a raw RGB capture: packed pixels followed by the capture trailer.
#[must_use]
pub fn expected_raw_capture_size(width: u32, height: u32) -> usize {
    width as usize * height as usize * RGB_CHANNELS + CAPTURE_TRAILER_LEN
}

/// Check that a raw RGB capture has exactly the size its dimensions imply.
///
/// # Errors
///
/// Returns `UnexpectedBufferSize` when `size` differs from
/// [`expected_raw_capture_size`].
pub fn validate_raw_capture(size: usize, width: u32, height: u32) -> Result<(), CameraError> {
    let expected = expected_raw_capture_size(width, height);
    if size == expected {
        Ok(())
    } else {
        Err(CameraError::UnexpectedBufferSize {
            expected,
            actual: size,
        })
    }
}

/// Validates that a header-less raw RGB buffer contains 8 vertical color bars.
///
/// Each bar is sampled at its center on the middle row.
///
/// # Errors
///
/// Returns `CaptureFailed` if a sample is out of bounds or any bar doesn't
/// match the expected color within tolerance.
pub fn validate_color_bars(buffer: &ImageBuffer) -> Result<(), CameraError> {
    let bar_width = buffer.width() / 8;
    let center_y = buffer.height() / 2;

    for (bar_idx, expected_rgb) in (0u32..).zip(COLOR_BARS.iter()) {
        // Sample the center of each bar
        let sample_x = (bar_idx * bar_width) + (bar_width / 2);

        let actual_rgb = buffer.pixel_at(sample_x, center_y).ok_or_else(|| {
            CameraError::CaptureFailed(format!(
                "Failed to get pixel at ({sample_x}, {center_y})"
            ))
        })?;

        if !colors_match(actual_rgb, *expected_rgb, COLOR_TOLERANCE) {
            return Err(CameraError::CaptureFailed(format!(
                "Color bar {bar_idx} mismatch at ({sample_x}, {center_y}): \
                 expected RGB{expected_rgb:?}, got RGB{actual_rgb:?}"
            )));
        }
    }

    Ok(())
}

/// Check if two RGB colors match within a per-channel tolerance.
fn colors_match(actual: (u8, u8, u8), expected: (u8, u8, u8), tolerance: u8) -> bool {
    let (ar, ag, ab) = actual;
    let (er, eg, eb) = expected;

    ar.abs_diff(er) <= tolerance && ag.abs_diff(eg) <= tolerance && ab.abs_diff(eb) <= tolerance
}
