//! Mock collaborators for testing without hardware.

use embedded_hal::delay::DelayNs;

use crate::camera::{encode_capture, CameraDevice, DeviceCapabilities, RawCapture, Result};
use crate::config::CameraConfig;
use crate::error::{CameraError, GpioError};
use crate::gpio::{self, Gpio, PinLevel, PinMode};
use crate::validation::COLOR_BARS;

/// Test pattern types for mock capture generation.
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// 8 vertical 100% color bars.
    ColorBars,
    /// Solid RGB color.
    Solid(u8, u8, u8),
    /// Color bars with the given number of bytes cut off the end of the capture.
    Truncated(usize),
}

/// Mock camera for testing without hardware.
pub struct MockCamera {
    capabilities: DeviceCapabilities,
    configured: Option<CameraConfig>,
    pattern: TestPattern,
    adjusted_size: Option<(u32, u32)>,
    open: bool,
    open_count: u32,
    release_count: u32,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCamera {
    /// Create a new mock camera producing color bars.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: DeviceCapabilities {
                driver: "mock".to_owned(),
                card: "Mock Camera".to_owned(),
                bus_info: "mock:0".to_owned(),
                can_capture: true,
                can_stream: true,
            },
            configured: None,
            pattern: TestPattern::ColorBars,
            adjusted_size: None,
            open: false,
            open_count: 0,
            release_count: 0,
        }
    }

    /// Set the test pattern for captures.
    #[must_use]
    pub fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Capture at `width` x `height` whatever size is configured, the way a
    /// driver adjusts an unsupported resolution.
    #[must_use]
    pub fn with_adjusted_size(mut self, width: u32, height: u32) -> Self {
        self.adjusted_size = Some((width, height));
        self
    }

    /// Settings passed to the last `configure` call.
    pub const fn configured(&self) -> Option<&CameraConfig> {
        self.configured.as_ref()
    }

    /// Whether the camera is currently open.
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Number of successful opens.
    pub const fn open_count(&self) -> u32 {
        self.open_count
    }

    /// Number of releases of an open camera.
    pub const fn release_count(&self) -> u32 {
        self.release_count
    }
}

impl CameraDevice for MockCamera {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn configure(&mut self, config: &CameraConfig) -> Result<()> {
        self.configured = Some(config.clone());
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.open = true;
        self.open_count += 1;
        Ok(())
    }

    fn grab(&mut self) -> Result<RawCapture> {
        if !self.open {
            return Err(CameraError::NotOpen);
        }
        let config = self.configured.clone().unwrap_or_default();
        let (width, height) = self
            .adjusted_size
            .unwrap_or((config.image_width, config.image_height));

        let pixels = match self.pattern {
            TestPattern::ColorBars | TestPattern::Truncated(_) => color_bars(width, height),
            TestPattern::Solid(r, g, b) => solid(width, height, (r, g, b)),
        };
        let mut data = encode_capture(config.encoding, &pixels, width, height)?;
        if let TestPattern::Truncated(cut) = self.pattern {
            data.truncate(data.len().saturating_sub(cut));
        }
        Ok(RawCapture::new(data, width, height))
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.release_count += 1;
        }
    }
}

/// Packed RGB pixels of 8 vertical color bars.
pub fn color_bars(width: u32, height: u32) -> Vec<u8> {
    let bar_width = (width / 8).max(1);
    let row: Vec<u8> = (0..width)
        .flat_map(|x| {
            let bar_idx = (x / bar_width).min(7) as usize;
            let (r, g, b) = COLOR_BARS.get(bar_idx).copied().unwrap_or_default();
            [r, g, b]
        })
        .collect();
    row.repeat(height as usize)
}

/// Packed RGB pixels of a single color.
pub fn solid(width: u32, height: u32, (r, g, b): (u8, u8, u8)) -> Vec<u8> {
    [r, g, b].repeat(width as usize * height as usize)
}

/// A call recorded by [`MockGpio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioEvent {
    /// `set_pin_mode(pin, mode)`.
    Mode(u32, PinMode),
    /// `write_pin(pin, level)`.
    Write(u32, PinLevel),
}

/// GPIO double that records every successful call.
#[derive(Debug, Default)]
pub struct MockGpio {
    events: Vec<GpioEvent>,
    fail_after: Option<usize>,
}

impl MockGpio {
    /// Create a mock that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call after `calls` successful ones.
    #[must_use]
    pub fn fail_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    /// Recorded calls, oldest first.
    pub fn events(&self) -> &[GpioEvent] {
        &self.events
    }

    fn record(&mut self, pin: u32, event: GpioEvent) -> gpio::Result<()> {
        if self.fail_after.is_some_and(|limit| self.events.len() >= limit) {
            return Err(GpioError::Write {
                pin,
                source: std::io::Error::other("mock failure"),
            });
        }
        self.events.push(event);
        Ok(())
    }
}

impl Gpio for MockGpio {
    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> gpio::Result<()> {
        self.record(pin, GpioEvent::Mode(pin, mode))
    }

    fn write_pin(&mut self, pin: u32, level: PinLevel) -> gpio::Result<()> {
        self.record(pin, GpioEvent::Write(pin, level))
    }
}

/// Delay double that records requested nanoseconds instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    calls: Vec<u32>,
}

impl MockDelay {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested delays in nanoseconds, oldest first.
    pub fn calls(&self) -> &[u32] {
        &self.calls
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_creation() {
        let device = MockCamera::new();
        assert_eq!(device.capabilities().driver, "mock");
        assert!(device.capabilities().can_capture);
        assert!(!device.is_open());
    }

    #[test]
    fn test_mock_camera_release_only_counts_open() {
        let mut device = MockCamera::new();
        device.release();
        assert_eq!(device.release_count(), 0);
        device.open().expect("open should succeed");
        device.release();
        device.release();
        assert_eq!(device.release_count(), 1);
    }

    #[test]
    fn test_color_bars_pattern() {
        let data = color_bars(64, 2);
        assert_eq!(data.len(), 64 * 2 * 3);
        // First bar should be white, last bar black
        assert_eq!(data.get(..3), Some(&[255, 255, 255][..]));
        assert_eq!(data.get(data.len() - 3..), Some(&[0, 0, 0][..]));
    }

    #[test]
    fn test_solid_pattern() {
        let data = solid(4, 4, (128, 64, 192));
        assert_eq!(data.len(), 48);
        assert!(data.chunks_exact(3).all(|px| px == [128, 64, 192]));
    }

    #[test]
    fn test_mock_gpio_failure() {
        let mut gpio = MockGpio::new().fail_after(1);
        assert!(gpio.write_pin(1, PinLevel::High).is_ok());
        assert!(gpio.write_pin(1, PinLevel::Low).is_err());
        assert_eq!(gpio.events(), &[GpioEvent::Write(1, PinLevel::High)]);
    }
}
