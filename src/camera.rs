//! Still-camera abstraction and the controller that turns raw captures into
//! [`ImageBuffer`]s.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use log::{debug, info};

use crate::buffer::{Encoding, ImageBuffer, CAPTURE_TRAILER_LEN};
use crate::config::CameraConfig;
use crate::error::{CameraError, ConfigError};
use crate::validation::validate_raw_capture;

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;

/// Device capability flags.
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Driver name.
    pub driver: String,
    /// Card/device name.
    pub card: String,
    /// Bus information.
    pub bus_info: String,
    /// Whether the device can capture video.
    pub can_capture: bool,
    /// Whether the device supports streaming.
    pub can_stream: bool,
}

/// Bytes handed over by the camera for one still.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCapture {
    /// Size of the capture in bytes.
    pub size: usize,
    /// Captured bytes, at least `size` long.
    pub data: Vec<u8>,
    /// Width the device actually captured at.
    pub width: u32,
    /// Height the device actually captured at.
    pub height: u32,
}

impl RawCapture {
    /// Wrap a complete `width` x `height` capture.
    #[must_use]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            size: data.len(),
            data,
            width,
            height,
        }
    }
}

/// Abstraction over a still camera.
pub trait CameraDevice {
    /// Get device capabilities.
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Apply resolution, encoding and image controls. Takes effect on the
    /// next [`CameraDevice::open`].
    fn configure(&mut self, config: &CameraConfig) -> Result<()>;

    /// Start the device.
    fn open(&mut self) -> Result<()>;

    /// Capture one still in the configured encoding.
    fn grab(&mut self) -> Result<RawCapture>;

    /// Stop the device. Releasing a closed device does nothing.
    fn release(&mut self);
}

impl<T: CameraDevice + ?Sized> CameraDevice for &mut T {
    fn capabilities(&self) -> &DeviceCapabilities {
        (**self).capabilities()
    }

    fn configure(&mut self, config: &CameraConfig) -> Result<()> {
        (**self).configure(config)
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn grab(&mut self) -> Result<RawCapture> {
        (**self).grab()
    }

    fn release(&mut self) {
        (**self).release();
    }
}

/// Encode packed RGB pixels into the byte layout the camera hands over for
/// `encoding`.
///
/// Raw RGB captures carry a 54-byte bitmap trailer after the pixels.
pub fn encode_capture(
    encoding: Encoding,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match encoding {
        Encoding::Png => {
            PngEncoder::new(&mut out).write_image(
                pixels,
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        Encoding::Jpeg => {
            JpegEncoder::new(&mut out).write_image(
                pixels,
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        Encoding::RawRgb => {
            out.reserve_exact(pixels.len() + CAPTURE_TRAILER_LEN);
            out.extend_from_slice(pixels);
            out.extend_from_slice(&bitmap_trailer(width, height));
        }
    }
    Ok(out)
}

/// 14-byte file header plus 40-byte info header of a 24-bit bitmap.
fn bitmap_trailer(width: u32, height: u32) -> Vec<u8> {
    let pixel_bytes = u64::from(width) * u64::from(height) * 3;
    let image_size = u32::try_from(pixel_bytes).unwrap_or(u32::MAX);
    let file_size = image_size.saturating_add(54);
    let signed = |value: u32| i32::try_from(value).unwrap_or(i32::MAX);

    let mut trailer = Vec::with_capacity(CAPTURE_TRAILER_LEN);
    trailer.extend_from_slice(b"BM");
    trailer.extend_from_slice(&file_size.to_le_bytes());
    trailer.extend_from_slice(&[0; 4]);
    trailer.extend_from_slice(&54u32.to_le_bytes());
    trailer.extend_from_slice(&40u32.to_le_bytes());
    trailer.extend_from_slice(&signed(width).to_le_bytes());
    trailer.extend_from_slice(&signed(height).to_le_bytes());
    trailer.extend_from_slice(&1u16.to_le_bytes());
    trailer.extend_from_slice(&24u16.to_le_bytes());
    trailer.extend_from_slice(&0u32.to_le_bytes());
    trailer.extend_from_slice(&image_size.to_le_bytes());
    trailer.extend_from_slice(&2835u32.to_le_bytes());
    trailer.extend_from_slice(&2835u32.to_le_bytes());
    trailer.extend_from_slice(&[0; 8]);
    trailer
}

/// Holds the camera settings and hands out capture sessions.
pub struct CameraController<C: CameraDevice> {
    device: C,
    config: CameraConfig,
}

impl<C: CameraDevice> CameraController<C> {
    /// Create a controller with the default settings.
    pub fn new(device: C) -> Self {
        Self::with_config(device, CameraConfig::default())
    }

    /// Create a controller with explicit settings.
    pub const fn with_config(device: C, config: CameraConfig) -> Self {
        Self { device, config }
    }

    /// Current settings.
    pub const fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// The underlying device.
    pub const fn device(&self) -> &C {
        &self.device
    }

    /// Mutable access to the underlying device.
    pub fn device_mut(&mut self) -> &mut C {
        &mut self.device
    }

    /// Set the image width. Should be a multiple of 320.
    pub fn set_image_width(&mut self, width: u32) {
        self.config.image_width = width;
    }

    /// Set the image height. Should be a multiple of 240.
    pub fn set_image_height(&mut self, height: u32) {
        self.config.image_height = height;
    }

    /// Set the image encoding by name: `png`, `jpeg` or `rgb`.
    ///
    /// Any other name is rejected and the current encoding is kept.
    pub fn set_image_encoding(&mut self, name: &str) -> std::result::Result<(), ConfigError> {
        self.config.encoding = name.parse()?;
        Ok(())
    }

    /// Image width in pixels.
    pub const fn image_width(&self) -> u32 {
        self.config.image_width
    }

    /// Image height in pixels.
    pub const fn image_height(&self) -> u32 {
        self.config.image_height
    }

    /// Image encoding.
    pub const fn image_encoding(&self) -> Encoding {
        self.config.encoding
    }

    /// Configure and open the camera. The returned session releases it when
    /// dropped.
    pub fn open_camera(&mut self) -> Result<CameraSession<'_, C>> {
        self.device.configure(&self.config)?;
        self.device.open()?;
        info!(
            "camera open: {}x{} {}",
            self.config.image_width, self.config.image_height, self.config.encoding
        );
        Ok(CameraSession { controller: self })
    }
}

/// An open camera. Dropping the session releases the device.
pub struct CameraSession<'a, C: CameraDevice> {
    controller: &'a mut CameraController<C>,
}

impl<C: CameraDevice> CameraSession<'_, C> {
    /// Capture one still into a new buffer with its header attached.
    ///
    /// The buffer carries the dimensions the device captured at, which may
    /// differ from the configured ones when the driver adjusts them.
    pub fn capture_image(&mut self) -> Result<ImageBuffer> {
        let encoding = self.controller.config.encoding;

        let capture = self.controller.device.grab()?;
        debug!(
            "captured {} bytes at {}x{}",
            capture.size, capture.width, capture.height
        );
        if encoding == Encoding::RawRgb {
            validate_raw_capture(capture.size, capture.width, capture.height)?;
        }
        Ok(ImageBuffer::from_source(
            &capture.data,
            capture.size,
            capture.width,
            capture.height,
            encoding,
            true,
        )?)
    }
}

impl<C: CameraDevice> Drop for CameraSession<'_, C> {
    fn drop(&mut self) {
        self.controller.device.release();
        info!("camera released");
    }
}
