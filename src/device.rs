//! V4L2 still-camera implementation using the v4l crate.

use log::{debug, warn};
use v4l::buffer::Type;
use v4l::control::{Control, Value};
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::buffer::RGB_CHANNELS;
use crate::camera::{encode_capture, CameraDevice, DeviceCapabilities, RawCapture, Result};
use crate::config::CameraConfig;
use crate::error::CameraError;

/// Packed 24-bit RGB, the only pixel format requested from the driver.
const RGB3: &[u8; 4] = b"RGB3";

/// Buffers queued for a still capture.
const STREAM_BUFFERS: u32 = 4;

/// Standard V4L2 user control IDs.
const CID_BRIGHTNESS: u32 = 0x0098_0900;
const CID_CONTRAST: u32 = 0x0098_0901;
const CID_SATURATION: u32 = 0x0098_0902;
const CID_SHARPNESS: u32 = 0x0098_091b;
const CID_ISO_SENSITIVITY: u32 = 0x009a_0917;

/// Geometry negotiated with the driver when the device is opened.
#[derive(Debug, Clone, Copy)]
struct Negotiated {
    width: u32,
    height: u32,
    stride: usize,
}

/// V4L2 device implementation wrapping the v4l crate.
pub struct V4L2Device {
    device: Device,
    capabilities: DeviceCapabilities,
    config: CameraConfig,
    negotiated: Option<Negotiated>,
}

impl V4L2Device {
    /// Open a V4L2 device by index (e.g., 0 for /dev/video0).
    pub fn open(index: u32) -> Result<Self> {
        let device = Device::new(index as usize)
            .map_err(|err| CameraError::DeviceOpenFailed(err.to_string()))?;

        let caps = device
            .query_caps()
            .map_err(|err| CameraError::DeviceOpenFailed(err.to_string()))?;

        let capabilities = DeviceCapabilities {
            driver: caps.driver,
            card: caps.card,
            bus_info: caps.bus,
            can_capture: caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE),
            can_stream: caps.capabilities.contains(v4l::capability::Flags::STREAMING),
        };

        Ok(Self {
            device,
            capabilities,
            config: CameraConfig::default(),
            negotiated: None,
        })
    }

    fn negotiate_format(&self) -> Result<Negotiated> {
        if self.config.image_width == 0 || self.config.image_height == 0 {
            return Err(CameraError::FormatNotSupported(format!(
                "{}x{} has no pixels",
                self.config.image_width, self.config.image_height
            )));
        }

        let mut fmt = self
            .device
            .format()
            .map_err(|err| CameraError::FormatNotSupported(err.to_string()))?;

        fmt.width = self.config.image_width;
        fmt.height = self.config.image_height;
        fmt.fourcc = FourCC::new(RGB3);

        let fmt = self
            .device
            .set_format(&fmt)
            .map_err(|err| CameraError::FormatNotSupported(err.to_string()))?;

        if fmt.fourcc.repr != *RGB3 {
            return Err(CameraError::FormatNotSupported(format!(
                "driver offered {} instead of RGB3",
                fmt.fourcc
            )));
        }
        if fmt.width != self.config.image_width || fmt.height != self.config.image_height {
            warn!(
                "driver adjusted {}x{} to {}x{}",
                self.config.image_width, self.config.image_height, fmt.width, fmt.height
            );
        }

        Ok(Negotiated {
            width: fmt.width,
            height: fmt.height,
            stride: fmt.stride as usize,
        })
    }

    /// Apply image controls. Drivers differ in what they support, so a
    /// rejected control is logged and skipped.
    fn apply_controls(&self) {
        let config = &self.config;
        let controls = [
            ("sharpness", CID_SHARPNESS, i64::from(config.sharpness)),
            ("contrast", CID_CONTRAST, i64::from(config.contrast)),
            ("brightness", CID_BRIGHTNESS, i64::from(config.brightness)),
            ("saturation", CID_SATURATION, i64::from(config.saturation)),
            ("iso", CID_ISO_SENSITIVITY, i64::from(config.iso)),
        ];
        for (name, id, value) in controls {
            let control = Control {
                id,
                value: Value::Integer(value),
            };
            match self.device.set_control(control) {
                Ok(()) => debug!("{name} set to {value}"),
                Err(err) => warn!("{name} not applied: {err}"),
            }
        }
    }
}

impl CameraDevice for V4L2Device {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn configure(&mut self, config: &CameraConfig) -> Result<()> {
        self.config = config.clone();
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        let negotiated = self.negotiate_format()?;
        self.apply_controls();
        self.negotiated = Some(negotiated);
        Ok(())
    }

    fn grab(&mut self) -> Result<RawCapture> {
        let geometry = self.negotiated.ok_or(CameraError::NotOpen)?;

        let mut stream = Stream::with_buffers(&self.device, Type::VideoCapture, STREAM_BUFFERS)
            .map_err(|err| CameraError::CaptureFailed(err.to_string()))?;
        let (buf, meta) = stream
            .next()
            .map_err(|err| CameraError::CaptureFailed(err.to_string()))?;

        let used = buf.get(..meta.bytesused as usize).unwrap_or(buf);
        let pixels = pack_rows(used, geometry)?;

        let data = encode_capture(
            self.config.encoding,
            &pixels,
            geometry.width,
            geometry.height,
        )?;
        Ok(RawCapture::new(data, geometry.width, geometry.height))
    }

    fn release(&mut self) {
        self.negotiated = None;
    }
}

/// Copy the pixel rows out of a driver buffer, dropping per-row padding.
fn pack_rows(used: &[u8], geometry: Negotiated) -> Result<Vec<u8>> {
    let row_len = geometry.width as usize * RGB_CHANNELS;
    let stride = geometry.stride.max(row_len);
    if stride == 0 {
        return Err(CameraError::FormatNotSupported(
            "driver reported an empty row".to_owned(),
        ));
    }

    let expected = stride * geometry.height as usize;
    if used.len() < expected {
        return Err(CameraError::UnexpectedBufferSize {
            expected,
            actual: used.len(),
        });
    }

    Ok(used
        .chunks(stride)
        .take(geometry.height as usize)
        .flat_map(|row| row.get(..row_len).unwrap_or(row))
        .copied()
        .collect())
}
