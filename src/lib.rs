//! Pi-Still-Motor: still-image capture and stepper-motor control for Raspberry Pi
//!
//! This library owns captured image buffers and their pixel transforms, and
//! sequences a 4-coil stepper motor. Camera and GPIO access sit behind traits,
//! enabling both production use with real hardware and testing with mock devices.

pub mod buffer;
pub mod camera;
pub mod config;
pub mod device;
pub mod error;
pub mod gpio;
pub mod hardware;
pub mod motor;
pub mod persist;
pub mod transform;
pub mod validation;

#[cfg(test)]
pub mod mock;

pub use buffer::{Encoding, ImageBuffer, CAPTURE_TRAILER_LEN};
pub use camera::{CameraController, CameraDevice, CameraSession, DeviceCapabilities, RawCapture};
pub use config::{CameraConfig, HardwareConfig, MotorConfig};
pub use device::V4L2Device;
pub use error::{CameraError, ConfigError, Error, GpioError, ImageError, Result, SaveError};
pub use gpio::{Gpio, PinLevel, PinMode, SysfsGpio};
pub use hardware::HardwareController;
pub use motor::{Direction, MotorController, MotorSession, ThreadDelay, STEP_SEQUENCE};
pub use persist::save;
pub use transform::{flip_horizontal, flip_vertical, strip_header, SkipReason, TransformOutcome};
