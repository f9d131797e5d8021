//! Camera and motor configuration.
//!
//! Every field has a default matching the reference rig, so a config file
//! only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::buffer::Encoding;
use crate::error::ConfigError;

/// Still-camera settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Sharpness, -100 to 100.
    pub sharpness: i32,
    /// Contrast, -100 to 100.
    pub contrast: i32,
    /// Brightness, 0 to 100.
    pub brightness: u32,
    /// Saturation, -100 to 100.
    pub saturation: i32,
    /// ISO sensitivity, 100 to 800.
    pub iso: i32,
    /// Image width in pixels. Should be a multiple of 320.
    pub image_width: u32,
    /// Image height in pixels. Should be a multiple of 240.
    pub image_height: u32,
    /// Capture encoding.
    pub encoding: Encoding,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sharpness: 0,
            contrast: 0,
            brightness: 50,
            saturation: 0,
            iso: 700,
            image_width: 320,
            image_height: 240,
            encoding: Encoding::Png,
        }
    }
}

/// Stepper motor settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Semi-steps per full output-shaft revolution.
    pub steps_per_revolution: u32,
    /// Pause after every semi-step, in milliseconds.
    pub step_delay_ms: u32,
    /// GPIO pins driving coils 0 to 3.
    pub pins: [u32; 4],
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: 4096,
            step_delay_ms: 2,
            pins: [25, 24, 23, 22],
        }
    }
}

/// Settings for both subsystems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Camera settings.
    pub camera: CameraConfig,
    /// Motor settings.
    pub motor: MotorConfig,
}

impl HardwareConfig {
    /// Load a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
