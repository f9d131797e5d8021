//! GPIO abstraction and the Linux sysfs backend.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::GpioError;

/// Result type for GPIO operations.
pub type Result<T> = std::result::Result<T, GpioError>;

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// High-impedance input, the safe idle state.
    Input,
    /// Driven output.
    Output,
}

/// Digital pin level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic 0.
    Low,
    /// Logic 1.
    High,
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Abstraction over a GPIO controller.
pub trait Gpio {
    /// Set the direction of `pin`.
    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> Result<()>;

    /// Drive `pin` to `level`. The pin must be in output mode.
    fn write_pin(&mut self, pin: u32, level: PinLevel) -> Result<()>;
}

impl<T: Gpio + ?Sized> Gpio for &mut T {
    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> Result<()> {
        (**self).set_pin_mode(pin, mode)
    }

    fn write_pin(&mut self, pin: u32, level: PinLevel) -> Result<()> {
        (**self).write_pin(pin, level)
    }
}

/// Default sysfs GPIO root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// GPIO backend using the Linux sysfs interface.
///
/// Pins are exported on first use and stay exported; pin identifiers are the
/// kernel's GPIO numbers.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsGpio {
    /// Create a backend rooted at `/sys/class/gpio`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(SYSFS_GPIO_ROOT)
    }

    /// Create a backend rooted at a different sysfs directory.
    #[must_use]
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn ensure_exported(&self, pin: u32) -> Result<()> {
        if self.pin_dir(pin).exists() {
            return Ok(());
        }
        debug!("exporting gpio{pin}");
        fs::write(self.root.join("export"), pin.to_string())
            .map_err(|source| GpioError::Export { pin, source })
    }
}

impl Gpio for SysfsGpio {
    fn set_pin_mode(&mut self, pin: u32, mode: PinMode) -> Result<()> {
        self.ensure_exported(pin)?;
        let direction = match mode {
            PinMode::Input => "in",
            PinMode::Output => "out",
        };
        fs::write(self.pin_dir(pin).join("direction"), direction)
            .map_err(|source| GpioError::Mode { pin, source })
    }

    fn write_pin(&mut self, pin: u32, level: PinLevel) -> Result<()> {
        let value = match level {
            PinLevel::Low => "0",
            PinLevel::High => "1",
        };
        fs::write(self.pin_dir(pin).join("value"), value)
            .map_err(|source| GpioError::Write { pin, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).expect("file should exist")
    }

    #[test]
    fn test_sysfs_exported_pin() {
        let root = tempfile::tempdir().expect("tempdir");
        fs::create_dir(root.path().join("gpio25")).expect("create pin dir");
        let mut gpio = SysfsGpio::with_root(root.path());

        gpio.set_pin_mode(25, PinMode::Output).expect("set mode");
        assert_eq!(read(&root.path().join("gpio25/direction")), "out");

        gpio.write_pin(25, PinLevel::High).expect("write high");
        assert_eq!(read(&root.path().join("gpio25/value")), "1");
        gpio.write_pin(25, PinLevel::Low).expect("write low");
        assert_eq!(read(&root.path().join("gpio25/value")), "0");

        gpio.set_pin_mode(25, PinMode::Input).expect("set mode");
        assert_eq!(read(&root.path().join("gpio25/direction")), "in");
        assert!(!root.path().join("export").exists());
    }

    #[test]
    fn test_sysfs_exports_unknown_pin() {
        let root = tempfile::tempdir().expect("tempdir");
        let mut gpio = SysfsGpio::with_root(root.path());

        // Without a kernel behind the directory the pin never appears.
        let err = gpio
            .set_pin_mode(7, PinMode::Output)
            .expect_err("pin directory is missing");
        assert!(matches!(err, GpioError::Mode { pin: 7, .. }));
        assert_eq!(read(&root.path().join("export")), "7");
    }

    #[test]
    fn test_sysfs_write_missing_pin() {
        let root = tempfile::tempdir().expect("tempdir");
        let mut gpio = SysfsGpio::with_root(root.path());
        let err = gpio
            .write_pin(3, PinLevel::High)
            .expect_err("pin directory is missing");
        assert!(matches!(err, GpioError::Write { pin: 3, .. }));
    }

    #[test]
    fn test_level_from_bool() {
        assert_eq!(PinLevel::from(true), PinLevel::High);
        assert_eq!(PinLevel::from(false), PinLevel::Low);
    }
}
