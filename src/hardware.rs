//! Owner of both hardware subsystems.

use log::{info, warn};

use crate::camera::{CameraController, CameraDevice};
use crate::config::HardwareConfig;
use crate::gpio::{self, Gpio};
use crate::motor::MotorController;

/// Camera and motor together with their collaborators.
///
/// Dropping the controller releases the camera and returns the motor pins to
/// input mode.
pub struct HardwareController<C: CameraDevice, G: Gpio> {
    camera: CameraController<C>,
    motor: MotorController,
    gpio: G,
    initialized: bool,
}

impl<C: CameraDevice, G: Gpio> HardwareController<C, G> {
    /// Bundle a camera device and a GPIO backend with `config`.
    pub fn new(camera: C, gpio: G, config: HardwareConfig) -> Self {
        Self {
            camera: CameraController::with_config(camera, config.camera),
            motor: MotorController::new(config.motor),
            gpio,
            initialized: false,
        }
    }

    /// Mark the hardware as in use. Calling it again does nothing.
    ///
    /// Construction already builds both controllers and the camera is only
    /// configured when a session opens, so this flag just arms
    /// [`HardwareController::cleanup_all`] and the cleanup on drop.
    pub fn initialize_all(&mut self) {
        if !self.initialized {
            info!("camera: {}", self.camera.device().capabilities().card);
            self.initialized = true;
        }
    }

    /// Whether [`HardwareController::initialize_all`] has run since the last cleanup.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The camera controller.
    pub fn camera(&mut self) -> &mut CameraController<C> {
        &mut self.camera
    }

    /// The motor controller and the GPIO backend it drives, borrowed together.
    pub fn motor(&mut self) -> (&mut MotorController, &mut G) {
        (&mut self.motor, &mut self.gpio)
    }

    /// Release the camera and return the motor pins to input mode.
    ///
    /// Does nothing unless the hardware is initialized.
    pub fn cleanup_all(&mut self) -> gpio::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        self.camera.device_mut().release();
        self.motor.cleanup(&mut self.gpio)
    }
}

impl<C: CameraDevice, G: Gpio> Drop for HardwareController<C, G> {
    fn drop(&mut self) {
        if let Err(err) = self.cleanup_all() {
            warn!("hardware cleanup failed: {err}");
        }
    }
}
