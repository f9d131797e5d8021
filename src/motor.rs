//! Half-step sequencing for a 4-coil unipolar stepper motor.

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::MotorConfig;
use crate::gpio::{Gpio, PinLevel, PinMode, Result};

const H: PinLevel = PinLevel::High;
const L: PinLevel = PinLevel::Low;

/// Number of semi-steps in one coil cycle.
pub const SEMI_STEPS: usize = 8;

/// Coil activation pattern for each semi-step, coils 0 to 3.
pub const STEP_SEQUENCE: [[PinLevel; 4]; SEMI_STEPS] = [
    [H, L, L, H],
    [H, L, L, L],
    [H, H, L, L],
    [L, H, L, L],
    [L, H, H, L],
    [L, L, H, L],
    [L, L, H, H],
    [L, L, L, H],
];

/// Rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Patterns drive pins in mapping order.
    Clockwise,
    /// Patterns drive pins in reverse mapping order.
    CounterClockwise,
}

impl Direction {
    /// Map the control program's sign convention: `1` is clockwise, anything
    /// else counter-clockwise.
    #[must_use]
    pub const fn from_sign(sign: i32) -> Self {
        if sign == 1 {
            Self::Clockwise
        } else {
            Self::CounterClockwise
        }
    }
}

/// [`DelayNs`] that sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Drives a stepper motor through a [`Gpio`] collaborator.
///
/// The controller holds only the pin mapping and timing; it does not track
/// the shaft angle.
#[derive(Debug, Clone, Default)]
pub struct MotorController {
    config: MotorConfig,
}

impl MotorController {
    /// Create a controller from `config`.
    #[must_use]
    pub const fn new(config: MotorConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &MotorConfig {
        &self.config
    }

    /// GPIO pins driving coils 0 to 3.
    #[must_use]
    pub const fn pins(&self) -> [u32; 4] {
        self.config.pins
    }

    /// Replace the pin mapping.
    ///
    /// The previous pins keep their mode: call [`MotorController::cleanup`]
    /// first and [`MotorController::enable_output_mode`] afterwards.
    pub fn set_pins(&mut self, pin0: u32, pin1: u32, pin2: u32, pin3: u32) {
        self.config.pins = [pin0, pin1, pin2, pin3];
    }

    /// Semi-steps needed to turn `degrees`, truncated.
    #[must_use]
    pub fn steps_for(&self, degrees: u32) -> u64 {
        u64::from(self.config.steps_per_revolution) * u64::from(degrees) / 360
    }

    /// Put all mapped pins in output mode.
    pub fn enable_output_mode<G: Gpio>(&self, gpio: &mut G) -> Result<()> {
        self.set_mode(gpio, PinMode::Output)
    }

    /// Return all mapped pins to input mode.
    pub fn cleanup<G: Gpio>(&self, gpio: &mut G) -> Result<()> {
        self.set_mode(gpio, PinMode::Input)?;
        info!("motor pins {:?} released", self.config.pins);
        Ok(())
    }

    fn set_mode<G: Gpio>(&self, gpio: &mut G, mode: PinMode) -> Result<()> {
        self.config
            .pins
            .iter()
            .try_for_each(|&pin| gpio.set_pin_mode(pin, mode))
    }

    /// Turn the shaft by `degrees`, blocking until every semi-step is written.
    ///
    /// The semi-step cursor starts at 0 on every call and `delay` runs after
    /// each step. A GPIO error aborts the rotation.
    pub fn rotate<G: Gpio, D: DelayNs>(
        &self,
        gpio: &mut G,
        delay: &mut D,
        degrees: u32,
        direction: Direction,
    ) -> Result<()> {
        let steps = self.steps_for(degrees);
        let step_delay_ms = self.config.step_delay_ms;
        info!("rotating {degrees} degrees {direction:?} ({steps} semi-steps)");

        for (_, pattern) in (0..steps).zip(STEP_SEQUENCE.iter().cycle()) {
            self.write_pattern(gpio, pattern, direction)?;
            delay.delay_ms(step_delay_ms);
        }
        Ok(())
    }

    fn write_pattern<G: Gpio>(
        &self,
        gpio: &mut G,
        pattern: &[PinLevel; 4],
        direction: Direction,
    ) -> Result<()> {
        let pins = self.config.pins.iter();
        match direction {
            Direction::Clockwise => pins
                .zip(pattern.iter())
                .try_for_each(|(&pin, &level)| gpio.write_pin(pin, level)),
            Direction::CounterClockwise => pins
                .zip(pattern.iter().rev())
                .try_for_each(|(&pin, &level)| gpio.write_pin(pin, level)),
        }
    }

    /// Enable output mode and return a guard that cleans the pins up on drop.
    pub fn engage<'a, G: Gpio>(&'a self, gpio: &'a mut G) -> Result<MotorSession<'a, G>> {
        self.enable_output_mode(gpio)?;
        Ok(MotorSession { motor: self, gpio })
    }
}

/// Motor pins held in output mode. Dropping the session returns them to input.
pub struct MotorSession<'a, G: Gpio> {
    motor: &'a MotorController,
    gpio: &'a mut G,
}

impl<G: Gpio> MotorSession<'_, G> {
    /// See [`MotorController::rotate`].
    pub fn rotate<D: DelayNs>(
        &mut self,
        delay: &mut D,
        degrees: u32,
        direction: Direction,
    ) -> Result<()> {
        self.motor.rotate(&mut *self.gpio, delay, degrees, direction)
    }
}

impl<G: Gpio> Drop for MotorSession<'_, G> {
    fn drop(&mut self) {
        if let Err(err) = self.motor.cleanup(&mut *self.gpio) {
            warn!("motor cleanup failed: {err}");
        }
    }
}
