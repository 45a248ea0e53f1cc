//! [`ActuatorDriver`] implementation for step/direction stepper driver boards

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::thread;

use comms_if::eqpt::act::{ActId, Direction};
use log::trace;
use rppal::gpio::{Gpio, OutputPin};

use super::{validate_step_delay, ActDriverError, ActuatorDriver, StepperConfig};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A stepper motor driven through a step/direction driver board.
pub struct StepperDriver {
    id: ActId,

    config: StepperConfig,

    /// `None` once the pins have been released
    pins: Option<StepperPins>,
}

struct StepperPins {
    step: OutputPin,
    dir: OutputPin,

    /// Active low
    enable: Option<OutputPin>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StepperDriver {
    /// Claim the pins for a new stepper driver.
    ///
    /// The driver is enabled as soon as it is created.
    pub fn new(id: ActId, config: StepperConfig) -> Result<Self, ActDriverError> {
        let gpio = Gpio::new()?;

        let step = gpio.get(config.step_pin)?.into_output_low();
        let dir = gpio.get(config.dir_pin)?.into_output_low();
        let enable = match config.enable_pin {
            Some(p) => Some(gpio.get(p)?.into_output_low()),
            None => None,
        };

        Ok(Self {
            id,
            config,
            pins: Some(StepperPins { step, dir, enable }),
        })
    }
}

impl ActuatorDriver for StepperDriver {
    fn id(&self) -> ActId {
        self.id
    }

    fn step(&mut self, dir: Direction, count: u32, delay_s: f64) -> Result<(), ActDriverError> {
        let delay = validate_step_delay(delay_s)?;

        let pins = self.pins.as_mut().ok_or(ActDriverError::Released(self.id))?;

        if dir.is_clockwise() != self.config.invert_dir {
            pins.dir.set_high();
        } else {
            pins.dir.set_low();
        }

        for _ in 0..count {
            pins.step.set_high();
            thread::sleep(delay);
            pins.step.set_low();
            thread::sleep(delay);
        }

        trace!("[{}] stepped {:?} x{}", self.id, dir, count);

        Ok(())
    }

    fn nudge(&mut self, dir: Direction) -> Result<(), ActDriverError> {
        let delay_s = self.config.nudge_delay_s;
        self.step(dir, 1, delay_s)
    }

    fn stop(&mut self) -> Result<(), ActDriverError> {
        // Steps are blocking, so between calls the motor is already holding position
        if let Some(pins) = self.pins.as_mut() {
            pins.step.set_low();
        }

        Ok(())
    }

    fn release(&mut self) -> Result<(), ActDriverError> {
        if let Some(mut pins) = self.pins.take() {
            pins.step.set_low();
            if let Some(en) = pins.enable.as_mut() {
                en.set_high();
            }

            // Dropping the pins resets them
            trace!("[{}] pins released", self.id);
        }

        Ok(())
    }
}
