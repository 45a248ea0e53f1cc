//! [`ActuatorDriver`] implementation for a DC motor on an H-bridge

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::act::{ActId, Direction};
use log::trace;
use rppal::gpio::{Gpio, OutputPin};

use super::{validate_duty, ActDriverError, ActuatorDriver, DcMotorConfig};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A DC motor with two bridge inputs selecting the direction and a PWM enable setting the speed.
pub struct DcMotorDriver {
    id: ActId,

    config: DcMotorConfig,

    /// `None` once the pins have been released
    pins: Option<DcMotorPins>,
}

struct DcMotorPins {
    in1: OutputPin,
    in2: OutputPin,
    en: OutputPin,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DcMotorDriver {
    /// Claim the pins for a new motor, which starts stopped.
    pub fn new(id: ActId, config: DcMotorConfig) -> Result<Self, ActDriverError> {
        let gpio = Gpio::new()?;

        let in1 = gpio.get(config.in1_pin)?.into_output_low();
        let in2 = gpio.get(config.in2_pin)?.into_output_low();
        let en = gpio.get(config.en_pin)?.into_output_low();

        Ok(Self {
            id,
            config,
            pins: Some(DcMotorPins { in1, in2, en }),
        })
    }
}

impl ActuatorDriver for DcMotorDriver {
    fn id(&self) -> ActId {
        self.id
    }

    fn drive(&mut self, dir: Direction, duty: f64) -> Result<(), ActDriverError> {
        validate_duty(duty)?;

        let freq = self.config.pwm_frequency_hz;
        let pins = self.pins.as_mut().ok_or(ActDriverError::Released(self.id))?;

        match dir {
            Direction::Forward => {
                pins.in1.set_high();
                pins.in2.set_low();
            }
            Direction::Reverse => {
                pins.in1.set_low();
                pins.in2.set_high();
            }
        }

        pins.en.set_pwm_frequency(freq, duty)?;

        trace!("[{}] driving {:?} at {:.2}", self.id, dir, duty);

        Ok(())
    }

    fn nudge(&mut self, dir: Direction) -> Result<(), ActDriverError> {
        self.drive(dir, 1.0)
    }

    fn stop(&mut self) -> Result<(), ActDriverError> {
        if let Some(pins) = self.pins.as_mut() {
            pins.en.clear_pwm()?;
            pins.en.set_low();
            pins.in1.set_low();
            pins.in2.set_low();
        }

        Ok(())
    }

    fn release(&mut self) -> Result<(), ActDriverError> {
        self.stop()?;

        if self.pins.take().is_some() {
            trace!("[{}] pins released", self.id);
        }

        Ok(())
    }
}
