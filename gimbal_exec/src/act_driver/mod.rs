//! # Actuator Driver Module
//!
//! This module provides a unified actuator interface which abstracts over the different motor
//! drivers on the gimbal:
//! - Stepper motors (levelling lead screw, yaw base) driven through step/direction pins
//! - A brushed DC motor (reach arm) driven through an H-bridge with a PWM enable pin
//! - A simulated actuator which records commands, used off-target and in tests
//!
//! The GPIO backed drivers are only built for Raspberry Pi (ARM) targets.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ActuatorDriver`] for a step/direction stepper motor driver board.
#[cfg(target_arch = "arm")]
pub mod stepper;

/// [`ActuatorDriver`] for a DC motor on an H-bridge.
#[cfg(target_arch = "arm")]
pub mod dc_motor;

/// Simulated [`ActuatorDriver`].
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use comms_if::eqpt::act::{ActId, ActuatorCommand, Direction, Magnitude};
use serde::{Deserialize, Serialize};

pub use sim::{SimActuator, SimEvent, SimEventLog};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for the gimbal's actuators.
///
/// Each actuator is owned by exactly one control loop. `stop` and `release` must be idempotent,
/// calling either of them more than once leaves the actuator in the same state as calling it once.
pub trait ActuatorDriver: Send {

    /// The actuator driven by this driver.
    fn id(&self) -> ActId;

    /// Move a stepper by `count` steps, waiting `delay_s` seconds between each step edge.
    fn step(&mut self, dir: Direction, count: u32, delay_s: f64) -> Result<(), ActDriverError> {
        let _ = (dir, count, delay_s);
        Err(ActDriverError::Unsupported(self.id(), "step"))
    }

    /// Drive a DC motor in the given direction at the given duty cycle, until the next command.
    ///
    /// ## Arguments
    /// - `dir` - The direction to drive in
    /// - `duty` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside this
    ///   range will be rejected.
    fn drive(&mut self, dir: Direction, duty: f64) -> Result<(), ActDriverError> {
        let _ = (dir, duty);
        Err(ActDriverError::Unsupported(self.id(), "drive"))
    }

    /// Perform the smallest meaningful motion in the given direction.
    ///
    /// Used for commands which carry no magnitude.
    fn nudge(&mut self, dir: Direction) -> Result<(), ActDriverError>;

    /// Bring the actuator to a stop.
    fn stop(&mut self) -> Result<(), ActDriverError>;

    /// Stop the actuator and give its pins back to the system.
    ///
    /// After release every motion command fails with [`ActDriverError::Released`].
    fn release(&mut self) -> Result<(), ActDriverError>;

    /// Execute a command issued by a control loop.
    fn execute(&mut self, cmd: &ActuatorCommand) -> Result<(), ActDriverError> {
        match cmd.magnitude {
            Some(Magnitude::Steps { count, delay_s }) => self.step(cmd.dir, count, delay_s),
            Some(Magnitude::Duty(duty)) => self.drive(cmd.dir, duty),
            None => self.nudge(cmd.dir),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pin configuration for a stepper driver board.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StepperConfig {
    /// BCM number of the step pin
    pub step_pin: u8,

    /// BCM number of the direction pin
    pub dir_pin: u8,

    /// BCM number of the active-low enable pin, if wired
    pub enable_pin: Option<u8>,

    /// Swap the meaning of forward and reverse
    pub invert_dir: bool,

    /// Delay used for magnitude-less commands.
    ///
    /// Units: seconds
    pub nudge_delay_s: f64,
}

/// Pin configuration for an H-bridge DC motor driver.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DcMotorConfig {
    /// BCM number of the first bridge input
    pub in1_pin: u8,

    /// BCM number of the second bridge input
    pub in2_pin: u8,

    /// BCM number of the enable pin, driven with software PWM
    pub en_pin: u8,

    /// PWM frequency on the enable pin.
    ///
    /// Units: Hertz
    pub pwm_frequency_hz: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ActDriverError {
    #[error("The {0} actuator does not support {1} commands")]
    Unsupported(ActId, &'static str),

    #[error("Duty cycle must be between 0.0 and 1.0, found {0}")]
    InvalidDutyCycle(f64),

    #[error("Step delay must be positive and finite, found {0}")]
    InvalidStepDelay(f64),

    #[error("The {0} actuator has been released")]
    Released(ActId),

    #[error("GPIO actuators are only available on Raspberry Pi targets")]
    GpioUnavailable,

    #[cfg(target_arch = "arm")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StepperConfig {
    /// All pins claimed by this driver.
    pub fn pins(&self) -> Vec<u8> {
        let mut pins = vec![self.step_pin, self.dir_pin];
        pins.extend(self.enable_pin);
        pins
    }
}

impl DcMotorConfig {
    /// All pins claimed by this driver.
    pub fn pins(&self) -> Vec<u8> {
        vec![self.in1_pin, self.in2_pin, self.en_pin]
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check that a step delay is usable, returning it as a duration.
pub fn validate_step_delay(delay_s: f64) -> Result<Duration, ActDriverError> {
    match Duration::try_from_secs_f64(delay_s) {
        Ok(d) if !d.is_zero() => Ok(d),
        _ => Err(ActDriverError::InvalidStepDelay(delay_s)),
    }
}

/// Check that a duty cycle is usable.
pub fn validate_duty(duty: f64) -> Result<(), ActDriverError> {
    // Written this way round so NaN is rejected
    if duty >= 0.0 && duty <= 1.0 {
        Ok(())
    } else {
        Err(ActDriverError::InvalidDutyCycle(duty))
    }
}

/// Return the given pins to their power-on state (inputs).
///
/// Pins still claimed by a driver are skipped with a warning, they will be reset when that driver
/// is dropped.
#[cfg(target_arch = "arm")]
pub fn reset_pins(pins: &[u8]) {
    use log::{trace, warn};

    let gpio = match rppal::gpio::Gpio::new() {
        Ok(g) => g,
        Err(e) => {
            warn!("Could not access GPIO to clean up pins: {}", e);
            return;
        }
    };

    for &pin in pins {
        match gpio.get(pin) {
            Ok(p) => {
                // Converting to an input and dropping releases the pin
                drop(p.into_input());
                trace!("Pin {} reset", pin);
            }
            Err(e) => warn!("Could not reset pin {}: {}", pin, e),
        }
    }
}

/// Return the given pins to their power-on state (inputs).
///
/// There are no GPIO pins off-target, so this only reports what would be reset.
#[cfg(not(target_arch = "arm"))]
pub fn reset_pins(pins: &[u8]) {
    log::debug!("No GPIO on this target, skipping reset of pins {:?}", pins);
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(validate_duty(0.0).is_ok());
        assert!(validate_duty(1.0).is_ok());
        assert!(validate_duty(1.01).is_err());
        assert!(validate_duty(f64::NAN).is_err());

        assert!(validate_step_delay(0.0005).is_ok());
        assert!(validate_step_delay(0.0).is_err());
        assert!(validate_step_delay(f64::INFINITY).is_err());
        assert!(validate_step_delay(-0.001).is_err());
        assert!(validate_step_delay(1e300).is_err());
        assert_eq!(validate_step_delay(0.25).unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_pins() {
        let stepper = StepperConfig {
            step_pin: 20,
            dir_pin: 21,
            enable_pin: Some(16),
            invert_dir: false,
            nudge_delay_s: 0.0005,
        };
        assert_eq!(stepper.pins(), vec![20, 21, 16]);

        let dc = DcMotorConfig {
            in1_pin: 17,
            in2_pin: 27,
            en_pin: 18,
            pwm_frequency_hz: 1000.0,
        };
        assert_eq!(dc.pins(), vec![17, 27, 18]);
    }

    #[test]
    fn test_execute_dispatch() {
        let mut act = SimActuator::new(ActId::Level);
        let log = act.event_log();

        act.execute(&ActuatorCommand::steps(Direction::Forward, 3, 0.001)).unwrap();
        act.execute(&ActuatorCommand::duty(Direction::Reverse, 0.5)).unwrap();
        act.execute(&ActuatorCommand {
            dir: Direction::Reverse,
            magnitude: None,
        })
        .unwrap();

        assert_eq!(
            log.snapshot(),
            vec![
                SimEvent::Step { dir: Direction::Forward, count: 3 },
                SimEvent::Drive { dir: Direction::Reverse, duty: 0.5 },
                SimEvent::Step { dir: Direction::Reverse, count: 1 },
            ]
        );
    }
}
