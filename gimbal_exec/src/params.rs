//! # Gimbal Executable Parameters
//!
//! This module provides parameters for the gimbal executable, and builds the hardware they
//! describe.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use comms_if::eqpt::act::ActId;
use log::info;
use serde::Deserialize;
use util::time::seconds_to_duration;

use crate::act_driver::{ActDriverError, ActuatorDriver, DcMotorConfig, SimActuator, StepperConfig};
use crate::source::sim::{SimDetector, SimDetectorParams, SimImu, SimImuParams};
use crate::supervisor::{Hardware, SupervisorParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GimbalExecParams {

    /// Time to wait before starting the loops, letting the sensors settle.
    ///
    /// Units: seconds
    pub startup_delay_s: f64,

    pub supervisor: SupervisorParams,

    /// Which actuator drivers to use
    pub actuators: ActuatorBackend,

    /// Lead screw driver
    pub level_act: StepperConfig,

    /// Yaw base driver
    pub yaw_act: StepperConfig,

    /// Reach arm motor
    pub reach_act: DcMotorConfig,

    /// Whether simulated steppers take as long as real ones
    pub sim_realtime: bool,

    pub sim_top_imu: SimImuParams,

    pub sim_bot_imu: SimImuParams,

    pub sim_detector: SimDetectorParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum ActuatorBackend {
    /// Record commands only
    Sim,

    /// Drive the GPIO pins
    Gpio,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GimbalExecParams {
    /// The start-up delay, or `None` if `startup_delay_s` is not a usable number of seconds.
    pub fn startup_delay(&self) -> Option<Duration> {
        seconds_to_duration(self.startup_delay_s)
    }

    /// Build the sensors and actuators described by the parameters.
    pub fn build_hardware(&self) -> Result<Hardware, ActDriverError> {
        let (level_act, yaw_act, reach_act) = match self.actuators {
            ActuatorBackend::Sim => self.sim_actuators(),
            ActuatorBackend::Gpio => self.gpio_actuators()?,
        };

        let mut pins = self.level_act.pins();
        pins.extend(self.yaw_act.pins());
        pins.extend(self.reach_act.pins());

        info!("Actuators: {:?}, pins {:?}", self.actuators, pins);

        Ok(Hardware {
            top_imu: Box::new(SimImu::new(self.sim_top_imu.clone())),
            bot_imu: Box::new(SimImu::new(self.sim_bot_imu.clone())),
            detector: Box::new(SimDetector::new(self.sim_detector.clone())),
            level_act,
            yaw_act,
            reach_act,
            pins,
        })
    }

    fn sim_actuators(
        &self,
    ) -> (Box<dyn ActuatorDriver>, Box<dyn ActuatorDriver>, Box<dyn ActuatorDriver>) {
        (
            Box::new(SimActuator::new(ActId::Level).with_realtime(self.sim_realtime)),
            Box::new(SimActuator::new(ActId::Yaw).with_realtime(self.sim_realtime)),
            Box::new(SimActuator::new(ActId::Reach).with_realtime(self.sim_realtime)),
        )
    }

    #[cfg(target_arch = "arm")]
    fn gpio_actuators(
        &self,
    ) -> Result<(Box<dyn ActuatorDriver>, Box<dyn ActuatorDriver>, Box<dyn ActuatorDriver>), ActDriverError>
    {
        use crate::act_driver::{dc_motor::DcMotorDriver, stepper::StepperDriver};

        Ok((
            Box::new(StepperDriver::new(ActId::Level, self.level_act.clone())?),
            Box::new(StepperDriver::new(ActId::Yaw, self.yaw_act.clone())?),
            Box::new(DcMotorDriver::new(ActId::Reach, self.reach_act.clone())?),
        ))
    }

    #[cfg(not(target_arch = "arm"))]
    fn gpio_actuators(
        &self,
    ) -> Result<(Box<dyn ActuatorDriver>, Box<dyn ActuatorDriver>, Box<dyn ActuatorDriver>), ActDriverError>
    {
        Err(ActDriverError::GpioUnavailable)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn exec_params() -> GimbalExecParams {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("params")
            .join("gimbal_exec.toml");

        util::params::load_from_path(path).unwrap()
    }

    #[test]
    fn test_shipped_params() {
        let p = exec_params();

        assert_eq!(p.startup_delay_s, 3.0);
        assert_eq!(p.startup_delay(), Some(Duration::from_secs(3)));
        assert_eq!(p.reach_act.pins(), vec![17, 27, 18]);
        assert_eq!(p.actuators, ActuatorBackend::Sim);
    }

    #[test]
    fn test_startup_delay_out_of_range() {
        let mut p = exec_params();

        p.startup_delay_s = 1e300;
        assert_eq!(p.startup_delay(), None);

        p.startup_delay_s = -1.0;
        assert_eq!(p.startup_delay(), None);

        p.startup_delay_s = 0.0;
        assert_eq!(p.startup_delay(), Some(Duration::ZERO));
    }

    #[test]
    fn test_build_sim_hardware() {
        let mut p = exec_params();
        p.actuators = ActuatorBackend::Sim;

        let hw = p.build_hardware().unwrap();
        assert_eq!(hw.level_act.id(), ActId::Level);
        assert_eq!(hw.reach_act.id(), ActId::Reach);
        assert_eq!(hw.pins.len(), p.level_act.pins().len() + p.yaw_act.pins().len() + 3);
    }

    #[cfg(not(target_arch = "arm"))]
    #[test]
    fn test_gpio_unavailable_off_target() {
        let mut p = exec_params();
        p.actuators = ActuatorBackend::Gpio;

        assert!(matches!(p.build_hardware(), Err(ActDriverError::GpioUnavailable)));
    }
}
