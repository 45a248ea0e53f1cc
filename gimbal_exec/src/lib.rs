//! # Gimbal library.
//!
//! This library allows the gimbal executable (and its tests) to access the control modules, drivers
//! and supervisor defined inside the gimbal crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator drivers - stepper, DC motor and simulated backends
pub mod act_driver;

/// Control loop runner - cycle timing and cancellation for every unit
pub mod ctrl_loop;

/// Levelling control module - keeps the top platform level
pub mod level_ctrl;

/// Executable parameters
pub mod params;

/// Reach control module - works the reach arm inside a pitch window
pub mod reach_ctrl;

/// Sensor sources - publish orientation and target readings into the shared channels
pub mod source;

/// Supervisor - owns the channels and threads, performs shutdown
pub mod supervisor;

/// Yaw tracking module - turns the base towards the target
pub mod yaw_ctrl;
