//! # Sensor Sources
//!
//! The two source units poll the gimbal's sensors and publish the latest values into the shared
//! channels read by the control loops:
//! - [`OrientationSource`] reads the two orientation units and publishes yaw, top pitch and bottom
//!   pitch.
//! - [`TargetSource`] runs target detection and publishes the range and bearing of the marker.
//!
//! The sensors themselves sit behind the [`OrientationSensor`] and [`TargetDetector`] traits.
//! Simulated sensors are provided in [`sim`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod orient;
mod target;
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{orient::EulerAngles, target::{BearingError, TargetBearing}};

pub use orient::*;
pub use target::*;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An absolute orientation unit.
pub trait OrientationSensor: Send {
    /// Read the current euler angles.
    ///
    /// `Ok(None)` is a normal transient condition, the unit had no new fused reading.
    fn euler_angles(&mut self) -> Result<Option<EulerAngles>, SensorError>;
}

/// Something that detects the target marker.
pub trait TargetDetector: Send {
    /// Run one detection, `Ok(None)` if no marker was seen.
    fn detect(&mut self) -> Result<Option<TargetBearing>, SensorError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum SensorError {
    #[error("Sensor is not responding")]
    NotResponding,

    #[error("Sensor communication failed: {0}")]
    Comms(String),

    #[error("Invalid detection: {0}")]
    InvalidDetection(#[from] BearingError),
}
