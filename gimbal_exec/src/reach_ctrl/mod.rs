//! Reach control module
//!
//! Works the reach arm while the bottom unit's pitch lies inside an angular window. Each cycle inside
//! the window brings the arm down and then back up with two timed pulses of the DC motor.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
mod unit;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;
pub use unit::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ReachCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ReachCtrlError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(&'static str),
}
