//! Yaw tracking control module
//!
//! Rotates the gimbal base so that the top unit's yaw follows the heading implied by the target
//! bearing. Soft limits on the yaw keep the base inside its mechanical travel and take priority over
//! the tracking policy.

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

/// Possible errors that can occur during YawCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum YawCtrlError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(&'static str),
}
