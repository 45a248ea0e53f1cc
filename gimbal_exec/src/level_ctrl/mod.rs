//! Levelling control module
//!
//! Keeps the top platform level by driving the lead screw against the pitch of the top
//! orientation unit. A dead-band around level stops the screw chattering about the level point.

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

/// Possible errors that can occur during LevelCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LevelCtrlError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(&'static str),
}
