//! # Communications interface crate.
//!
//! Provides the interfaces through which the gimbal's concurrent loops exchange data: the shared
//! scalar channels and the definitions of the equipment (sensors, vision, actuators) the loops
//! talk to.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Single writer, multi reader, overwrite-latest scalar channels
pub mod channel;

/// Interface definitions for equipment (orientation sensors, target detection, actuators)
pub mod eqpt;
