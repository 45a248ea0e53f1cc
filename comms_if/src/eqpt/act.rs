//! # Actuator Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single command issued by a control loop to the actuator it owns.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCommand {
    /// Direction of motion.
    pub dir: Direction,

    /// How far or how hard to move. `None` leaves the choice to the driver (one step for a
    /// stepper, full duty for a DC motor).
    pub magnitude: Option<Magnitude>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the actuators on the gimbal
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    /// Lead screw levelling the top platform
    Level,

    /// Rotary base tracking the target in yaw
    Yaw,

    /// DC motor extending the reach arm
    Reach,
}

/// Direction of an actuator.
///
/// For the steppers `Forward` is clockwise, for the DC motor `Forward` brings the arm down.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Magnitude of an actuator command.
#[derive(Serialize, Deserialize, Debug, PartialEq, Copy, Clone)]
pub enum Magnitude {
    /// Number of steps, with the delay between each step edge in seconds
    Steps { count: u32, delay_s: f64 },

    /// Duty cycle between 0.0 and 1.0
    Duty(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActuatorCommand {
    /// A stepper command of `count` steps.
    pub fn steps(dir: Direction, count: u32, delay_s: f64) -> Self {
        Self {
            dir,
            magnitude: Some(Magnitude::Steps { count, delay_s }),
        }
    }

    /// A DC drive command at the given duty.
    pub fn duty(dir: Direction, duty: f64) -> Self {
        Self {
            dir,
            magnitude: Some(Magnitude::Duty(duty)),
        }
    }
}

impl Direction {
    /// Whether this direction is clockwise for a rotary actuator.
    pub fn is_clockwise(self) -> bool {
        self == Direction::Forward
    }
}

impl std::fmt::Display for ActId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActId::Level => write!(f, "level"),
            ActId::Yaw => write!(f, "yaw"),
            ActId::Reach => write!(f, "reach"),
        }
    }
}
