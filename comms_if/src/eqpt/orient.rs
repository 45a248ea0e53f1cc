//! # Orientation Sensor Interface
//!
//! The gimbal carries two absolute orientation units. The top unit provides the yaw used for
//! tracking and the pitch used for levelling, the bottom unit provides the pitch used to gate the
//! reach arm. The two units share a bus and are told apart by an address select flag.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Euler angles reported by one orientation unit.
///
/// Units: degrees
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
}

/// The three logical orientation scalars consumed by the control loops.
///
/// Each value is `None` when its unit had no reading.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationReading {
    /// Yaw of the top unit, consumed by yaw tracking.
    pub yaw_deg: Option<f64>,

    /// Pitch of the top unit, consumed by levelling.
    pub top_pitch_deg: Option<f64>,

    /// Pitch of the bottom unit, consumed by reach.
    pub bot_pitch_deg: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies one of the two orientation units.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ImuId {
    /// Top platform unit, default bus address.
    Top,

    /// Bottom unit, alternate bus address.
    Bottom,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ImuId {
    /// Whether this unit uses the alternate bus address.
    pub fn alt_address(self) -> bool {
        self == ImuId::Bottom
    }
}

impl std::fmt::Display for ImuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImuId::Top => "top",
            ImuId::Bottom => "bottom",
        };
        let address = match self.alt_address() {
            true => "alternate",
            false => "default",
        };

        write!(f, "{} orientation unit ({} address)", name, address)
    }
}

impl OrientationReading {
    /// Combine the outputs of the two units into the logical reading.
    pub fn from_units(top: Option<EulerAngles>, bot: Option<EulerAngles>) -> Self {
        Self {
            yaw_deg: top.map(|e| e.yaw_deg),
            top_pitch_deg: top.map(|e| e.pitch_deg),
            bot_pitch_deg: bot.map(|e| e.pitch_deg),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_units() {
        let top = EulerAngles {
            yaw_deg: 12.0,
            pitch_deg: -3.0,
            roll_deg: 0.5,
        };

        let r = OrientationReading::from_units(Some(top), None);
        assert_eq!(r.yaw_deg, Some(12.0));
        assert_eq!(r.top_pitch_deg, Some(-3.0));
        assert_eq!(r.bot_pitch_deg, None);

        assert_eq!(
            ImuId::Bottom.to_string(),
            "bottom orientation unit (alternate address)"
        );
        assert_eq!(ImuId::Top.to_string(), "top orientation unit (default address)");
    }
}
