//! # Target Detection Interface
//!
//! The vision pipeline reports the marker position relative to the camera as a polar pair: the
//! range to the marker and the bearing of the marker in the camera frame.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Range and bearing of the detected marker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TargetBearing {
    /// Distance from the camera to the marker, in the units of the pose estimate.
    range: f64,

    /// Bearing of the marker in the camera frame, in [0, 360).
    ///
    /// Units: degrees
    bearing_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BearingError {
    #[error("Range must be positive and finite, found {0}")]
    InvalidRange(f64),

    #[error("Bearing must be finite, found {0}")]
    InvalidBearing(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TargetBearing {
    /// Create a new bearing, wrapping the angle into [0, 360).
    pub fn new(range: f64, bearing_deg: f64) -> Result<Self, BearingError> {
        if !range.is_finite() || range <= 0.0 {
            return Err(BearingError::InvalidRange(range));
        }
        if !bearing_deg.is_finite() {
            return Err(BearingError::InvalidBearing(bearing_deg));
        }

        Ok(Self {
            range,
            bearing_deg: wrap_360(bearing_deg),
        })
    }

    /// Build the bearing from the in-plane translation of the marker pose.
    ///
    /// The bearing is measured from the camera's negative x axis, so a marker straight along +x is
    /// at 180 degrees.
    pub fn from_translation(x: f64, y: f64) -> Result<Self, BearingError> {
        let range = x.hypot(y);
        let bearing_deg = y.atan2(x).to_degrees() + 180.0;

        Self::new(range, bearing_deg)
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn bearing_deg(&self) -> f64 {
        self.bearing_deg
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn wrap_360(angle_deg: f64) -> f64 {
    let a = angle_deg.rem_euclid(360.0);

    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
