//! Simulated sensors
//!
//! Deterministic stand-ins for the orientation units and the target detector. Each value follows a
//! sine wave mapped onto a configured range, advancing by one sample per call, and every
//! `dropout_every`th call reports no reading.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::f64::consts::PI;

use comms_if::eqpt::{orient::EulerAngles, target::TargetBearing};
use serde::Deserialize;
use util::maths::lin_map;

use super::{OrientationSensor, SensorError, TargetDetector};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of a simulated orientation unit.
#[derive(Debug, Clone, Deserialize)]
pub struct SimImuParams {
    /// Units: degrees
    pub yaw_range_deg: (f64, f64),

    /// Units: degrees
    pub pitch_range_deg: (f64, f64),

    /// Number of calls for one full sine wave
    pub samples_per_wave: u32,

    /// Every n-th call reports no reading, 0 for never
    pub dropout_every: u32,
}

/// Parameters of a simulated target detector.
#[derive(Debug, Clone, Deserialize)]
pub struct SimDetectorParams {
    pub range: f64,

    /// Units: degrees
    pub bearing_range_deg: (f64, f64),

    pub samples_per_wave: u32,

    /// Every n-th call sees no marker, 0 for never
    pub dropout_every: u32,
}

/// A simulated orientation unit.
pub struct SimImu {
    params: SimImuParams,
    sample: u64,
}

/// A simulated target detector.
pub struct SimDetector {
    params: SimDetectorParams,
    sample: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimImu {
    pub fn new(params: SimImuParams) -> Self {
        Self { params, sample: 0 }
    }
}

impl OrientationSensor for SimImu {
    fn euler_angles(&mut self) -> Result<Option<EulerAngles>, SensorError> {
        self.sample += 1;

        if is_dropout(self.sample, self.params.dropout_every) {
            return Ok(None);
        }

        let s = wave(self.sample, self.params.samples_per_wave);

        Ok(Some(EulerAngles {
            yaw_deg: lin_map((-1.0, 1.0), self.params.yaw_range_deg, s),
            pitch_deg: lin_map((-1.0, 1.0), self.params.pitch_range_deg, s),
            roll_deg: 0.0,
        }))
    }
}

impl SimDetector {
    pub fn new(params: SimDetectorParams) -> Self {
        Self { params, sample: 0 }
    }
}

impl TargetDetector for SimDetector {
    fn detect(&mut self) -> Result<Option<TargetBearing>, SensorError> {
        self.sample += 1;

        if is_dropout(self.sample, self.params.dropout_every) {
            return Ok(None);
        }

        let s = wave(self.sample, self.params.samples_per_wave);
        let bearing_deg = lin_map((-1.0, 1.0), self.params.bearing_range_deg, s);

        Ok(Some(TargetBearing::new(self.params.range, bearing_deg)?))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn is_dropout(sample: u64, every: u32) -> bool {
    every != 0 && sample % every as u64 == 0
}

/// Sine of the sample's phase, in [-1, 1].
fn wave(sample: u64, samples_per_wave: u32) -> f64 {
    let n = samples_per_wave.max(1) as f64;
    (2.0 * PI * (sample as f64) / n).sin()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_imu() {
        let mut imu = SimImu::new(SimImuParams {
            yaw_range_deg: (-40.0, 40.0),
            pitch_range_deg: (-5.0, 5.0),
            samples_per_wave: 8,
            dropout_every: 4,
        });

        let readings: Vec<Option<EulerAngles>> =
            (0..8).map(|_| imu.euler_angles().unwrap()).collect();

        // Calls 4 and 8 drop out
        assert!(readings[3].is_none());
        assert!(readings[7].is_none());

        // Call 2 is at the crest of the wave
        let crest = readings[1].unwrap();
        assert!((crest.yaw_deg - 40.0).abs() < 1e-9);
        assert!((crest.pitch_deg - 5.0).abs() < 1e-9);

        for r in readings.iter().flatten() {
            assert!(r.pitch_deg >= -5.0 - 1e-9 && r.pitch_deg <= 5.0 + 1e-9);
        }
    }

    #[test]
    fn test_sim_detector() {
        let mut det = SimDetector::new(SimDetectorParams {
            range: 1.5,
            bearing_range_deg: (60.0, 120.0),
            samples_per_wave: 4,
            dropout_every: 0,
        });

        for _ in 0..8 {
            let t = det.detect().unwrap().unwrap();
            assert_eq!(t.range(), 1.5);
            assert!(t.bearing_deg() >= 60.0 - 1e-9 && t.bearing_deg() <= 120.0 + 1e-9);
        }

        let mut bad = SimDetector::new(SimDetectorParams {
            range: -1.0,
            bearing_range_deg: (0.0, 10.0),
            samples_per_wave: 4,
            dropout_every: 0,
        });
        assert!(matches!(bad.detect(), Err(SensorError::InvalidDetection(_))));
    }
}
