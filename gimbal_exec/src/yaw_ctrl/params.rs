//! Parameters structure for YawCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::time::seconds_to_duration;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for yaw tracking.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Period of the tracking loop.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Yaw at or above which the base is always turned back in reverse.
    ///
    /// Units: degrees
    pub upper_limit_deg: f64,

    /// Yaw at or below which the base is always turned forward.
    ///
    /// Units: degrees
    pub lower_limit_deg: f64,

    /// The target heading is this offset minus the bearing.
    ///
    /// Units: degrees
    pub heading_offset_deg: f64,

    /// Number of steps in the batch issued each cycle.
    pub steps_per_cycle: u32,

    /// Delay between step edges.
    ///
    /// Units: seconds
    pub step_delay_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            period_s: 0.05,
            upper_limit_deg: 30.0,
            lower_limit_deg: -30.0,
            heading_offset_deg: 270.0,
            steps_per_cycle: 50,
            step_delay_s: 0.0005,
        }
    }
}

impl Params {
    pub fn are_valid(&self) -> Result<(), &'static str> {
        if !is_positive_duration(self.period_s) {
            return Err("period_s must be a positive number of seconds");
        }
        if !(self.lower_limit_deg < self.upper_limit_deg) {
            return Err("lower_limit_deg must be below upper_limit_deg");
        }
        if !self.heading_offset_deg.is_finite() {
            return Err("heading_offset_deg must be finite");
        }
        if self.steps_per_cycle == 0 {
            return Err("steps_per_cycle must be at least 1");
        }
        if !is_positive_duration(self.step_delay_s) {
            return Err("step_delay_s must be a positive number of seconds");
        }

        Ok(())
    }
}

fn is_positive_duration(secs: f64) -> bool {
    matches!(seconds_to_duration(secs), Some(d) if !d.is_zero())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_shipped_params_valid() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../params/yaw_ctrl.toml");

        let params: Params = util::params::load_from_path(path).unwrap();
        assert!(params.are_valid().is_ok());
    }

    #[test]
    fn test_unrepresentable_times_rejected() {
        for secs in [0.0, -0.1, f64::NAN, 1e300] {
            let params = Params {
                period_s: secs,
                ..Params::default()
            };
            assert!(params.are_valid().is_err(), "period_s = {}", secs);
        }

        let params = Params {
            step_delay_s: 1e300,
            ..Params::default()
        };
        assert!(params.are_valid().is_err());
    }
}
