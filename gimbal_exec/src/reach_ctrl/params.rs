//! Parameters structure for ReachCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::time::seconds_to_duration;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for reach control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Period of the reach loop.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Lower edge of the pitch window, inclusive.
    ///
    /// Units: degrees
    pub window_min_deg: f64,

    /// Upper edge of the pitch window, inclusive.
    ///
    /// Units: degrees
    pub window_max_deg: f64,

    /// Duty of the bring-down pulse, 0.0 to 1.0
    pub down_duty: f64,

    /// Units: seconds
    pub down_duration_s: f64,

    /// Duty of the bring-up pulse, 0.0 to 1.0
    pub up_duty: f64,

    /// Units: seconds
    pub up_duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            period_s: 0.1,
            window_min_deg: -90.0,
            window_max_deg: -70.0,
            down_duty: 1.0,
            down_duration_s: 0.5,
            up_duty: 1.0,
            up_duration_s: 0.8,
        }
    }
}

impl Params {
    pub fn are_valid(&self) -> Result<(), &'static str> {
        if !is_positive_duration(self.period_s) {
            return Err("period_s must be a positive number of seconds");
        }
        if !(self.window_min_deg <= self.window_max_deg) {
            return Err("window_min_deg must not be above window_max_deg");
        }
        if !(self.down_duty >= 0.0 && self.down_duty <= 1.0)
            || !(self.up_duty >= 0.0 && self.up_duty <= 1.0)
        {
            return Err("pulse duties must be between 0.0 and 1.0");
        }
        if seconds_to_duration(self.down_duration_s).is_none()
            || seconds_to_duration(self.up_duration_s).is_none()
        {
            return Err("pulse durations must be a non-negative number of seconds");
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
            .join("../params/reach_ctrl.toml");

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
            down_duration_s: 1e300,
            ..Params::default()
        };
        assert!(params.are_valid().is_err());
    }
}
