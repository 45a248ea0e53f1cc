//! Parameters structure for LevelCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::time::seconds_to_duration;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Levelling control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Period of an idle (flat) cycle.
    ///
    /// Units: seconds
    pub period_s: f64,

    /// Pitch at or above which the screw is extended.
    ///
    /// Units: degrees
    pub extend_threshold_deg: f64,

    /// Pitch at or below which the screw is retracted.
    ///
    /// Units: degrees
    pub retract_threshold_deg: f64,

    /// Number of steps issued per active cycle before the pitch is read again.
    pub steps_per_cycle: u32,

    /// Delay between step edges, set by the lead screw driver's timing.
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
            period_s: 0.01,
            extend_threshold_deg: 2.0,
            retract_threshold_deg: -2.0,
            steps_per_cycle: 1,
            step_delay_s: 0.0005,
        }
    }
}

impl Params {
    /// Check the parameters describe a usable dead-band and timing.
    pub fn are_valid(&self) -> Result<(), &'static str> {
        if !is_positive_duration(self.period_s) {
            return Err("period_s must be a positive number of seconds");
        }
        if !(self.retract_threshold_deg < self.extend_threshold_deg) {
            return Err("retract_threshold_deg must be below extend_threshold_deg");
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
