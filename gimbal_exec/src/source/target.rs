//! Target source unit

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use comms_if::channel::ChannelWriter;
use log::{info, trace, warn};

use super::TargetDetector;
use crate::ctrl_loop::{CtrlUnit, Cycle};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Publishes the range and bearing of the detected marker.
///
/// Frames with no marker leave the last detection in place. A detector error clears both channels.
pub struct TargetSource {
    detector: Box<dyn TargetDetector>,

    range: ChannelWriter<f64>,
    bearing: ChannelWriter<f64>,

    period: Duration,

    /// Whether the marker was seen in the last frame
    seen: bool,

    failed: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TargetSource {
    pub fn new(
        detector: Box<dyn TargetDetector>,
        range: ChannelWriter<f64>,
        bearing: ChannelWriter<f64>,
        period: Duration,
    ) -> Self {
        Self {
            detector,
            range,
            bearing,
            period,
            seen: false,
            failed: false,
        }
    }
}

impl CtrlUnit for TargetSource {
    fn name(&self) -> &str {
        "target_src"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn cycle(&mut self) -> Cycle {
        match self.detector.detect() {
            Ok(Some(t)) => {
                if self.failed {
                    info!("Target detector recovered");
                    self.failed = false;
                }
                if !self.seen {
                    info!("Target acquired at bearing {:.1} deg", t.bearing_deg());
                    self.seen = true;
                }

                self.range.write(t.range());
                self.bearing.write(t.bearing_deg());

                trace!("Target: range {:.3}, bearing {:.2}", t.range(), t.bearing_deg());
            }
            Ok(None) => {
                if self.seen {
                    info!("Target lost, holding last bearing");
                    self.seen = false;
                }
            }
            Err(e) => {
                if !self.failed {
                    warn!("Target detector failed: {}", e);
                    self.failed = true;
                }
                self.seen = false;
                self.range.clear();
                self.bearing.clear();
            }
        }

        Cycle::Idle
    }

    fn release(&mut self) {}
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
