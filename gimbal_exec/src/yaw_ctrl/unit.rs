//! Yaw tracking loop unit

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

use comms_if::channel::ChannelReader;
use log::{debug, error, warn};
use util::module::State;

use super::{InputData, StatusReport, YawCtrl};
use crate::act_driver::ActuatorDriver;
use crate::ctrl_loop::{CtrlUnit, Cycle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The yaw tracking loop, one step batch per tick.
pub struct YawUnit {
    ctrl: YawCtrl,

    yaw: ChannelReader<f64>,

    bearing: ChannelReader<f64>,

    /// Bearing channel epoch seen on the previous cycle
    last_bearing_epoch: Option<u64>,

    /// Report from the last successful cycle
    last_status: Option<StatusReport>,

    act: Box<dyn ActuatorDriver>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl YawUnit {
    pub fn new(
        ctrl: YawCtrl,
        yaw: ChannelReader<f64>,
        bearing: ChannelReader<f64>,
        act: Box<dyn ActuatorDriver>,
    ) -> Self {
        Self {
            ctrl,
            yaw,
            bearing,
            last_bearing_epoch: None,
            last_status: None,
            act,
        }
    }

    /// Log when tracking switches between a fresh and a stale bearing.
    fn report_freshness(&self, status: &StatusReport) {
        if status.target_heading_deg.is_none() {
            return;
        }

        let was_fresh = self.last_status.map(|s| s.bearing_fresh);

        match (was_fresh, status.bearing_fresh) {
            (Some(true), false) => debug!("Bearing is stale, tracking on the last heading"),
            (Some(false), true) => debug!("Bearing updated"),
            _ => (),
        }
    }
}

impl CtrlUnit for YawUnit {
    fn name(&self) -> &str {
        "yaw_ctrl"
    }

    fn period(&self) -> Duration {
        self.ctrl.period()
    }

    fn cycle(&mut self) -> Cycle {
        let epoch = self.bearing.epoch();
        let input = InputData {
            yaw_deg: self.yaw.read(),
            bearing_deg: self.bearing.read(),
            bearing_fresh: self.last_bearing_epoch != Some(epoch),
        };
        self.last_bearing_epoch = Some(epoch);

        let (output, status) = match self.ctrl.proc(&input) {
            Ok(r) => r,
            Err(e) => {
                warn!("Error during YawCtrl processing: {}", e);
                return Cycle::Idle;
            }
        };

        self.report_freshness(&status);
        self.last_status = Some(status);

        match output.cmd {
            Some(cmd) => match self.act.execute(&cmd) {
                Ok(()) => Cycle::Actuated,
                Err(e) => {
                    error!("Yaw base failed: {}", e);
                    Cycle::Fault
                }
            },
            None => Cycle::Idle,
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.act.release() {
            error!("Could not release the yaw base: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
