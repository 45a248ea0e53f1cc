//! Reach loop unit

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::thread;
use std::time::Duration;

use comms_if::channel::ChannelReader;
use log::{error, trace, warn};
use util::{module::State, time::seconds_to_duration};

use super::{InputData, ReachCtrl, ReachPulse};
use crate::act_driver::{ActDriverError, ActuatorDriver};
use crate::ctrl_loop::{CtrlUnit, Cycle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The reach loop, runs the pulses decided by ReachCtrl on the DC motor.
pub struct ReachUnit {
    ctrl: ReachCtrl,

    bot_pitch: ChannelReader<f64>,

    act: Box<dyn ActuatorDriver>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReachUnit {
    pub fn new(
        ctrl: ReachCtrl,
        bot_pitch: ChannelReader<f64>,
        act: Box<dyn ActuatorDriver>,
    ) -> Self {
        Self { ctrl, bot_pitch, act }
    }

    /// Run each pulse for its duration, then stop the motor.
    fn run_pulses(&mut self, pulses: &[ReachPulse]) -> Result<(), ActDriverError> {
        for pulse in pulses {
            self.act.execute(&pulse.cmd)?;
            trace!("Reach pulse {:?} for {:.2} s", pulse.cmd.dir, pulse.duration_s);
            if let Some(d) = seconds_to_duration(pulse.duration_s) {
                thread::sleep(d);
            }
        }

        self.act.stop()
    }
}

impl CtrlUnit for ReachUnit {
    fn name(&self) -> &str {
        "reach_ctrl"
    }

    fn period(&self) -> Duration {
        self.ctrl.period()
    }

    fn cycle(&mut self) -> Cycle {
        let input = InputData {
            pitch_deg: self.bot_pitch.read(),
        };

        let output = match self.ctrl.proc(&input) {
            Ok((o, _)) => o,
            Err(e) => {
                warn!("Error during ReachCtrl processing: {}", e);
                return Cycle::Idle;
            }
        };

        if output.pulses.is_empty() {
            return Cycle::Idle;
        }

        match self.run_pulses(&output.pulses) {
            Ok(()) => Cycle::Actuated,
            Err(e) => {
                error!("Reach motor failed: {}", e);
                Cycle::Fault
            }
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.act.release() {
            error!("Could not release the reach motor: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
