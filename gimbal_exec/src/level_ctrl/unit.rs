//! Levelling loop unit, binds LevelCtrl to its pitch channel and the lead screw

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

use comms_if::channel::ChannelReader;
use log::{error, warn};
use util::module::State;

use super::{InputData, LevelCtrl};
use crate::act_driver::ActuatorDriver;
use crate::ctrl_loop::{CtrlUnit, Cycle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The levelling loop.
///
/// While the platform is out of level each cycle issues one batch of steps and reports
/// [`Cycle::Active`], so the state is held and the pitch re-read straight away.
pub struct LevelUnit {
    ctrl: LevelCtrl,

    top_pitch: ChannelReader<f64>,

    act: Box<dyn ActuatorDriver>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LevelUnit {
    pub fn new(
        ctrl: LevelCtrl,
        top_pitch: ChannelReader<f64>,
        act: Box<dyn ActuatorDriver>,
    ) -> Self {
        Self { ctrl, top_pitch, act }
    }
}

impl CtrlUnit for LevelUnit {
    fn name(&self) -> &str {
        "level_ctrl"
    }

    fn period(&self) -> Duration {
        self.ctrl.period()
    }

    fn cycle(&mut self) -> Cycle {
        let input = InputData {
            pitch_deg: self.top_pitch.read(),
        };

        let output = match self.ctrl.proc(&input) {
            Ok((o, _)) => o,
            Err(e) => {
                warn!("Error during LevelCtrl processing: {}", e);
                return Cycle::Idle;
            }
        };

        match output.cmd {
            Some(cmd) => match self.act.execute(&cmd) {
                Ok(()) => Cycle::Active,
                Err(e) => {
                    error!("Lead screw failed: {}", e);
                    Cycle::Fault
                }
            },
            None => Cycle::Idle,
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.act.release() {
            error!("Could not release the lead screw: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
