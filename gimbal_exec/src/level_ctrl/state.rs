//! Implementations for the LevelCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::act::{ActuatorCommand, Direction};
use log::{info, trace};
use serde::Serialize;
use std::time::Duration;

// Internal
use super::{LevelCtrlError, Params};
use util::{module::State, params, time::seconds_to_duration};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Levelling control module state
#[derive(Default)]
pub struct LevelCtrl {
    pub(crate) params: Params,

    /// State decided on the previous cycle, `None` before the first cycle.
    pub(crate) prev_state: Option<LevelState>,
}

/// Input data to Levelling Control.
#[derive(Default, Clone, Copy, Debug)]
pub struct InputData {
    /// Pitch of the top platform, or `None` if there is no reading.
    ///
    /// Units: degrees
    pub pitch_deg: Option<f64>,
}

/// Output command from LevelCtrl that the lead screw must execute.
#[derive(Default, Clone, Copy, Debug)]
pub struct OutputData {
    /// Command for the lead screw, `None` if it shall not move this cycle.
    pub cmd: Option<ActuatorCommand>,
}

/// Status report for LevelCtrl processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    pub state: LevelState,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// States of the levelling state machine.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum LevelState {
    /// Platform tilted up, extend the screw
    Extend,

    /// Platform tilted down, retract the screw
    Retract,

    /// Within the dead-band, hold
    Flat,

    /// No valid pitch this cycle, hold
    NoReading,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LevelCtrl {
    type InitData = &'static str;
    type InitError = LevelCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LevelCtrlError;

    /// Initialise the LevelCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(LevelCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        Ok(())
    }

    /// Perform cyclic processing of Levelling Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let state = self.calc_state(input_data.pitch_deg);

        if self.prev_state != Some(state) {
            match state {
                LevelState::Extend => info!("EXTEND"),
                LevelState::Retract => info!("RETRACT"),
                LevelState::Flat => info!("Flat"),
                LevelState::NoReading => trace!("No pitch reading"),
            }
        }
        self.prev_state = Some(state);

        let cmd = match state {
            LevelState::Extend => Some(self.step_cmd(Direction::Forward)),
            LevelState::Retract => Some(self.step_cmd(Direction::Reverse)),
            LevelState::Flat | LevelState::NoReading => None,
        };

        trace!("LevelCtrl: pitch {:?} -> {:?}", input_data.pitch_deg, state);

        Ok((OutputData { cmd }, StatusReport { state }))
    }
}

impl LevelCtrl {

    /// Create the module from already loaded parameters.
    pub fn new(params: Params) -> Result<Self, LevelCtrlError> {
        params.are_valid().map_err(LevelCtrlError::ParamsInvalid)?;

        Ok(Self {
            params,
            prev_state: None,
        })
    }

    /// Period of an idle cycle.
    pub fn period(&self) -> Duration {
        // Checked by Params::are_valid on construction
        seconds_to_duration(self.params.period_s).unwrap_or_default()
    }

    /// Decide the state from the current pitch.
    ///
    /// Both thresholds are inclusive, so a pitch exactly on a threshold actuates.
    fn calc_state(&self, pitch_deg: Option<f64>) -> LevelState {
        match pitch_deg {
            Some(p) if !p.is_finite() => LevelState::NoReading,
            Some(p) if p >= self.params.extend_threshold_deg => LevelState::Extend,
            Some(p) if p <= self.params.retract_threshold_deg => LevelState::Retract,
            Some(_) => LevelState::Flat,
            None => LevelState::NoReading,
        }
    }

    fn step_cmd(&self, dir: Direction) -> ActuatorCommand {
        ActuatorCommand::steps(dir, self.params.steps_per_cycle, self.params.step_delay_s)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn run(ctrl: &mut LevelCtrl, pitch_deg: Option<f64>) -> (Option<ActuatorCommand>, LevelState) {
        let (out, rpt) = ctrl.proc(&InputData { pitch_deg }).unwrap();
        (out.cmd, rpt.state)
    }

    #[test]
    fn test_pitch_sequence() {
        let mut ctrl = LevelCtrl::new(Params::default()).unwrap();

        let states: Vec<LevelState> = [5.0, 5.0, 1.0, -3.0, -3.0, 0.0]
            .iter()
            .map(|p| run(&mut ctrl, Some(*p)).1)
            .collect();

        assert_eq!(
            states,
            vec![
                LevelState::Extend,
                LevelState::Extend,
                LevelState::Flat,
                LevelState::Retract,
                LevelState::Retract,
                LevelState::Flat,
            ]
        );
    }

    #[test]
    fn test_thresholds_inclusive() {
        let mut ctrl = LevelCtrl::new(Params::default()).unwrap();

        let (cmd, state) = run(&mut ctrl, Some(2.0));
        assert_eq!(state, LevelState::Extend);
        assert_eq!(cmd, Some(ActuatorCommand::steps(Direction::Forward, 1, 0.0005)));

        let (cmd, state) = run(&mut ctrl, Some(-2.0));
        assert_eq!(state, LevelState::Retract);
        assert_eq!(cmd, Some(ActuatorCommand::steps(Direction::Reverse, 1, 0.0005)));

        for p in [1.999, -1.999, 0.0].iter() {
            let (cmd, state) = run(&mut ctrl, Some(*p));
            assert_eq!(state, LevelState::Flat);
            assert_eq!(cmd, None);
        }
    }

    #[test]
    fn test_missing_reading_is_not_zero() {
        let mut ctrl = LevelCtrl::new(Params::default()).unwrap();

        assert_eq!(run(&mut ctrl, None), (None, LevelState::NoReading));
        assert_eq!(run(&mut ctrl, Some(f64::NAN)), (None, LevelState::NoReading));

        // Recovers on the next good reading
        assert_eq!(run(&mut ctrl, Some(4.0)).1, LevelState::Extend);
    }

    #[test]
    fn test_invalid_params() {
        let p = Params {
            extend_threshold_deg: -2.0,
            retract_threshold_deg: 2.0,
            ..Params::default()
        };
        assert!(matches!(LevelCtrl::new(p), Err(LevelCtrlError::ParamsInvalid(_))));

        let p = Params {
            steps_per_cycle: 0,
            ..Params::default()
        };
        assert!(LevelCtrl::new(p).is_err());
    }
}
