//! Implementations for the ReachCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::act::{ActuatorCommand, Direction};
use log::{info, trace};
use serde::Serialize;
use std::time::Duration;

// Internal
use super::{Params, ReachCtrlError};
use util::{maths::in_closed_range, module::State, params, time::seconds_to_duration};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reach control module state
#[derive(Default)]
pub struct ReachCtrl {
    pub(crate) params: Params,

    pub(crate) prev_state: Option<ReachState>,
}

/// Input data to reach control.
#[derive(Default, Clone, Copy, Debug)]
pub struct InputData {
    /// Pitch of the bottom unit.
    ///
    /// Units: degrees
    pub pitch_deg: Option<f64>,
}

/// One timed drive of the reach motor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReachPulse {
    pub cmd: ActuatorCommand,

    /// How long to hold the drive before the next pulse.
    ///
    /// Units: seconds
    pub duration_s: f64,
}

/// Output of ReachCtrl, the pulses to run in order this cycle.
#[derive(Default, Clone, Debug)]
pub struct OutputData {
    pub pulses: Vec<ReachPulse>,
}

/// Status report for ReachCtrl processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    pub state: ReachState,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum ReachState {
    /// Pitch inside the window, working the arm
    Active,

    /// Pitch outside the window
    Idle,

    NoReading,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ReachCtrl {
    type InitData = &'static str;
    type InitError = ReachCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ReachCtrlError;

    /// Initialise the ReachCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(ReachCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        Ok(())
    }

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let state = match input_data.pitch_deg.filter(|p| p.is_finite()) {
            Some(p) if in_closed_range(p, self.params.window_min_deg, self.params.window_max_deg) => {
                ReachState::Active
            }
            Some(_) => ReachState::Idle,
            None => ReachState::NoReading,
        };

        if self.prev_state != Some(state) {
            match state {
                ReachState::Active => info!("Reach window entered"),
                ReachState::Idle => info!("Outside reach window"),
                ReachState::NoReading => trace!("No bottom pitch reading"),
            }
        }
        self.prev_state = Some(state);

        let pulses = match state {
            ReachState::Active => vec![
                ReachPulse {
                    cmd: ActuatorCommand::duty(Direction::Forward, self.params.down_duty),
                    duration_s: self.params.down_duration_s,
                },
                ReachPulse {
                    cmd: ActuatorCommand::duty(Direction::Reverse, self.params.up_duty),
                    duration_s: self.params.up_duration_s,
                },
            ],
            ReachState::Idle | ReachState::NoReading => Vec::new(),
        };

        Ok((OutputData { pulses }, StatusReport { state }))
    }
}

impl ReachCtrl {

    /// Create the module from already loaded parameters.
    pub fn new(params: Params) -> Result<Self, ReachCtrlError> {
        params.are_valid().map_err(ReachCtrlError::ParamsInvalid)?;

        Ok(Self {
            params,
            prev_state: None,
        })
    }

    pub fn period(&self) -> Duration {
        // Checked by Params::are_valid on construction
        seconds_to_duration(self.params.period_s).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn state_for(ctrl: &mut ReachCtrl, pitch_deg: Option<f64>) -> (usize, ReachState) {
        let (out, rpt) = ctrl.proc(&InputData { pitch_deg }).unwrap();
        (out.pulses.len(), rpt.state)
    }

    #[test]
    fn test_window_gating() {
        let mut ctrl = ReachCtrl::new(Params::default()).unwrap();

        assert_eq!(state_for(&mut ctrl, Some(-80.0)), (2, ReachState::Active));
        assert_eq!(state_for(&mut ctrl, Some(-90.0)), (2, ReachState::Active));
        assert_eq!(state_for(&mut ctrl, Some(-70.0)), (2, ReachState::Active));
        assert_eq!(state_for(&mut ctrl, Some(-69.0)), (0, ReachState::Idle));
        assert_eq!(state_for(&mut ctrl, Some(-91.0)), (0, ReachState::Idle));
        assert_eq!(state_for(&mut ctrl, Some(0.0)), (0, ReachState::Idle));
        assert_eq!(state_for(&mut ctrl, None), (0, ReachState::NoReading));
    }

    #[test]
    fn test_pulse_sequence() {
        let mut ctrl = ReachCtrl::new(Params::default()).unwrap();

        let (out, _) = ctrl.proc(&InputData { pitch_deg: Some(-75.0) }).unwrap();

        assert_eq!(
            out.pulses,
            vec![
                ReachPulse {
                    cmd: ActuatorCommand::duty(Direction::Forward, 1.0),
                    duration_s: 0.5,
                },
                ReachPulse {
                    cmd: ActuatorCommand::duty(Direction::Reverse, 1.0),
                    duration_s: 0.8,
                },
            ]
        );
    }

    #[test]
    fn test_invalid_params() {
        let p = Params {
            up_duty: 1.5,
            ..Params::default()
        };
        assert!(ReachCtrl::new(p).is_err());

        let p = Params {
            window_min_deg: -60.0,
            ..Params::default()
        };
        assert!(ReachCtrl::new(p).is_err());
    }
}
