//! Implementations for the YawCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::act::{ActuatorCommand, Direction};
use log::{info, trace};
use serde::Serialize;
use std::time::Duration;

// Internal
use super::{Params, YawCtrlError};
use util::{module::State, params, time::seconds_to_duration};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Yaw tracking module state
#[derive(Default)]
pub struct YawCtrl {
    pub(crate) params: Params,

    pub(crate) prev_state: Option<YawState>,
}

/// Input data to yaw tracking.
#[derive(Default, Clone, Copy, Debug)]
pub struct InputData {
    /// Yaw of the top unit.
    ///
    /// Units: degrees
    pub yaw_deg: Option<f64>,

    /// Latest target bearing.
    ///
    /// Units: degrees
    pub bearing_deg: Option<f64>,

    /// Whether the bearing was published since the previous cycle.
    pub bearing_fresh: bool,
}

/// Output command from YawCtrl that the base must execute.
#[derive(Default, Clone, Copy, Debug)]
pub struct OutputData {
    pub cmd: Option<ActuatorCommand>,
}

/// Status report for YawCtrl processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    pub state: YawState,

    /// Heading the base is being driven to, if there is a bearing.
    ///
    /// Units: degrees
    pub target_heading_deg: Option<f64>,

    /// Yaw minus target heading, if both are known.
    ///
    /// Units: degrees
    pub error_deg: Option<f64>,

    /// False when tracking on a bearing that has not been updated since the last cycle.
    pub bearing_fresh: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// States of the yaw tracking state machine.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum YawState {
    /// No yaw, or no bearing while inside the limits
    NoReading,

    /// Error is exactly zero
    OnTarget,

    /// Negative error, turning forward (clockwise)
    TrackForward,

    /// Positive error, turning in reverse (anticlockwise)
    TrackReverse,

    /// At or past the upper soft limit, forced reverse
    UpperLimit,

    /// At or past the lower soft limit, forced forward
    LowerLimit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for YawCtrl {
    type InitData = &'static str;
    type InitError = YawCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = YawCtrlError;

    /// Initialise the YawCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)
            .map_err(YawCtrlError::ParamLoadError)?;

        *self = Self::new(params)?;

        Ok(())
    }

    /// Perform cyclic processing of yaw tracking.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let yaw_deg = input_data.yaw_deg.filter(|y| y.is_finite());
        let bearing_deg = input_data.bearing_deg.filter(|b| b.is_finite());

        let target_heading_deg = bearing_deg.map(|b| self.target_heading(b));
        let error_deg = match (yaw_deg, target_heading_deg) {
            (Some(y), Some(h)) => Some(y - h),
            _ => None,
        };

        let state = self.calc_state(yaw_deg, error_deg);

        if self.prev_state != Some(state) {
            match state {
                YawState::TrackForward => info!("Rotating clockwise"),
                YawState::TrackReverse => info!("Rotating anticlockwise"),
                YawState::OnTarget => info!("On target"),
                YawState::UpperLimit => info!("Upper yaw limit, rotating anticlockwise"),
                YawState::LowerLimit => info!("Lower yaw limit, rotating clockwise"),
                YawState::NoReading => trace!("No yaw or bearing reading"),
            }
        }
        self.prev_state = Some(state);

        let cmd = match state {
            YawState::TrackForward | YawState::LowerLimit => Some(self.step_cmd(Direction::Forward)),
            YawState::TrackReverse | YawState::UpperLimit => Some(self.step_cmd(Direction::Reverse)),
            YawState::OnTarget | YawState::NoReading => None,
        };

        if !input_data.bearing_fresh {
            trace!("YawCtrl: tracking on a stale bearing");
        }

        trace!(
            "YawCtrl: yaw {:?}, heading {:?}, error {:?} -> {:?}",
            yaw_deg, target_heading_deg, error_deg, state
        );

        Ok((
            OutputData { cmd },
            StatusReport {
                state,
                target_heading_deg,
                error_deg,
                bearing_fresh: input_data.bearing_fresh,
            },
        ))
    }
}

impl YawCtrl {

    /// Create the module from already loaded parameters.
    pub fn new(params: Params) -> Result<Self, YawCtrlError> {
        params.are_valid().map_err(YawCtrlError::ParamsInvalid)?;

        Ok(Self {
            params,
            prev_state: None,
        })
    }

    pub fn period(&self) -> Duration {
        // Checked by Params::are_valid on construction
        seconds_to_duration(self.params.period_s).unwrap_or_default()
    }

    /// Heading the base must point along for the given bearing.
    ///
    /// No wrapping is applied, the heading lies in (offset - 360, offset].
    pub fn target_heading(&self, bearing_deg: f64) -> f64 {
        self.params.heading_offset_deg - bearing_deg
    }

    /// Decide the state. The soft limits are checked before the error.
    fn calc_state(&self, yaw_deg: Option<f64>, error_deg: Option<f64>) -> YawState {
        let yaw_deg = match yaw_deg {
            Some(y) => y,
            None => return YawState::NoReading,
        };

        if yaw_deg >= self.params.upper_limit_deg {
            return YawState::UpperLimit;
        }
        if yaw_deg <= self.params.lower_limit_deg {
            return YawState::LowerLimit;
        }

        match error_deg {
            Some(e) if e < 0.0 => YawState::TrackForward,
            Some(e) if e > 0.0 => YawState::TrackReverse,
            Some(_) => YawState::OnTarget,
            None => YawState::NoReading,
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

    fn input(yaw_deg: Option<f64>, bearing_deg: Option<f64>) -> InputData {
        InputData {
            yaw_deg,
            bearing_deg,
            bearing_fresh: true,
        }
    }

    #[test]
    fn test_tracking_scenario() {
        let mut ctrl = YawCtrl::new(Params::default()).unwrap();

        let (out, rpt) = ctrl.proc(&input(Some(10.0), Some(100.0))).unwrap();

        assert_eq!(rpt.target_heading_deg, Some(170.0));
        assert_eq!(rpt.error_deg, Some(-160.0));
        assert_eq!(rpt.state, YawState::TrackForward);
        assert_eq!(out.cmd, Some(ActuatorCommand::steps(Direction::Forward, 50, 0.0005)));
    }

    #[test]
    fn test_error_sign_inside_band() {
        let mut ctrl = YawCtrl::new(Params::default()).unwrap();

        // error = 20 - (270 - 260) = 10
        let (out, rpt) = ctrl.proc(&input(Some(20.0), Some(260.0))).unwrap();
        assert_eq!(rpt.state, YawState::TrackReverse);
        assert_eq!(out.cmd.map(|c| c.dir), Some(Direction::Reverse));

        // error = 0
        let (out, rpt) = ctrl.proc(&input(Some(-10.0), Some(280.0))).unwrap();
        assert_eq!(rpt.error_deg, Some(0.0));
        assert_eq!(rpt.state, YawState::OnTarget);
        assert!(out.cmd.is_none());
    }

    #[test]
    fn test_soft_limits_override_error() {
        let mut ctrl = YawCtrl::new(Params::default()).unwrap();

        for b in [None, Some(0.0), Some(100.0), Some(359.0)].iter() {
            let (out, rpt) = ctrl.proc(&input(Some(35.0), *b)).unwrap();
            assert_eq!(rpt.state, YawState::UpperLimit);
            assert_eq!(out.cmd.map(|c| c.dir), Some(Direction::Reverse));

            let (out, rpt) = ctrl.proc(&input(Some(-35.0), *b)).unwrap();
            assert_eq!(rpt.state, YawState::LowerLimit);
            assert_eq!(out.cmd.map(|c| c.dir), Some(Direction::Forward));
        }

        // Limits are inclusive
        let (_, rpt) = ctrl.proc(&input(Some(30.0), Some(100.0))).unwrap();
        assert_eq!(rpt.state, YawState::UpperLimit);
        let (_, rpt) = ctrl.proc(&input(Some(-30.0), Some(100.0))).unwrap();
        assert_eq!(rpt.state, YawState::LowerLimit);
    }

    #[test]
    fn test_missing_readings() {
        let mut ctrl = YawCtrl::new(Params::default()).unwrap();

        let (out, rpt) = ctrl.proc(&input(None, Some(100.0))).unwrap();
        assert_eq!(rpt.state, YawState::NoReading);
        assert!(out.cmd.is_none());

        let (out, rpt) = ctrl.proc(&input(Some(0.0), None)).unwrap();
        assert_eq!(rpt.state, YawState::NoReading);
        assert!(out.cmd.is_none());

        let (out, _) = ctrl.proc(&input(Some(f64::NAN), Some(100.0))).unwrap();
        assert!(out.cmd.is_none());
    }

    #[test]
    fn test_stale_bearing_still_tracks() {
        let mut ctrl = YawCtrl::new(Params::default()).unwrap();

        let (out, rpt) = ctrl
            .proc(&InputData {
                yaw_deg: Some(10.0),
                bearing_deg: Some(100.0),
                bearing_fresh: false,
            })
            .unwrap();

        assert!(!rpt.bearing_fresh);
        assert_eq!(out.cmd.map(|c| c.dir), Some(Direction::Forward));
    }

    #[test]
    fn test_invalid_params() {
        let p = Params {
            upper_limit_deg: -40.0,
            ..Params::default()
        };
        assert!(matches!(YawCtrl::new(p), Err(YawCtrlError::ParamsInvalid(_))));
    }
}
