//! # Supervisor
//!
//! The supervisor owns the shared channels and the threads running each unit of the gimbal.
//!
//! All five channels are allocated when the supervisor is created, before any unit runs. On start
//! each channel writer is handed to exactly one source unit and the readers to the control loops,
//! then every unit is spawned on its own named thread. All units watch a single running flag, which
//! is cleared by the interrupt handler, by a unit that faults or by a panicking unit.
//!
//! On shutdown the supervisor clears the flag, gives the units a grace period to stop and release
//! their actuators, and then runs the global pin [`Teardown`], which only ever happens once.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use comms_if::channel::{channel, ChannelWriter};
use log::{error, info, warn};
use serde::Deserialize;
use util::time::seconds_to_duration;

use crate::act_driver::{self, ActuatorDriver};
use crate::ctrl_loop::{run_unit, CtrlUnit, LoopExit};
use crate::level_ctrl::{LevelCtrl, LevelUnit};
use crate::reach_ctrl::{ReachCtrl, ReachUnit};
use crate::source::{OrientationSensor, OrientationSource, TargetDetector, TargetSource};
use crate::yaw_ctrl::{YawCtrl, YawUnit};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// How often [`Supervisor::wait`] and [`Supervisor::shutdown`] poll the units.
const POLL_PERIOD: Duration = Duration::from_millis(10);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Supervisor parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorParams {
    /// Period of the orientation source.
    ///
    /// Units: seconds
    pub orient_period_s: f64,

    /// Period of the target source.
    ///
    /// Units: seconds
    pub target_period_s: f64,

    /// Time given to the units to stop after the running flag is cleared.
    ///
    /// Units: seconds
    pub shutdown_grace_s: f64,
}

/// The sensors and actuators handed to the units on start.
pub struct Hardware {
    pub top_imu: Box<dyn OrientationSensor>,
    pub bot_imu: Box<dyn OrientationSensor>,
    pub detector: Box<dyn TargetDetector>,

    pub level_act: Box<dyn ActuatorDriver>,
    pub yaw_act: Box<dyn ActuatorDriver>,
    pub reach_act: Box<dyn ActuatorDriver>,

    /// Every GPIO pin used by the actuators, reset during teardown.
    pub pins: Vec<u8>,
}

/// The initialised control modules.
pub struct Controllers {
    pub level: LevelCtrl,
    pub yaw: YawCtrl,
    pub reach: ReachCtrl,
}

pub struct Supervisor {
    timing: Timing,

    running: Arc<AtomicBool>,

    /// `None` once the channels have been handed to the units.
    channels: Option<Channels>,

    units: Vec<UnitHandle>,

    teardown: Option<Teardown>,
}

/// What happened to each unit during shutdown.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Units which stopped, with the reason.
    pub exited: Vec<(String, LoopExit)>,

    /// Units still running at the end of the grace period, left detached.
    pub detached: Vec<String>,

    /// Whether this shutdown performed the pin teardown.
    pub cleanup_performed: bool,
}

/// Global hardware cleanup, performed exactly once however many times it is run.
#[derive(Debug)]
pub struct Teardown {
    done: AtomicBool,

    pins: Vec<u8>,
}

/// Validated supervisor periods.
#[derive(Debug, Clone, Copy)]
struct Timing {
    orient_period: Duration,
    target_period: Duration,
    shutdown_grace: Duration,
}

struct Channels {
    yaw: ChannelWriter<f64>,
    top_pitch: ChannelWriter<f64>,
    bot_pitch: ChannelWriter<f64>,
    range: ChannelWriter<f64>,
    bearing: ChannelWriter<f64>,
}

struct UnitHandle {
    name: String,
    handle: JoinHandle<LoopExit>,
}

/// Clears the running flag if the thread holding it unwinds.
struct PanicGuard {
    name: String,
    running: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    #[error("The supervisor has already been started")]
    AlreadyStarted,

    #[error("Invalid parameter {0}: {1}")]
    InvalidPeriod(&'static str, f64),

    #[error("Could not spawn the {0} thread: {1}")]
    SpawnFailed(String, std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Clear `running` when the process receives SIGINT or SIGTERM.
///
/// Only one handler can be installed per process, a second call returns an error.
pub fn install_interrupt_handler(running: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SupervisorParams {
    fn validate(&self) -> Result<Timing, SupervisorError> {
        let check = |name: &'static str, v: f64, allow_zero: bool| {
            match seconds_to_duration(v) {
                Some(d) if allow_zero || !d.is_zero() => Ok(d),
                _ => Err(SupervisorError::InvalidPeriod(name, v)),
            }
        };

        // Periods must be non-zero, a zero grace period detaches anything still running
        Ok(Timing {
            orient_period: check("orient_period_s", self.orient_period_s, false)?,
            target_period: check("target_period_s", self.target_period_s, false)?,
            shutdown_grace: check("shutdown_grace_s", self.shutdown_grace_s, true)?,
        })
    }
}

impl Supervisor {
    /// Create the supervisor and allocate every channel.
    pub fn new(params: SupervisorParams) -> Result<Self, SupervisorError> {
        let timing = params.validate()?;

        let channels = Channels {
            yaw: channel().0,
            top_pitch: channel().0,
            bot_pitch: channel().0,
            range: channel().0,
            bearing: channel().0,
        };

        Ok(Self {
            timing,
            running: Arc::new(AtomicBool::new(true)),
            channels: Some(channels),
            units: Vec::new(),
            teardown: None,
        })
    }

    /// The cancellation flag shared by every unit. Clearing it stops the gimbal.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Hand the channels and hardware to the units and start them.
    pub fn start(&mut self, hw: Hardware, ctrls: Controllers) -> Result<(), SupervisorError> {
        let channels = self.channels.take().ok_or(SupervisorError::AlreadyStarted)?;
        let Timing {
            orient_period,
            target_period,
            ..
        } = self.timing;

        self.teardown = Some(Teardown::new(hw.pins));

        let level = LevelUnit::new(ctrls.level, channels.top_pitch.reader(), hw.level_act);
        let yaw = YawUnit::new(
            ctrls.yaw,
            channels.yaw.reader(),
            channels.bearing.reader(),
            hw.yaw_act,
        );
        let reach = ReachUnit::new(ctrls.reach, channels.bot_pitch.reader(), hw.reach_act);

        let orient_src = OrientationSource::new(
            hw.top_imu,
            hw.bot_imu,
            channels.yaw,
            channels.top_pitch,
            channels.bot_pitch,
            orient_period,
        );
        let target_src = TargetSource::new(
            hw.detector,
            channels.range,
            channels.bearing,
            target_period,
        );

        let units: Vec<Box<dyn CtrlUnit>> = vec![
            Box::new(orient_src),
            Box::new(target_src),
            Box::new(level),
            Box::new(yaw),
            Box::new(reach),
        ];

        for unit in units {
            if let Err(e) = self.spawn(unit) {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }

        info!("All {} units started", self.units.len());

        Ok(())
    }

    /// Block until the running flag is cleared.
    pub fn wait(&self) {
        while self.running.load(Ordering::SeqCst) {
            thread::sleep(POLL_PERIOD);
        }
    }

    /// Stop every unit and perform the pin teardown.
    ///
    /// Units which have not stopped within the grace period are left detached.
    pub fn shutdown(&mut self) -> ShutdownReport {
        self.running.store(false, Ordering::SeqCst);

        let deadline = Instant::now() + self.timing.shutdown_grace;

        while Instant::now() < deadline && self.units.iter().any(|u| !u.handle.is_finished()) {
            thread::sleep(POLL_PERIOD);
        }

        let mut report = ShutdownReport::default();

        for unit in self.units.drain(..) {
            if unit.handle.is_finished() {
                let exit = unit.handle.join().unwrap_or(LoopExit::Panicked);
                info!("{} exited: {:?}", unit.name, exit);
                report.exited.push((unit.name, exit));
            } else {
                warn!("{} did not stop within the grace period, detaching", unit.name);
                report.detached.push(unit.name);
            }
        }

        report.cleanup_performed = self.teardown.as_ref().map(Teardown::run).unwrap_or(false);

        report
    }

    fn spawn(&mut self, mut unit: Box<dyn CtrlUnit>) -> Result<(), SupervisorError> {
        let name = unit.name().to_string();
        let running = self.running.clone();

        let guard = PanicGuard {
            name: name.clone(),
            running: running.clone(),
        };

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let _guard = guard;
                run_unit(unit.as_mut(), &running)
            })
            .map_err(|e| SupervisorError::SpawnFailed(name.clone(), e))?;

        self.units.push(UnitHandle { name, handle });

        Ok(())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(t) = self.teardown.as_ref() {
            t.run();
        }
    }
}

impl Teardown {
    pub fn new(pins: Vec<u8>) -> Self {
        Self {
            done: AtomicBool::new(false),
            pins,
        }
    }

    /// Reset every pin. Returns `true` only for the call which did the work.
    pub fn run(&self) -> bool {
        if self.done.swap(true, Ordering::SeqCst) {
            return false;
        }

        info!("Resetting actuator pins {:?}", self.pins);
        act_driver::reset_pins(&self.pins);

        true
    }
}

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("{} panicked, requesting shutdown", self.name);
            self.running.store(false, Ordering::SeqCst);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::act_driver::{SimActuator, SimEvent, SimEventLog};
    use crate::source::sim::{SimDetector, SimDetectorParams, SimImu, SimImuParams};
    use crate::{level_ctrl, reach_ctrl, yaw_ctrl};
    use comms_if::eqpt::act::ActId;

    fn params() -> SupervisorParams {
        SupervisorParams {
            orient_period_s: 0.002,
            target_period_s: 0.005,
            shutdown_grace_s: 2.0,
        }
    }

    fn controllers() -> Controllers {
        Controllers {
            level: LevelCtrl::new(level_ctrl::Params::default()).unwrap(),
            yaw: YawCtrl::new(yaw_ctrl::Params::default()).unwrap(),
            reach: ReachCtrl::new(reach_ctrl::Params {
                down_duration_s: 0.001,
                up_duration_s: 0.001,
                ..reach_ctrl::Params::default()
            })
            .unwrap(),
        }
    }

    fn imu(pitch_range_deg: (f64, f64)) -> Box<SimImu> {
        Box::new(SimImu::new(SimImuParams {
            yaw_range_deg: (-40.0, 40.0),
            pitch_range_deg,
            samples_per_wave: 20,
            dropout_every: 7,
        }))
    }

    fn hardware(level_act: SimActuator) -> (Hardware, Vec<SimEventLog>) {
        let yaw_act = SimActuator::new(ActId::Yaw).with_realtime(true);
        let reach_act = SimActuator::new(ActId::Reach);
        let logs = vec![level_act.event_log(), yaw_act.event_log(), reach_act.event_log()];

        let hw = Hardware {
            top_imu: imu((-5.0, 5.0)),
            bot_imu: imu((-85.0, -75.0)),
            detector: Box::new(SimDetector::new(SimDetectorParams {
                range: 1.0,
                bearing_range_deg: (200.0, 340.0),
                samples_per_wave: 10,
                dropout_every: 3,
            })),
            level_act: Box::new(level_act),
            yaw_act: Box::new(yaw_act),
            reach_act: Box::new(reach_act),
            pins: vec![17, 27, 18],
        };

        (hw, logs)
    }

    #[test]
    fn test_teardown_once() {
        let t = Teardown::new(vec![1, 2, 3]);
        assert!(t.run());
        assert!(!t.run());
        assert!(!t.run());
    }

    #[test]
    fn test_invalid_params() {
        let p = SupervisorParams {
            orient_period_s: f64::NAN,
            ..params()
        };
        assert!(matches!(Supervisor::new(p), Err(SupervisorError::InvalidPeriod(_, _))));

        // Too large to be a duration
        let p = SupervisorParams {
            shutdown_grace_s: 1e300,
            ..params()
        };
        assert!(matches!(
            Supervisor::new(p),
            Err(SupervisorError::InvalidPeriod("shutdown_grace_s", _))
        ));

        let p = SupervisorParams {
            target_period_s: 0.0,
            ..params()
        };
        assert!(matches!(
            Supervisor::new(p),
            Err(SupervisorError::InvalidPeriod("target_period_s", _))
        ));
    }

    #[test]
    fn test_start_and_shutdown() {
        let (hw, logs) = hardware(SimActuator::new(ActId::Level).with_realtime(true));

        let mut sup = Supervisor::new(params()).unwrap();
        sup.start(hw, controllers()).unwrap();

        thread::sleep(Duration::from_millis(200));
        assert!(sup.running_flag().load(Ordering::SeqCst));

        let report = sup.shutdown();

        assert_eq!(report.exited.len(), 5);
        assert!(report.detached.is_empty());
        assert!(report.cleanup_performed);
        assert!(report.exited.iter().all(|(_, e)| *e == LoopExit::Interrupted));

        // Every actuator moved and was released exactly once, last
        for log in logs.iter() {
            let events = log.snapshot();
            assert!(!log.motions().is_empty());
            assert_eq!(events.last(), Some(&SimEvent::Release));
            assert_eq!(events.iter().filter(|e| **e == SimEvent::Release).count(), 1);
        }

        // A second shutdown has nothing left to do
        let again = sup.shutdown();
        assert!(again.exited.is_empty());
        assert!(!again.cleanup_performed);
    }

    #[test]
    fn test_start_twice() {
        let mut sup = Supervisor::new(params()).unwrap();
        sup.start(hardware(SimActuator::new(ActId::Level)).0, controllers()).unwrap();

        assert!(matches!(
            sup.start(hardware(SimActuator::new(ActId::Level)).0, controllers()),
            Err(SupervisorError::AlreadyStarted)
        ));

        sup.shutdown();
    }

    #[test]
    fn test_driver_fault_stops_everything() {
        // A released actuator fails every motion command
        let mut level_act = SimActuator::new(ActId::Level);
        level_act.release().unwrap();

        let (mut hw, _) = hardware(level_act);
        hw.top_imu = imu((4.0, 6.0));

        let mut sup = Supervisor::new(params()).unwrap();
        sup.start(hw, controllers()).unwrap();

        // Returns once the level loop faults
        sup.wait();

        let report = sup.shutdown();
        assert!(report.exited.contains(&("level_ctrl".to_string(), LoopExit::Faulted)));
        assert!(report.cleanup_performed);
    }
}
