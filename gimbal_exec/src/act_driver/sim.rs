//! Simulated actuator
//!
//! Records every command it is given so that control loops can be run and checked without any
//! hardware attached.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use comms_if::eqpt::act::{ActId, Direction};
use log::trace;

use super::{validate_duty, validate_step_delay, ActDriverError, ActuatorDriver};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An actuator which records the commands sent to it.
pub struct SimActuator {
    id: ActId,

    events: SimEventLog,

    /// If true step commands take as long as they would on the real motor
    realtime: bool,

    released: bool,
}

/// Shared handle onto the events recorded by a [`SimActuator`].
///
/// The handle stays valid after the actuator has been moved into a control loop.
#[derive(Clone, Default)]
pub struct SimEventLog {
    events: Arc<Mutex<Vec<SimEvent>>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A recorded actuator event.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Step { dir: Direction, count: u32 },
    Drive { dir: Direction, duty: f64 },
    Stop,
    Release,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimActuator {
    pub fn new(id: ActId) -> Self {
        Self {
            id,
            events: SimEventLog::default(),
            realtime: false,
            released: false,
        }
    }

    /// Make step commands block for the time the real motor would take.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Get a handle onto the recorded events.
    pub fn event_log(&self) -> SimEventLog {
        self.events.clone()
    }

    fn check_not_released(&self) -> Result<(), ActDriverError> {
        match self.released {
            true => Err(ActDriverError::Released(self.id)),
            false => Ok(()),
        }
    }
}

impl ActuatorDriver for SimActuator {
    fn id(&self) -> ActId {
        self.id
    }

    fn step(&mut self, dir: Direction, count: u32, delay_s: f64) -> Result<(), ActDriverError> {
        self.check_not_released()?;
        validate_step_delay(delay_s)?;

        trace!("[sim {}] step {:?} x{}", self.id, dir, count);
        self.events.push(SimEvent::Step { dir, count });

        if self.realtime {
            // One high and one low edge per step
            if let Ok(d) = Duration::try_from_secs_f64(2.0 * delay_s * count as f64) {
                thread::sleep(d);
            }
        }

        Ok(())
    }

    fn drive(&mut self, dir: Direction, duty: f64) -> Result<(), ActDriverError> {
        self.check_not_released()?;
        validate_duty(duty)?;

        trace!("[sim {}] drive {:?} at {:.2}", self.id, dir, duty);
        self.events.push(SimEvent::Drive { dir, duty });

        Ok(())
    }

    fn nudge(&mut self, dir: Direction) -> Result<(), ActDriverError> {
        self.check_not_released()?;

        self.events.push(SimEvent::Step { dir, count: 1 });

        Ok(())
    }

    fn stop(&mut self) -> Result<(), ActDriverError> {
        if self.released {
            return Ok(());
        }

        self.events.push(SimEvent::Stop);

        Ok(())
    }

    fn release(&mut self) -> Result<(), ActDriverError> {
        if self.released {
            return Ok(());
        }

        self.stop()?;
        self.events.push(SimEvent::Release);
        self.released = true;

        Ok(())
    }
}

impl SimEventLog {
    fn push(&self, event: SimEvent) {
        // A poisoned log only happens if a test thread panicked, keep recording anyway
        match self.events.lock() {
            Ok(mut e) => e.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    /// Copy of all events recorded so far.
    pub fn snapshot(&self) -> Vec<SimEvent> {
        match self.events.lock() {
            Ok(e) => e.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Only the motion events (steps and drives) recorded so far.
    pub fn motions(&self) -> Vec<SimEvent> {
        self.snapshot()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::Step { .. } | SimEvent::Drive { .. }))
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stop_release_idempotent() {
        let mut act = SimActuator::new(ActId::Reach);
        let log = act.event_log();

        act.drive(Direction::Forward, 1.0).unwrap();
        act.release().unwrap();
        let after_once = log.snapshot();

        // Second stop and release change nothing and don't error
        act.stop().unwrap();
        act.release().unwrap();

        assert_eq!(log.snapshot(), after_once);
        assert_eq!(
            after_once,
            vec![
                SimEvent::Drive { dir: Direction::Forward, duty: 1.0 },
                SimEvent::Stop,
                SimEvent::Release,
            ]
        );

        // Released for good, even after a repeated release
        assert!(matches!(
            act.drive(Direction::Forward, 1.0),
            Err(ActDriverError::Released(ActId::Reach))
        ));
        assert_eq!(log.snapshot(), after_once);
    }

    #[test]
    fn test_released_rejects_motion() {
        let mut act = SimActuator::new(ActId::Yaw);
        act.release().unwrap();

        assert!(matches!(
            act.step(Direction::Forward, 50, 0.0005),
            Err(ActDriverError::Released(ActId::Yaw))
        ));
        assert!(act.nudge(Direction::Reverse).is_err());
    }

    #[test]
    fn test_invalid_commands() {
        let mut act = SimActuator::new(ActId::Reach);
        let log = act.event_log();

        assert!(matches!(
            act.drive(Direction::Forward, 1.5),
            Err(ActDriverError::InvalidDutyCycle(_))
        ));
        assert!(matches!(
            act.step(Direction::Forward, 1, -1.0),
            Err(ActDriverError::InvalidStepDelay(_))
        ));
        assert!(log.snapshot().is_empty());
    }
}
