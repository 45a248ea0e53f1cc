//! # Control Loop Runner
//!
//! Every concurrent part of the gimbal (the two sources and the three control loops) is a
//! [`CtrlUnit`] run on its own thread by [`run_unit`]. The runner owns the cycle timing and the
//! cancellation check, so the units only contain the read-decide-act logic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A unit of concurrency run by the supervisor.
pub trait CtrlUnit: Send {
    /// Name used in logs and for the thread.
    fn name(&self) -> &str;

    /// Target period of one idle cycle.
    fn period(&self) -> Duration;

    /// Perform one read-decide-act cycle.
    fn cycle(&mut self) -> Cycle;

    /// Stop and release any hardware owned by the unit.
    ///
    /// Called exactly once, after the last cycle.
    fn release(&mut self);
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of one cycle of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// The unit is holding an active state, run the next cycle straight away.
    Active,

    /// Nothing more to do this cycle, sleep out the rest of the period.
    Idle,

    /// The unit ran a timed actuation. Sleep out whatever is left of the period, a cycle longer
    /// than the period is expected and is not an overrun.
    Actuated,

    /// The unit has hit an unrecoverable fault, the whole gimbal must shut down.
    Fault,
}

/// Why a unit stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The running flag was cleared.
    Interrupted,

    /// The unit reported a fault.
    Faulted,

    /// The unit's thread panicked.
    Panicked,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the unit until `running` is cleared or the unit faults, then release it.
///
/// A faulting unit clears `running` itself so that every other unit shuts down too.
pub fn run_unit<U>(unit: &mut U, running: &AtomicBool) -> LoopExit
where
    U: CtrlUnit + ?Sized,
{
    let period = unit.period();

    info!("{} started, period {:.03} s", unit.name(), period.as_secs_f64());

    let exit = loop {
        if !running.load(Ordering::SeqCst) {
            break LoopExit::Interrupted;
        }

        let cycle_start_instant = Instant::now();

        let cycle = unit.cycle();

        if cycle == Cycle::Fault {
            error!("{} faulted, requesting shutdown", unit.name());
            running.store(false, Ordering::SeqCst);
            break LoopExit::Faulted;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        match pace(cycle, period, cycle_dur) {
            Pace::Continue => (),
            Pace::Sleep(d) => thread::sleep(d),
            Pace::Overrun(d) => warn!(
                "{} cycle overran by {:.06} s",
                unit.name(),
                d.as_secs_f64()
            ),
        }
    };

    info!("{} stopping ({:?}), releasing", unit.name(), exit);
    unit.release();

    exit
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// What to do between two cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pace {
    Continue,
    Sleep(Duration),
    Overrun(Duration),
}

/// Decide how long to wait after a cycle which took `cycle_dur`.
fn pace(cycle: Cycle, period: Duration, cycle_dur: Duration) -> Pace {
    match (cycle, period.checked_sub(cycle_dur)) {
        (Cycle::Active, _) | (Cycle::Fault, _) => Pace::Continue,
        (_, Some(d)) => Pace::Sleep(d),
        (Cycle::Idle, None) => Pace::Overrun(cycle_dur - period),
        (Cycle::Actuated, None) => Pace::Continue,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    /// Unit which plays back a fixed list of cycles then clears the running flag.
    struct ScriptedUnit {
        script: Vec<Cycle>,
        cycles: usize,
        releases: usize,
        running: Arc<AtomicBool>,
    }

    /// Takes three periods to actuate every cycle.
    struct SlowActuator {
        cycles: usize,
        running: Arc<AtomicBool>,
    }

    impl CtrlUnit for SlowActuator {
        fn name(&self) -> &str {
            "slow"
        }

        fn period(&self) -> Duration {
            Duration::from_millis(1)
        }

        fn cycle(&mut self) -> Cycle {
            thread::sleep(Duration::from_millis(3));
            self.cycles += 1;
            if self.cycles == 3 {
                self.running.store(false, Ordering::SeqCst);
            }
            Cycle::Actuated
        }

        fn release(&mut self) {}
    }

    impl CtrlUnit for ScriptedUnit {
        fn name(&self) -> &str {
            "scripted"
        }

        fn period(&self) -> Duration {
            Duration::from_millis(1)
        }

        fn cycle(&mut self) -> Cycle {
            let c = self.script.get(self.cycles).copied();
            self.cycles += 1;
            match c {
                Some(c) => c,
                None => {
                    self.running.store(false, Ordering::SeqCst);
                    Cycle::Idle
                }
            }
        }

        fn release(&mut self) {
            self.releases += 1;
        }
    }

    #[test]
    fn test_interrupted_unit_released_once() {
        let running = Arc::new(AtomicBool::new(true));
        let mut unit = ScriptedUnit {
            script: vec![Cycle::Active, Cycle::Idle, Cycle::Active],
            cycles: 0,
            releases: 0,
            running: running.clone(),
        };

        assert_eq!(run_unit(&mut unit, &running), LoopExit::Interrupted);
        assert_eq!(unit.cycles, 4);
        assert_eq!(unit.releases, 1);
    }

    #[test]
    fn test_fault_clears_running() {
        let running = Arc::new(AtomicBool::new(true));
        let mut unit = ScriptedUnit {
            script: vec![Cycle::Idle, Cycle::Fault, Cycle::Idle],
            cycles: 0,
            releases: 0,
            running: running.clone(),
        };

        assert_eq!(run_unit(&mut unit, &running), LoopExit::Faulted);
        assert!(!running.load(Ordering::SeqCst));
        assert_eq!(unit.cycles, 2);
        assert_eq!(unit.releases, 1);
    }

    #[test]
    fn test_pace() {
        let period = Duration::from_millis(50);

        assert_eq!(
            pace(Cycle::Idle, period, Duration::from_millis(20)),
            Pace::Sleep(Duration::from_millis(30))
        );
        assert_eq!(
            pace(Cycle::Idle, period, Duration::from_millis(60)),
            Pace::Overrun(Duration::from_millis(10))
        );
        assert_eq!(pace(Cycle::Active, period, Duration::from_millis(1)), Pace::Continue);

        // Actuating for longer than the period is not an overrun
        assert_eq!(pace(Cycle::Actuated, period, Duration::from_millis(1300)), Pace::Continue);
        assert_eq!(
            pace(Cycle::Actuated, period, Duration::from_millis(40)),
            Pace::Sleep(Duration::from_millis(10))
        );
    }

    #[test]
    fn test_long_actuation_keeps_running() {
        let running = Arc::new(AtomicBool::new(true));
        let mut unit = SlowActuator {
            cycles: 0,
            running: running.clone(),
        };

        assert_eq!(run_unit(&mut unit, &running), LoopExit::Interrupted);
        assert_eq!(unit.cycles, 3);
    }

    #[test]
    fn test_not_running_never_cycles() {
        let running = Arc::new(AtomicBool::new(false));
        let mut unit = ScriptedUnit {
            script: vec![],
            cycles: 0,
            releases: 0,
            running: running.clone(),
        };

        assert_eq!(run_unit(&mut unit, &running), LoopExit::Interrupted);
        assert_eq!(unit.cycles, 0);
        assert_eq!(unit.releases, 1);
    }
}
