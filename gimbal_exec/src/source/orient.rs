//! Orientation source unit

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use comms_if::{
    channel::ChannelWriter,
    eqpt::orient::{EulerAngles, ImuId, OrientationReading},
};
use log::{info, trace, warn};

use super::OrientationSensor;
use crate::ctrl_loop::{CtrlUnit, Cycle};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Publishes the readings of both orientation units.
///
/// A unit reporting no reading leaves its channels holding the last value. A unit reporting an
/// error has its channels cleared until it recovers, so the loops never act on a dead sensor.
pub struct OrientationSource {
    top: Box<dyn OrientationSensor>,
    bot: Box<dyn OrientationSensor>,

    yaw: ChannelWriter<f64>,
    top_pitch: ChannelWriter<f64>,
    bot_pitch: ChannelWriter<f64>,

    period: Duration,

    top_failed: bool,
    bot_failed: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OrientationSource {
    pub fn new(
        top: Box<dyn OrientationSensor>,
        bot: Box<dyn OrientationSensor>,
        yaw: ChannelWriter<f64>,
        top_pitch: ChannelWriter<f64>,
        bot_pitch: ChannelWriter<f64>,
        period: Duration,
    ) -> Self {
        Self {
            top,
            bot,
            yaw,
            top_pitch,
            bot_pitch,
            period,
            top_failed: false,
            bot_failed: false,
        }
    }

    /// Read one unit, tracking failure transitions.
    ///
    /// Returns the reading, and whether the unit's channels must be cleared.
    fn read_unit(
        sensor: &mut dyn OrientationSensor,
        id: ImuId,
        failed: &mut bool,
    ) -> (Option<EulerAngles>, bool) {
        match sensor.euler_angles() {
            Ok(r) => {
                if *failed {
                    info!("The {} recovered", id);
                    *failed = false;
                }
                if r.is_none() {
                    trace!("No reading from the {}", id);
                }
                (r, false)
            }
            Err(e) => {
                if !*failed {
                    warn!("The {} failed: {}", id, e);
                    *failed = true;
                }
                (None, true)
            }
        }
    }
}

impl CtrlUnit for OrientationSource {
    fn name(&self) -> &str {
        "orient_src"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn cycle(&mut self) -> Cycle {
        let (top, clear_top) = Self::read_unit(self.top.as_mut(), ImuId::Top, &mut self.top_failed);
        let (bot, clear_bot) = Self::read_unit(self.bot.as_mut(), ImuId::Bottom, &mut self.bot_failed);

        if clear_top {
            self.yaw.clear();
            self.top_pitch.clear();
        }
        if clear_bot {
            self.bot_pitch.clear();
        }

        let reading = OrientationReading::from_units(top, bot);

        if let Some(y) = reading.yaw_deg {
            self.yaw.write(y);
        }
        if let Some(p) = reading.top_pitch_deg {
            self.top_pitch.write(p);
        }
        if let Some(p) = reading.bot_pitch_deg {
            self.bot_pitch.write(p);
        }

        Cycle::Idle
    }

    fn release(&mut self) {}
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::source::SensorError;
    use comms_if::channel::channel;
    use std::collections::VecDeque;

    /// Plays back a fixed list of results
    struct Scripted(VecDeque<Result<Option<EulerAngles>, SensorError>>);

    impl OrientationSensor for Scripted {
        fn euler_angles(&mut self) -> Result<Option<EulerAngles>, SensorError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn angles(yaw_deg: f64, pitch_deg: f64) -> Option<EulerAngles> {
        Some(EulerAngles {
            yaw_deg,
            pitch_deg,
            roll_deg: 0.0,
        })
    }

    #[test]
    fn test_orientation_source() {
        let (yaw_tx, yaw_rx) = channel();
        let (top_tx, top_rx) = channel();
        let (bot_tx, bot_rx) = channel();

        let top = Scripted(
            vec![
                Ok(angles(10.0, 3.0)),
                Ok(None),
                Err(SensorError::Comms("bus error".into())),
                Ok(angles(12.0, 1.0)),
            ]
            .into_iter()
            .collect(),
        );
        let bot = Scripted(
            vec![Ok(angles(0.0, -80.0)), Ok(angles(0.0, -75.0))]
                .into_iter()
                .collect(),
        );

        let mut src = OrientationSource::new(
            Box::new(top),
            Box::new(bot),
            yaw_tx,
            top_tx,
            bot_tx,
            Duration::from_millis(10),
        );

        assert_eq!(yaw_rx.read(), None);

        src.cycle();
        assert_eq!(yaw_rx.read(), Some(10.0));
        assert_eq!(top_rx.read(), Some(3.0));
        assert_eq!(bot_rx.read(), Some(-80.0));

        // No reading keeps the last value
        src.cycle();
        assert_eq!(yaw_rx.read(), Some(10.0));
        assert_eq!(bot_rx.read(), Some(-75.0));

        // Error clears only the failed unit's channels
        src.cycle();
        assert_eq!(yaw_rx.read(), None);
        assert_eq!(top_rx.read(), None);
        assert_eq!(bot_rx.read(), Some(-75.0));

        src.cycle();
        assert_eq!(yaw_rx.read(), Some(12.0));
        assert_eq!(top_rx.read(), Some(1.0));
    }
}
