//! Main gimbal executable entry point.
//!
//! # Architecture
//!
//! The executable runs five concurrent units, each on its own thread:
//!
//!     - Orientation source, publishing yaw, top pitch and bottom pitch
//!     - Target source, publishing the marker range and bearing
//!     - Levelling loop, driving the lead screw from the top pitch
//!     - Yaw tracking loop, driving the base from the yaw and bearing
//!     - Reach loop, driving the reach arm from the bottom pitch
//!
//! The units only share data through the channels owned by the supervisor. The process runs until
//! interrupted (or until an actuator driver faults), then every actuator is released and the pins
//! are reset exactly once.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{info, warn};
use std::sync::atomic::Ordering;
use std::thread;

// Internal
use gimbal_lib::{
    level_ctrl::LevelCtrl,
    params::GimbalExecParams,
    reach_ctrl::ReachCtrl,
    supervisor::{install_interrupt_handler, Controllers, Supervisor},
    yaw_ctrl::YawCtrl,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("gimbal_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Self-Levelling Tracking Gimbal Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: GimbalExecParams = util::params::load("gimbal_exec.toml")
        .wrap_err("Could not load exec params")?;

    let startup_delay = exec_params.startup_delay().ok_or_else(|| {
        eyre!("Invalid start-up delay of {} s", exec_params.startup_delay_s)
    })?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut level = LevelCtrl::default();
    level.init("level_ctrl.toml")
        .wrap_err("Failed to initialise LevelCtrl")?;
    info!("LevelCtrl init complete");

    let mut yaw = YawCtrl::default();
    yaw.init("yaw_ctrl.toml")
        .wrap_err("Failed to initialise YawCtrl")?;
    info!("YawCtrl init complete");

    let mut reach = ReachCtrl::default();
    reach.init("reach_ctrl.toml")
        .wrap_err("Failed to initialise ReachCtrl")?;
    info!("ReachCtrl init complete");

    let mut supervisor = Supervisor::new(exec_params.supervisor.clone())
        .wrap_err("Failed to create the supervisor")?;

    // Installed before the start-up delay so an early interrupt skips the start
    install_interrupt_handler(supervisor.running_flag())
        .wrap_err("Failed to install the interrupt handler")?;

    // ---- START-UP DELAY ----

    if !startup_delay.is_zero() {
        info!("Waiting {:.1} s for the sensors to settle", startup_delay.as_secs_f64());
        thread::sleep(startup_delay);
    }

    // ---- MAIN LOOP ----

    if supervisor.running_flag().load(Ordering::SeqCst) {
        let hardware = exec_params.build_hardware()
            .wrap_err("Failed to initialise the actuators")?;

        supervisor
            .start(hardware, Controllers { level, yaw, reach })
            .wrap_err("Failed to start the gimbal")?;

        info!("Gimbal running, interrupt to stop\n");

        supervisor.wait();
    } else {
        warn!("Interrupted during start-up");
    }

    // ---- SHUTDOWN ----

    info!("Shutting down");

    let report = supervisor.shutdown();

    info!("Units stopped: {:?}", report.exited);
    if !report.detached.is_empty() {
        warn!("Units left running: {:?}", report.detached);
    }
    info!("Pin cleanup performed: {}", report.cleanup_performed);

    session.exit();

    Ok(())
}
