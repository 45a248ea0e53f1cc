//! Control module interface
//!
//! Each control module in `gimbal_exec` implements [`State`]. A module only decides what to do from
//! its inputs, it never touches the hardware itself. The loop unit wrapping it reads the shared
//! channels, calls [`State::proc`] and hands the output to its actuator.

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data required during initialisation, usually the parameter file name.
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// The readings consumed by one cycle.
    type InputData;
    /// The commands produced by one cycle.
    type OutputData;
    /// A report on the state the module decided on.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Initialise the module, replacing any previous state.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Decide on this cycle's output from the latest readings.
    ///
    /// Missing readings are part of the input, not an error. A module given no reading produces no
    /// command.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
