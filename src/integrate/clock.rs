//! Time bookkeeping of a simulation
//!
//! Periodic actions come in two flavours. Actions tied to simulation
//! time ([`TimeCadence`]) fire once the time has passed the next due
//! time. Actions tied to the step count ([`StepCadence`]) fire every
//! `cadence` steps.
use crate::error::Result;
use crate::hdf5::{read_scalar_from_hdf5, write_scalar_to_hdf5};
use crate::params::Parameters;
use std::path::Path;

/// Action due every `cadence` units of simulation time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeCadence {
    /// Next due time
    pub counter: f64,
    /// Distance between due times
    pub cadence: f64,
}

impl TimeCadence {
    /// First due at `t = 0`
    pub fn new(cadence: f64) -> Self {
        Self {
            counter: 0.,
            cadence,
        }
    }

    /// True if `t` reached the due time
    pub fn is_due(&self, t: f64) -> bool {
        self.counter <= t
    }

    /// Move the due time one cadence ahead
    pub fn advance(&mut self) {
        self.counter += self.cadence;
    }
}

/// Action due every `cadence` steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCadence {
    /// Step count after which the action is due
    pub counter: usize,
    /// Steps between actions
    pub cadence: usize,
}

impl StepCadence {
    /// First due after the first step
    pub fn new(cadence: usize) -> Self {
        Self { counter: 0, cadence }
    }

    /// True if `loop_counter` passed the due step
    pub fn is_due(&self, loop_counter: usize) -> bool {
        self.counter < loop_counter
    }

    /// Move the due step one cadence ahead
    pub fn advance(&mut self) {
        self.counter += self.cadence;
    }
}

/// Simulation time, step size, step count and the due
/// times of periodic actions
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    /// Simulation time
    pub t: f64,
    /// Current step size
    pub dt: f64,
    /// Completed steps
    pub loop_counter: usize,
    /// Diagnostics output
    pub save: TimeCadence,
    /// Checkpoints
    pub dump: TimeCadence,
    /// Kinetic energy samples
    pub ke: StepCadence,
    /// Step size adaption
    pub cfl: StepCadence,
    /// Index of the next checkpoint
    pub dump_index: usize,
}

impl SimulationClock {
    /// Clock at `t = 0`
    pub fn new(params: &Parameters) -> Self {
        Self {
            t: 0.,
            dt: params.initial_dt,
            loop_counter: 0,
            save: TimeCadence::new(params.save_cadence),
            dump: TimeCadence::new(params.dump_cadence),
            ke: StepCadence::new(params.ke_cadence),
            cfl: StepCadence::new(params.cfl_cadence),
            dump_index: 0,
        }
    }

    /// Record a completed step of size `dt`
    pub fn tick(&mut self, dt: f64) {
        self.t += dt;
        self.loop_counter += 1;
    }

    /// True while `t` is below `final_time`
    pub fn running(&self, final_time: f64) -> bool {
        self.t < final_time
    }

    /// Write the clock to hdf5
    ///
    /// # Errors
    /// File cannot be written.
    pub fn save<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        let f = filename.as_ref();
        write_scalar_to_hdf5(f, "t", self.t)?;
        write_scalar_to_hdf5(f, "dt", self.dt)?;
        write_scalar_to_hdf5(f, "loop_counter", self.loop_counter as u64)?;
        write_scalar_to_hdf5(f, "save_counter", self.save.counter)?;
        write_scalar_to_hdf5(f, "dump_counter", self.dump.counter)?;
        write_scalar_to_hdf5(f, "ke_counter", self.ke.counter as u64)?;
        write_scalar_to_hdf5(f, "cfl_counter", self.cfl.counter as u64)?;
        write_scalar_to_hdf5(f, "dump_index", self.dump_index as u64)?;
        Ok(())
    }

    /// Restore times and counters written by [`SimulationClock::save`].
    /// Cadences are taken from the current configuration.
    ///
    /// # Errors
    /// File or one of the values does not exist.
    pub fn load<P: AsRef<Path>>(&mut self, filename: P) -> Result<()> {
        let f = filename.as_ref();
        let int = |name: &str| read_scalar_from_hdf5::<u64, _>(f, name).map(|x| x as usize);
        self.t = read_scalar_from_hdf5(f, "t")?;
        self.dt = read_scalar_from_hdf5(f, "dt")?;
        self.loop_counter = int("loop_counter")?;
        self.save.counter = read_scalar_from_hdf5(f, "save_counter")?;
        self.dump.counter = read_scalar_from_hdf5(f, "dump_counter")?;
        self.ke.counter = int("ke_counter")?;
        self.cfl.counter = int("cfl_counter")?;
        self.dump_index = int("dump_index")?;
        Ok(())
    }
}
