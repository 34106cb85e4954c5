//! Time integration: multistep integrator, derivative history,
//! simulation clock and the driver loop
pub mod clock;
pub mod history;
pub mod integrator;
pub use clock::{SimulationClock, StepCadence, TimeCadence};
pub use history::DerivativeHistory;
pub use integrator::{Explicit, Integrator, Scheme, SemiImplicit, TimeScheme};

use crate::error::Result;

/// Integrate trait, step forward in time, and write results
pub trait Integrate {
    /// Update solution
    ///
    /// # Errors
    /// The step could not be completed.
    fn update(&mut self) -> Result<()>;
    /// Receive current time
    fn get_time(&self) -> f64;
    /// Get timestep
    fn get_dt(&self) -> f64;
    /// Periodic actions before each step (output, checkpoints, step size)
    ///
    /// # Errors
    /// Output could not be written.
    fn callback(&mut self) -> Result<()>;
    /// True if the solution broke down and integration should stop
    fn exit(&mut self) -> bool;
}

/// Integrate pde, that implements the Integrate trait.
///
/// Each iteration first runs the callback, then advances one step.
///
/// Stop Criteria:
/// 1. Time limit
/// 2. `exit` returns true
///
/// # Errors
/// Propagates errors of `callback` and `update`.
pub fn integrate<T: Integrate>(pde: &mut T, max_time: f64) -> Result<()> {
    while pde.get_time() < max_time {
        pde.callback()?;
        pde.update()?;
        if pde.exit() {
            println!("Solution broke down at t = {:?}, stop.", pde.get_time());
            return Ok(());
        }
    }
    println!("time limit reached: {:?}", pde.get_time());
    Ok(())
}
