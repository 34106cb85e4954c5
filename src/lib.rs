#![warn(missing_docs)]
//! # rustrbc: double-diffusive convection with Fourier pseudo-spectral methods
//!
//! Solves the two dimensional vorticity and temperature equations of
//! buoyancy driven convection in a doubly periodic box. Nonlinear terms
//! are formed in physical space and dealiased with the 2/3 rule, time
//! stepping uses multistep Adams-Bashforth schemes with an explicit or
//! semi-implicit treatment of diffusion and a CFL adaptive step size.
//!
//! Runs can be checkpointed and resumed, see [`checkpoint`].
//!
//! # Example
//! ```ignore
//! use rustrbc::{integrate, Convection2D, Parameters};
//! use rustrbc::params::{param_map, ParamValue};
//!
//! let map = param_map(vec![
//!     ("nx", ParamValue::from(128)),
//!     ("nz", ParamValue::from(128)),
//!     ("lx", ParamValue::from(335.0)),
//!     ("lz", ParamValue::from(536.0)),
//!     ("final_time", ParamValue::from(0.1)),
//!     ("integrator", ParamValue::from("semi_implicit")),
//! ]);
//! let params = Parameters::from_map(&map)?;
//! let mut convection = Convection2D::new(&params)?;
//! integrate(&mut convection, params.final_time)?;
//! ```
pub mod checkpoint;
pub mod error;
pub mod field;
pub mod grid;
pub mod hdf5;
pub mod integrate;
pub mod navier;
pub mod params;
pub mod solver;
pub mod timer;
pub mod tracker;
pub mod transform;
pub use error::{Error, Result};
pub use field::{Field, FieldData, Representation, SpectralOperators};
pub use integrate::{integrate, DerivativeHistory, Integrate, Integrator, SimulationClock};
pub use navier::Convection2D;
pub use params::{ParamValue, Parameters};
pub use solver::LaplacianSolver;
