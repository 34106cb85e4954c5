//! # Linear algebra solver in spectral space
pub mod poisson;
pub use poisson::LaplacianSolver;
