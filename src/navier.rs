//! Convection solver and its diagnostics
pub mod convection;
pub mod functions;
pub use convection::Convection2D;
