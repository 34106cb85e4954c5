//! Poisson Solver
//! Solve equations of the form:
//! ..math:
//!  D2 vhat = f
//!
//! In a doubly periodic Fourier space the Laplacian is diagonal,
//! with entries
//! ..math:
//!  lap = -((n*kn)^2 + (m*km)^2)
//!
//! so the solve is a division per mode. The zero mode (0,0) has
//! lap = 0 and is singular; its output equals its input.
use crate::error::{check_shape, Result};
use crate::params::Parameters;
use ndarray::{Array2, Zip};
use num_complex::Complex;

/// Container for Poisson Solver
#[derive(Debug, Clone)]
pub struct LaplacianSolver {
    lap: Array2<f64>,
}

impl LaplacianSolver {
    /// Construct from mode-number matrices
    ///
    /// # Panics
    /// Panics when `n` and `m` differ in shape.
    pub fn new(params: &Parameters, n: &Array2<i64>, m: &Array2<i64>) -> Self {
        assert!(
            n.shape() == m.shape(),
            "Mode-number matrices differ in shape: {:?} vs {:?}",
            n.shape(),
            m.shape()
        );
        let mut lap = Array2::<f64>::zeros(n.raw_dim());
        Zip::from(&mut lap).and(n).and(m).for_each(|l, &n, &m| {
            let kx = n as f64 * params.kn;
            let kz = m as f64 * params.km;
            *l = -(kx * kx + kz * kz);
        });
        Self { lap }
    }

    /// Diagonal of the Laplacian, `0.0` at the zero mode
    pub fn laplacian(&self) -> &Array2<f64> {
        &self.lap
    }

    /// Solve `lap * output = input` mode by mode.
    ///
    /// The zero mode is copied from `input`. The operator is not
    /// modified, `output` is fully overwritten.
    ///
    /// # Errors
    /// Shapes of `input`, `output` and the operator differ.
    pub fn solve(&self, input: &Array2<Complex<f64>>, output: &mut Array2<Complex<f64>>) -> Result<()> {
        check_shape(self.lap.shape(), input.shape())?;
        check_shape(self.lap.shape(), output.shape())?;
        // lap vanishes only at wavenumber (0, 0)
        Zip::from(output)
            .and(input)
            .and(&self.lap)
            .for_each(|o, &x, &l| {
                *o = if l == 0. { x } else { x / l };
            });
        Ok(())
    }
}
