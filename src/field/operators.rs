//! Spectral operators shared by all fields of a simulation:
//! derivatives, dealiasing and the Laplacian solver
use crate::error::{check_shape, Result};
use crate::grid::mode_number_matrices;
use crate::params::Parameters;
use crate::solver::LaplacianSolver;
use ndarray::{Array2, Zip};
use num_complex::Complex;
use num_traits::Zero;

/// Per-mode operators of a doubly periodic Fourier space
#[derive(Debug, Clone)]
pub struct SpectralOperators {
    /// i * n * kn
    ikx: Array2<Complex<f64>>,
    /// i * m * km
    ikz: Array2<Complex<f64>>,
    /// true for modes that survive the 2/3 rule
    keep: Array2<bool>,
    solver: LaplacianSolver,
}

impl SpectralOperators {
    /// Build operators from externally constructed mode-number matrices
    ///
    /// # Errors
    /// `n` or `m` do not have shape `(nx, nz)`.
    pub fn new(params: &Parameters, n: &Array2<i64>, m: &Array2<i64>) -> Result<Self> {
        let shape = [params.nx, params.nz];
        check_shape(&shape, n.shape())?;
        check_shape(&shape, m.shape())?;
        Ok(Self::build(params, n, m))
    }

    /// Build operators with the mode numbers of the transform ordering
    pub fn from_params(params: &Parameters) -> Self {
        let (n, m) = mode_number_matrices(params.nx, params.nz);
        Self::build(params, &n, &m)
    }

    fn build(params: &Parameters, n: &Array2<i64>, m: &Array2<i64>) -> Self {
        // the Nyquist mode of an even grid has no sign, its derivative
        // is set to zero to keep real fields real
        let nyquist_x = nyquist(params.nx);
        let nyquist_z = nyquist(params.nz);
        let ikx = n.mapv(|n| {
            if Some(n) == nyquist_x {
                Complex::zero()
            } else {
                Complex::new(0., n as f64 * params.kn)
            }
        });
        let ikz = m.mapv(|m| {
            if Some(m) == nyquist_z {
                Complex::zero()
            } else {
                Complex::new(0., m as f64 * params.km)
            }
        });
        let (nn, nm) = (params.nn as i64, params.nm as i64);
        let mut keep = Array2::from_elem(n.raw_dim(), false);
        Zip::from(&mut keep)
            .and(n)
            .and(m)
            .for_each(|k, &n, &m| *k = n.abs() <= nn && m.abs() <= nm);
        let solver = LaplacianSolver::new(params, n, m);
        Self {
            ikx,
            ikz,
            keep,
            solver,
        }
    }

    /// Shape of the spectral arrays the operators act on
    pub fn shape(&self) -> &[usize] {
        self.ikx.shape()
    }

    /// Derivative in x of spectral coefficients
    pub fn ddx(&self, vhat: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
        vhat * &self.ikx
    }

    /// Derivative in z of spectral coefficients
    pub fn ddz(&self, vhat: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
        vhat * &self.ikz
    }

    /// Zero all coefficients above the truncation `nn, nm`
    pub fn dealias(&self, vhat: &mut Array2<Complex<f64>>) {
        Zip::from(vhat).and(&self.keep).for_each(|v, &keep| {
            if !keep {
                *v = Complex::zero();
            }
        });
    }

    /// Poisson solver of this space
    pub fn laplacian_solver(&self) -> &LaplacianSolver {
        &self.solver
    }

    /// Diffusion operator `c * lap` per mode
    pub fn viscous_op(&self, c: f64) -> Array2<f64> {
        self.solver.laplacian() * c
    }
}

/// Wavenumber index of the Nyquist mode, `None` for odd `n`
fn nyquist(n: usize) -> Option<i64> {
    if n % 2 == 0 {
        Some(n as i64 / 2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{param_map, ParamValue};
    use std::f64::consts::PI;

    fn operators(nx: usize, nz: usize) -> SpectralOperators {
        let map = param_map(vec![
            ("nx", ParamValue::from(nx)),
            ("nz", ParamValue::from(nz)),
            ("lx", ParamValue::from(2. * PI)),
            ("lz", ParamValue::from(2. * PI)),
            ("final_time", ParamValue::from(1.0)),
        ]);
        SpectralOperators::from_params(&Parameters::from_map(&map).unwrap())
    }

    #[test]
    fn test_nyquist_derivative_vanishes() {
        let ops = operators(8, 6);
        let vhat = Array2::from_elem((8, 6), Complex::new(1., 0.5));
        let dx = ops.ddx(&vhat);
        let dz = ops.ddz(&vhat);
        for j in 0..6 {
            assert_eq!(dx[[4, j]], Complex::zero());
        }
        for i in 0..8 {
            assert_eq!(dz[[i, 3]], Complex::zero());
        }
        // neighbouring modes are untouched
        assert_eq!(dx[[3, 0]], Complex::new(0., 3.) * vhat[[3, 0]]);
        assert_eq!(dx[[5, 0]], Complex::new(0., -3.) * vhat[[5, 0]]);
        assert_eq!(dz[[0, 2]], Complex::new(0., 2.) * vhat[[0, 2]]);
    }

    #[test]
    fn test_odd_grid_keeps_all_modes() {
        let ops = operators(7, 5);
        let vhat = Array2::from_elem((7, 5), Complex::new(1., 0.));
        let dx = ops.ddx(&vhat);
        assert_eq!(dx[[3, 0]], Complex::new(0., 3.));
        assert_eq!(dx[[4, 0]], Complex::new(0., -3.));
        assert_eq!(ops.ddz(&vhat)[[0, 2]], Complex::new(0., 2.));
    }

    #[test]
    fn test_new_checks_shapes() {
        let map = param_map(vec![
            ("nx", ParamValue::from(4)),
            ("nz", ParamValue::from(4)),
            ("lx", ParamValue::from(1.0)),
            ("lz", ParamValue::from(1.0)),
            ("final_time", ParamValue::from(1.0)),
        ]);
        let params = Parameters::from_map(&map).unwrap();
        let n = Array2::<i64>::zeros((4, 3));
        let m = Array2::<i64>::zeros((4, 4));
        assert!(SpectralOperators::new(&params, &n, &m).is_err());
    }
}
