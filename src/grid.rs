//! Grid coordinates and mode numbers of the doubly periodic domain
//!
//! Spectral arrays use the ordering of the discrete Fourier transform,
//! i.e. for `n` points the index `i` belongs to wavenumber `i` if
//! `i <= n/2`, otherwise to `i - n`.
use crate::params::Parameters;
use ndarray::{Array1, Array2};

/// Wavenumber index of position `i` in a transform of size `n`
pub fn mode_number(i: usize, n: usize) -> i64 {
    if i <= n / 2 {
        i as i64
    } else {
        i as i64 - n as i64
    }
}

/// Returns the mode-number matrices `(n, m)` of shape `(nx, nz)`.
/// `n[[i, j]]` is the horizontal, `m[[i, j]]` the vertical
/// wavenumber index of coefficient `(i, j)`.
pub fn mode_number_matrices(nx: usize, nz: usize) -> (Array2<i64>, Array2<i64>) {
    let n = Array2::from_shape_fn((nx, nz), |(i, _)| mode_number(i, nx));
    let m = Array2::from_shape_fn((nx, nz), |(_, j)| mode_number(j, nz));
    (n, m)
}

/// Equidistant periodic coordinates, endpoint excluded
pub fn coords(n: usize, length: f64) -> Array1<f64> {
    Array1::linspace(0., length, n + 1).slice_move(ndarray::s![..n])
}

/// Physical grid `[x, z]` of the domain
pub fn grid(params: &Parameters) -> [Array1<f64>; 2] {
    [coords(params.nx, params.lx), coords(params.nz, params.lz)]
}
