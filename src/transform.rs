//! Two dimensional Fourier transform between physical and spectral space
//!
//! Both directions are periodic, spectral arrays are complex with the
//! same shape `(nx, nz)` as the physical grid. The backward transform
//! is normalized, such that `backward(forward(v)) == v`.
use ndarray::Array2;
use ndrustfft::{ndfft, ndifft, FftHandler};
use num_complex::Complex;

/// Forward / backward transform of a `(nx, nz)` field
pub struct SpectralTransform {
    handler_x: FftHandler<f64>,
    handler_z: FftHandler<f64>,
    buffer: Array2<Complex<f64>>,
    shape: [usize; 2],
}

impl SpectralTransform {
    /// Plan transforms for a grid of `nx` x `nz` points
    pub fn new(nx: usize, nz: usize) -> Self {
        Self {
            handler_x: FftHandler::new(nx),
            handler_z: FftHandler::new(nz),
            buffer: Array2::zeros((nx, nz)),
            shape: [nx, nz],
        }
    }

    /// Shape of physical and spectral arrays
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Physical -> spectral
    pub fn forward(&mut self, input: &Array2<f64>, output: &mut Array2<Complex<f64>>) {
        let data = input.mapv(|x| Complex::new(x, 0.));
        ndfft(&data, &mut self.buffer, &mut self.handler_z, 1);
        ndfft(&self.buffer, output, &mut self.handler_x, 0);
    }

    /// Spectral -> physical, the imaginary part is discarded
    pub fn backward(&mut self, input: &Array2<Complex<f64>>, output: &mut Array2<f64>) {
        let mut data = Array2::<Complex<f64>>::zeros(input.raw_dim());
        ndifft(input, &mut self.buffer, &mut self.handler_x, 0);
        ndifft(&self.buffer, &mut data, &mut self.handler_z, 1);
        output.zip_mut_with(&data, |o, d| *o = d.re);
    }
}
