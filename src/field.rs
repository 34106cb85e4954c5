//! # Field of a doubly periodic domain
//!
//! A [`Field`] holds the same quantity in physical space (`v`) and in
//! spectral space (`vhat`). Which of both is current is tracked with a
//! [`Representation`] tag. Synchronisation only happens on explicit
//! calls of [`Field::to_physical`] or [`Field::to_spectral`], reading a
//! representation never transforms implicitly.
//!
//! Fields carrying [`SpectralOperators`] can be differentiated, form
//! nonlinear terms and solve the Poisson equation.
pub mod operators;
pub use operators::SpectralOperators;

use crate::error::{check_shape, Error, Result};
use crate::transform::SpectralTransform;
use ndarray::{Array2, Zip};
use num_complex::Complex;
use std::rc::Rc;

/// Which representation holds the current data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Spectral coefficients were modified, physical data is stale
    Spectral,
    /// Physical data was modified, spectral coefficients are stale
    Physical,
    /// Both representations agree
    Synchronized,
}

/// Raw data to load into a field
#[derive(Debug, Clone, Copy)]
pub enum FieldData<'a> {
    /// Values on the physical grid
    Physical(&'a Array2<f64>),
    /// Spectral coefficients
    Spectral(&'a Array2<Complex<f64>>),
}

/// Scalar quantity in physical and spectral space
pub struct Field {
    name: String,
    /// Field in physical space
    v: Array2<f64>,
    /// Field in spectral space
    vhat: Array2<Complex<f64>>,
    current: Representation,
    transform: SpectralTransform,
    ops: Option<Rc<SpectralOperators>>,
}

impl Field {
    /// Field without differentiation capability
    pub fn new(name: &str, nx: usize, nz: usize) -> Self {
        Self {
            name: name.to_owned(),
            v: Array2::zeros((nx, nz)),
            vhat: Array2::zeros((nx, nz)),
            current: Representation::Synchronized,
            transform: SpectralTransform::new(nx, nz),
            ops: None,
        }
    }

    /// Field with derivatives, nonlinear terms and Poisson solver
    pub fn with_operators(name: &str, ops: &Rc<SpectralOperators>) -> Self {
        let shape = ops.shape();
        let mut field = Self::new(name, shape[0], shape[1]);
        field.ops = Some(Rc::clone(ops));
        field
    }

    /// Name used in dumps and messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape of physical and spectral arrays
    pub fn shape(&self) -> &[usize] {
        self.vhat.shape()
    }

    /// Currently valid representation
    pub fn representation(&self) -> Representation {
        self.current
    }

    /// Ingest raw data. Physical data is transformed, such that
    /// the spectral representation is always current afterwards.
    ///
    /// # Errors
    /// Shape of `data` does not match the field.
    pub fn load(&mut self, data: FieldData) -> Result<()> {
        match data {
            FieldData::Physical(v) => {
                check_shape(self.v.shape(), v.shape())?;
                self.v.assign(v);
                self.transform.forward(&self.v, &mut self.vhat);
                self.current = Representation::Synchronized;
            }
            FieldData::Spectral(vhat) => {
                check_shape(self.vhat.shape(), vhat.shape())?;
                self.vhat.assign(vhat);
                self.current = Representation::Spectral;
            }
        }
        Ok(())
    }

    /// Overwrite all spectral coefficients
    ///
    /// # Errors
    /// Shape of `vhat` does not match the field.
    pub fn assign(&mut self, vhat: &Array2<Complex<f64>>) -> Result<()> {
        self.load(FieldData::Spectral(vhat))
    }

    /// Spectral coefficients
    pub fn gets(&self) -> &Array2<Complex<f64>> {
        &self.vhat
    }

    /// Mutable spectral coefficients, marks physical data as stale
    pub fn gets_mut(&mut self) -> &mut Array2<Complex<f64>> {
        self.current = Representation::Spectral;
        &mut self.vhat
    }

    /// Physical data, as of the last transform or physical load
    pub fn getp(&self) -> &Array2<f64> {
        &self.v
    }

    /// Mutable physical data, marks spectral coefficients as stale
    pub fn getp_mut(&mut self) -> &mut Array2<f64> {
        self.current = Representation::Physical;
        &mut self.v
    }

    /// Physical and spectral data
    pub fn get_all(&self) -> (&Array2<f64>, &Array2<Complex<f64>>) {
        (&self.v, &self.vhat)
    }

    /// Recompute physical data from spectral coefficients
    pub fn to_physical(&mut self) {
        self.transform.backward(&self.vhat, &mut self.v);
        self.current = Representation::Synchronized;
    }

    /// Recompute spectral coefficients from physical data
    pub fn to_spectral(&mut self) {
        self.transform.forward(&self.v, &mut self.vhat);
        self.current = Representation::Synchronized;
    }

    fn ops(&self) -> Result<&SpectralOperators> {
        self.ops
            .as_deref()
            .ok_or_else(|| Error::NoOperators(self.name.clone()))
    }

    /// Spectral derivative in x
    ///
    /// # Errors
    /// Field has no spectral operators.
    pub fn sddx(&self) -> Result<Array2<Complex<f64>>> {
        Ok(self.ops()?.ddx(&self.vhat))
    }

    /// Spectral derivative in z
    ///
    /// # Errors
    /// Field has no spectral operators.
    pub fn sddz(&self) -> Result<Array2<Complex<f64>>> {
        Ok(self.ops()?.ddz(&self.vhat))
    }

    /// Advection term `ux * df/dx + uz * df/dz` of this field,
    /// evaluated in physical space, returned dealiased in spectral space.
    ///
    /// # Errors
    /// Field has no spectral operators or velocities have the wrong shape.
    pub fn vec_dot_nabla(
        &mut self,
        ux: &Array2<f64>,
        uz: &Array2<f64>,
    ) -> Result<Array2<Complex<f64>>> {
        check_shape(self.v.shape(), ux.shape())?;
        check_shape(self.v.shape(), uz.shape())?;
        let ops = Rc::clone(self.ops.as_ref().ok_or_else(|| Error::NoOperators(self.name.clone()))?);

        let mut dfdx = Array2::<f64>::zeros(self.v.raw_dim());
        let mut dfdz = Array2::<f64>::zeros(self.v.raw_dim());
        self.transform.backward(&ops.ddx(&self.vhat), &mut dfdx);
        self.transform.backward(&ops.ddz(&self.vhat), &mut dfdz);

        let mut conv = Array2::<f64>::zeros(self.v.raw_dim());
        Zip::from(&mut conv)
            .and(ux)
            .and(&dfdx)
            .and(uz)
            .and(&dfdz)
            .par_for_each(|c, &u, &fx, &w, &fz| *c = u * fx + w * fz);

        let mut conv_hat = Array2::zeros(self.vhat.raw_dim());
        self.transform.forward(&conv, &mut conv_hat);
        ops.dealias(&mut conv_hat);
        Ok(conv_hat)
    }

    /// Set spectral coefficients to the solution of `lap * vhat = rhs`
    ///
    /// # Errors
    /// Field has no spectral operators or `rhs` has the wrong shape.
    pub fn set_as_laplacian_soln(&mut self, rhs: &Array2<Complex<f64>>) -> Result<()> {
        let ops = self
            .ops
            .as_ref()
            .ok_or_else(|| Error::NoOperators(self.name.clone()))?;
        ops.laplacian_solver().solve(rhs, &mut self.vhat)?;
        self.current = Representation::Spectral;
        Ok(())
    }
}
