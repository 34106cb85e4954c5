//! # Multistep time integration
//!
//! The explicit part of the right-hand side is combined with
//! Adams-Bashforth coefficients. Right after a cold start, fewer past
//! evaluations exist than the order requires, so the order is raised
//! step by step, starting with Euler.
//!
//! The linear (diffusive) operator is diagonal in spectral space and
//! treated either
//! - explicitly: it is added to the stored right-hand side, or
//! - semi-implicitly:
//! $$
//! (1 - \alpha \delta t L) u\\_new = u + \delta t N + (1 - \alpha) \delta t L u
//! $$
use super::history::DerivativeHistory;
use crate::error::{check_shape, Error, Result};
use crate::field::Field;
use crate::params::{Parameters, SchemeKind};
use enum_dispatch::enum_dispatch;
use ndarray::{Array2, Zip};
use num_complex::Complex;

/// Adams-Bashforth coefficients of order 1 to 4, newest evaluation first
const ADAMS_BASHFORTH: [&[f64]; 4] = [
    &[1.],
    &[3. / 2., -1. / 2.],
    &[23. / 12., -16. / 12., 5. / 12.],
    &[55. / 24., -59. / 24., 37. / 24., -9. / 24.],
];

/// Update rule of a single spectral coefficient
#[enum_dispatch]
pub trait TimeScheme {
    /// True if the linear term is part of the stored right-hand side
    fn linear_in_history(&self) -> bool;

    /// New coefficient from the old one, the multistep explicit
    /// part `rhs` and the linear operator `lin` of this mode
    fn advance(&self, old: Complex<f64>, rhs: Complex<f64>, lin: f64, dt: f64) -> Complex<f64>;
}

/// Linear term treated like the nonlinear one
#[derive(Debug, Clone, Copy)]
pub struct Explicit;

/// Linear term treated implicitly with weight `alpha`
#[derive(Debug, Clone, Copy)]
pub struct SemiImplicit {
    alpha: f64,
}

impl TimeScheme for Explicit {
    fn linear_in_history(&self) -> bool {
        true
    }

    fn advance(&self, old: Complex<f64>, rhs: Complex<f64>, _lin: f64, dt: f64) -> Complex<f64> {
        old + rhs * dt
    }
}

impl TimeScheme for SemiImplicit {
    fn linear_in_history(&self) -> bool {
        false
    }

    fn advance(&self, old: Complex<f64>, rhs: Complex<f64>, lin: f64, dt: f64) -> Complex<f64> {
        let a = self.alpha;
        (old + rhs * dt + old * ((1. - a) * dt * lin)) / (1. - a * dt * lin)
    }
}

/// Supported schemes
#[enum_dispatch(TimeScheme)]
#[derive(Debug, Clone, Copy)]
pub enum Scheme {
    /// Fully explicit
    Explicit,
    /// Implicit-explicit
    SemiImplicit,
}

impl Scheme {
    /// Scheme of the given kind
    pub fn new(kind: SchemeKind, alpha: f64) -> Self {
        match kind {
            SchemeKind::Explicit => Scheme::Explicit(Explicit),
            SchemeKind::SemiImplicit => Scheme::SemiImplicit(SemiImplicit { alpha }),
        }
    }
}

/// Advances fields in time and controls the step size
#[derive(Debug, Clone)]
pub struct Integrator {
    scheme: Scheme,
    order: usize,
    dt: f64,
    cfl_cutoff: f64,
    dx: f64,
    dz: f64,
    max_dt: Option<f64>,
    /// Completed steps since cold start
    steps: usize,
}

impl Integrator {
    /// Integrator configured by `params`, starting with `initial_dt`
    pub fn new(params: &Parameters) -> Self {
        Self {
            scheme: Scheme::new(params.integrator, params.alpha),
            order: params.integrator_order.max(1).min(ADAMS_BASHFORTH.len()),
            dt: params.initial_dt,
            cfl_cutoff: params.cfl_cutoff,
            dx: params.dx,
            dz: params.dz,
            max_dt: params.max_dt,
            steps: 0,
        }
    }

    /// Order of the multistep scheme
    pub fn order(&self) -> usize {
        self.order
    }

    /// Current step size
    pub fn get_dt(&self) -> f64 {
        self.dt
    }

    /// Order used by the next step, reduced after a cold start
    pub fn effective_order(&self) -> usize {
        (self.steps + 1).min(self.order)
    }

    /// Empty history with the capacity this scheme requires
    pub fn new_history(&self, nx: usize, nz: usize) -> DerivativeHistory {
        DerivativeHistory::new(self.order, nx, nz)
    }

    /// Restore the number of completed steps, e.g. from the loop counter
    /// of a checkpoint. Steps beyond the scheme order carry no extra
    /// information and are clamped.
    pub fn set_completed_steps(&mut self, steps: usize) {
        self.steps = steps.min(self.order);
    }

    /// Advance `field` by one step of size `dt`.
    ///
    /// The nonlinear right-hand side of the current step must already
    /// be stored in `history`. `linear_op` holds the linear operator
    /// per mode and is not modified. The history index is not advanced,
    /// see [`Integrator::commit`].
    ///
    /// # Errors
    /// Shapes of field, history and operator differ, or the history
    /// holds fewer evaluations than the scheme order.
    pub fn integrate(
        &self,
        field: &mut Field,
        history: &mut DerivativeHistory,
        linear_op: &Array2<f64>,
    ) -> Result<()> {
        check_shape(field.shape(), linear_op.shape())?;
        check_shape(field.shape(), &history.get_all().shape()[1..])?;
        if history.capacity() < self.order {
            return Err(Error::HistoryIndex {
                idx: self.order - 1,
                capacity: history.capacity(),
            });
        }
        let scheme = self.scheme;
        let dt = self.dt;

        if scheme.linear_in_history() {
            Zip::from(history.current_mut())
                .and(field.gets())
                .and(linear_op)
                .for_each(|h, &u, &l| *h += u * l);
        }

        let mut rhs = Array2::<Complex<f64>>::zeros(linear_op.raw_dim());
        for (lag, &c) in ADAMS_BASHFORTH[self.effective_order() - 1].iter().enumerate() {
            Zip::from(&mut rhs)
                .and(&history.get(lag)?)
                .for_each(|r, &h| *r += h * c);
        }

        Zip::from(field.gets_mut())
            .and(&rhs)
            .and(linear_op)
            .par_for_each(|v, &r, &l| *v = scheme.advance(*v, r, l, dt));
        Ok(())
    }

    /// Complete a step of all co-evolved fields: advance the shared
    /// history index once.
    ///
    /// # Errors
    /// The histories do not share the same index. Nothing is advanced.
    pub fn commit(&mut self, histories: &mut [&mut DerivativeHistory]) -> Result<()> {
        let indices: Vec<usize> = histories.iter().map(|h| h.get_curr_idx()).collect();
        if indices.windows(2).any(|w| w[0] != w[1]) {
            return Err(Error::HistoryDesync(indices));
        }
        for history in histories.iter_mut() {
            history.advance();
        }
        self.steps += 1;
        Ok(())
    }

    /// Step size of the CFL condition
    /// $$
    /// \delta t = c \min(dx, dz) / \max(|u_x|, |u_z|)
    /// $$
    /// bounded by `max_dt`. Without flow the step size is `max_dt`
    /// or, if no cap exists, unchanged.
    pub fn set_dt(&mut self, ux: &Array2<f64>, uz: &Array2<f64>) -> f64 {
        let vmax = ux
            .iter()
            .chain(uz.iter())
            .fold(0., |m: f64, u| m.max(u.abs()));
        let mut dt = if vmax > 0. {
            self.cfl_cutoff * self.dx.min(self.dz) / vmax
        } else {
            self.max_dt.unwrap_or(self.dt)
        };
        if let Some(cap) = self.max_dt {
            dt = dt.min(cap);
        }
        self.dt = dt;
        dt
    }

    /// Force the step size, e.g. to the value stored in a checkpoint
    pub fn override_dt(&mut self, dt: f64) {
        self.dt = dt;
    }
}
