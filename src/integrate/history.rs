//! Ring buffer of past right-hand side evaluations of one field
use crate::error::{check_shape, Error, Result};
use ndarray::{s, Array2, Array3, ArrayView2, ArrayViewMut2};
use num_complex::Complex;

/// Fixed capacity buffer of right-hand sides for a multistep scheme.
///
/// `set` writes the slot of the current step. The rotation index is
/// only advanced by [`crate::integrate::Integrator::commit`], once a
/// full step of all co-evolved fields is completed.
#[derive(Debug, Clone)]
pub struct DerivativeHistory {
    data: Array3<Complex<f64>>,
    curr_idx: usize,
}

impl DerivativeHistory {
    /// Buffer of `capacity` evaluations of shape `(nx, nz)`
    ///
    /// # Panics
    /// `capacity` is zero.
    pub fn new(capacity: usize, nx: usize, nz: usize) -> Self {
        assert!(capacity > 0, "History must hold at least one evaluation");
        Self {
            data: Array3::zeros((capacity, nx, nz)),
            curr_idx: 0,
        }
    }

    /// Number of stored evaluations
    pub fn capacity(&self) -> usize {
        self.data.shape()[0]
    }

    /// Write the evaluation of the current step
    ///
    /// # Errors
    /// Shape of `value` does not match.
    pub fn set(&mut self, value: &Array2<Complex<f64>>) -> Result<()> {
        check_shape(&self.data.shape()[1..], value.shape())?;
        let idx = self.curr_idx;
        self.data.slice_mut(s![idx, .., ..]).assign(value);
        Ok(())
    }

    /// Evaluation `lag` steps back, `get(0)` is the current one
    ///
    /// # Errors
    /// `lag` is not smaller than the capacity.
    pub fn get(&self, lag: usize) -> Result<ArrayView2<Complex<f64>>> {
        let cap = self.capacity();
        if lag >= cap {
            return Err(Error::HistoryIndex {
                idx: lag,
                capacity: cap,
            });
        }
        let idx = (self.curr_idx + cap - lag) % cap;
        Ok(self.data.slice(s![idx, .., ..]))
    }

    pub(crate) fn current_mut(&mut self) -> ArrayViewMut2<Complex<f64>> {
        let idx = self.curr_idx;
        self.data.slice_mut(s![idx, .., ..])
    }

    /// Whole buffer, slot-ordered
    pub fn get_all(&self) -> &Array3<Complex<f64>> {
        &self.data
    }

    /// Restore the whole buffer
    ///
    /// # Errors
    /// Shape of `data` does not match.
    pub fn load(&mut self, data: &Array3<Complex<f64>>) -> Result<()> {
        check_shape(self.data.shape(), data.shape())?;
        self.data.assign(data);
        Ok(())
    }

    /// Rotation index
    pub fn get_curr_idx(&self) -> usize {
        self.curr_idx
    }

    /// Restore the rotation index
    ///
    /// # Errors
    /// `idx` is outside the buffer.
    pub fn set_curr_idx(&mut self, idx: usize) -> Result<()> {
        if idx >= self.capacity() {
            return Err(Error::HistoryIndex {
                idx,
                capacity: self.capacity(),
            });
        }
        self.curr_idx = idx;
        Ok(())
    }

    pub(crate) fn advance(&mut self) {
        self.curr_idx = (self.curr_idx + 1) % self.capacity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f64) -> Array2<Complex<f64>> {
        Array2::from_elem((3, 2), Complex::new(value, -value))
    }

    #[test]
    fn test_set_does_not_rotate() {
        let mut history = DerivativeHistory::new(2, 3, 2);
        history.set(&constant(1.)).unwrap();
        history.set(&constant(2.)).unwrap();
        assert_eq!(history.get_curr_idx(), 0);
        assert_eq!(history.get(0).unwrap(), constant(2.));
    }

    #[test]
    fn test_rotation() {
        let mut history = DerivativeHistory::new(3, 3, 2);
        for step in 0..4 {
            history.set(&constant(step as f64)).unwrap();
            history.advance();
        }
        assert_eq!(history.get_curr_idx(), 1);
        history.set(&constant(4.)).unwrap();
        assert_eq!(history.get(0).unwrap(), constant(4.));
        assert_eq!(history.get(1).unwrap(), constant(3.));
        assert_eq!(history.get(2).unwrap(), constant(2.));
        assert!(matches!(
            history.get(3),
            Err(Error::HistoryIndex {
                idx: 3,
                capacity: 3
            })
        ));
    }

    #[test]
    fn test_load_and_index() {
        let mut history = DerivativeHistory::new(2, 3, 2);
        history.set(&constant(5.)).unwrap();
        let mut other = DerivativeHistory::new(2, 3, 2);
        other.load(history.get_all()).unwrap();
        other.set_curr_idx(history.get_curr_idx()).unwrap();
        assert_eq!(other.get(0).unwrap(), constant(5.));
        assert!(other.set_curr_idx(2).is_err());
        assert!(other.set(&Array2::zeros((2, 2))).is_err());
    }
}
