//! Diagnostics and initial conditions of the convection problem
use crate::error::Result;
use crate::field::{Field, FieldData};
use ndarray::{Array2, Zip};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

/// Amplitude of the initial temperature disturbance
pub const INITIAL_AMPLITUDE: f64 = 1e-2;

/// Returns kinetic energy per grid point
/// $$
/// E = \frac{1}{2 n_x n_z} \sum (u_x^2 + u_z^2)
/// $$
pub fn kinetic_energy(ux: &Array2<f64>, uz: &Array2<f64>) -> f64 {
    let mut sum = 0.;
    Zip::from(ux)
        .and(uz)
        .for_each(|&u, &w| sum += u * u + w * w);
    0.5 * sum / ux.len() as f64
}

/// Returns Nusselt number from the convective heat flux
/// $$
/// Nu = 1 - \langle T u_z \rangle
/// $$
pub fn nusselt_number(tmp: &Array2<f64>, uz: &Array2<f64>) -> f64 {
    let mut flux = 0.;
    Zip::from(tmp).and(uz).for_each(|&t, &w| flux += t * w);
    1. - flux / tmp.len() as f64
}

/// Uniformly distributed values in `[-amp, amp)`, reproducible for a given seed
pub fn random_disturbance(nx: usize, nz: usize, amp: f64, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::random_using((nx, nz), Uniform::new(-amp, amp), &mut rng)
}

/// Zero vorticity and a small random temperature disturbance
///
/// # Errors
/// Field shapes differ.
pub fn load_initial_conditions(w: &mut Field, tmp: &mut Field) -> Result<()> {
    let shape = tmp.shape().to_vec();
    let (nx, nz) = (shape[0], shape[1]);
    w.load(FieldData::Physical(&Array2::zeros((nx, nz))))?;
    tmp.load(FieldData::Physical(&random_disturbance(
        nx,
        nz,
        INITIAL_AMPLITUDE,
        0,
    )))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(result: f64, expected: f64) {
        let dif = 1e-12;
        if (result - expected).abs() > dif {
            panic!("Large difference of values, got {} expected {}.", result, expected)
        }
    }

    #[test]
    fn test_kinetic_energy() {
        let ux = Array2::from_elem((4, 2), 2.);
        let uz = Array2::from_shape_fn((4, 2), |(i, _)| if i == 0 { 4. } else { 0. });
        // 0.5 * (8 * 4 + 2 * 16) / 8
        approx_eq(kinetic_energy(&ux, &uz), 4.);
    }

    #[test]
    fn test_nusselt_number() {
        let tmp = Array2::from_elem((3, 3), 0.5);
        let uz = Array2::from_elem((3, 3), 0.2);
        approx_eq(nusselt_number(&tmp, &uz), 0.9);
        approx_eq(nusselt_number(&tmp, &Array2::zeros((3, 3))), 1.);
    }

    #[test]
    fn test_random_disturbance() {
        let a = random_disturbance(8, 6, 1e-2, 0);
        let b = random_disturbance(8, 6, 1e-2, 0);
        assert_eq!(a, b);
        assert!(a.iter().all(|x| *x >= -1e-2 && *x < 1e-2));
        assert!(a.iter().any(|x| *x != 0.));
        assert_ne!(a, random_disturbance(8, 6, 1e-2, 1));
    }

    #[test]
    fn test_initial_conditions() {
        let mut w = Field::new("w", 8, 8);
        let mut tmp = Field::new("tmp", 8, 8);
        load_initial_conditions(&mut w, &mut tmp).unwrap();
        assert!(w.getp().iter().all(|x| *x == 0.));
        assert!(tmp.getp().iter().any(|x| *x != 0.));
        assert!(tmp.getp().iter().all(|x| x.abs() <= INITIAL_AMPLITUDE));
    }
}
