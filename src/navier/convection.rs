//! # Double-diffusive convection in a doubly periodic box
//!
//! Vorticity-stream function formulation
//! $$
//! \partial_t \omega + u \cdot \nabla \omega = Pr \nabla^2 \omega - Pr \partial_x T
//! $$
//! $$
//! \partial_t T + u \cdot \nabla T = \nabla^2 T
//! $$
//! with $\nabla^2 \psi = -\omega$, $u_x = -\partial_z \psi$ and
//! $u_z = \partial_x \psi$.
//!
//! # Example
//! ```ignore
//! use rustrbc::navier::Convection2D;
//! use rustrbc::params::{param_map, ParamValue, Parameters};
//! use rustrbc::integrate;
//!
//! let map = param_map(vec![
//!     ("nx", ParamValue::from(64)),
//!     ("nz", ParamValue::from(64)),
//!     ("lx", ParamValue::from(335.0)),
//!     ("lz", ParamValue::from(536.0)),
//!     ("final_time", ParamValue::from(1.0)),
//! ]);
//! let params = Parameters::from_map(&map)?;
//! let mut convection = Convection2D::new(&params)?;
//! integrate(&mut convection, params.final_time)?;
//! ```
use super::functions::{kinetic_energy, load_initial_conditions, nusselt_number};
use crate::checkpoint::{dump_name, read_checkpoint, state_name, write_checkpoint};
use crate::error::Result;
use crate::field::{Field, SpectralOperators};
use crate::integrate::{DerivativeHistory, Integrate, Integrator, SimulationClock};
use crate::params::Parameters;
use crate::timer::Timer;
use crate::tracker::ScalarTracker;
use ndarray::{s, Array2, Zip};
use num_complex::Complex;
use num_traits::Zero;
use std::rc::Rc;

/// Solver of the convection problem, implements [`Integrate`]
pub struct Convection2D {
    /// Configuration
    pub params: Parameters,
    /// Vorticity
    pub w: Field,
    /// Temperature
    pub tmp: Field,
    /// Stream function
    pub psi: Field,
    /// Horizontal velocity
    pub ux: Field,
    /// Vertical velocity
    pub uz: Field,
    dw: DerivativeHistory,
    dtmp: DerivativeHistory,
    integrator: Integrator,
    /// Time, step size and due times of periodic actions
    pub clock: SimulationClock,
    /// Linear operator of the vorticity equation
    w_op: Array2<f64>,
    /// Linear operator of the temperature equation
    tmp_op: Array2<f64>,
    ke_tracker: ScalarTracker,
    nusselt_tracker: ScalarTracker,
    timer: Timer,
    /// Estimated wallclock seconds until `final_time`
    wallclock_remaining: f64,
}

impl Convection2D {
    /// Set up fields, operators and integrator. Starts from
    /// checkpoint `load_from` if given, otherwise from a random
    /// temperature disturbance.
    ///
    /// # Errors
    /// Output directory cannot be created or checkpoint cannot be read.
    pub fn new(params: &Parameters) -> Result<Self> {
        std::fs::create_dir_all(&params.output_dir)?;
        let (nx, nz) = (params.nx, params.nz);
        let ops = Rc::new(SpectralOperators::from_params(params));
        let integrator = Integrator::new(params);

        let mut convection = Self {
            params: params.clone(),
            w: Field::with_operators("w", &ops),
            tmp: Field::with_operators("tmp", &ops),
            psi: Field::with_operators("psi", &ops),
            ux: Field::with_operators("ux", &ops),
            uz: Field::with_operators("uz", &ops),
            dw: integrator.new_history(nx, nz),
            dtmp: integrator.new_history(nx, nz),
            integrator,
            clock: SimulationClock::new(params),
            w_op: ops.viscous_op(params.pr),
            tmp_op: ops.viscous_op(1.0),
            ke_tracker: ScalarTracker::new(params.output_dir.join("kinetic_energy.h5")),
            nusselt_tracker: ScalarTracker::new(params.output_dir.join("nusselt.h5")),
            timer: Timer::new(),
            wallclock_remaining: 0.,
        };

        match params.load_from {
            Some(index) => convection.restore(index)?,
            None => load_initial_conditions(&mut convection.w, &mut convection.tmp)?,
        }
        Ok(convection)
    }

    /// Restore from checkpoint `index`. Both histories receive the
    /// stored rotation index, the step size of the checkpoint is kept.
    /// The multistep order resumes where the checkpointed run left it,
    /// so a checkpoint taken before the history filled up still starts
    /// with the lower order formulas.
    ///
    /// # Errors
    /// Checkpoint or clock file cannot be read or does not fit
    /// the configuration. The solver is unchanged in that case.
    pub fn restore(&mut self, index: usize) -> Result<()> {
        let dir = &self.params.output_dir;
        let fname = state_name(dir, index);
        let mut clock = self.clock.clone();
        clock.load(&fname)?;
        read_checkpoint(
            dump_name(dir, index),
            &mut self.w,
            &mut self.dw,
            &mut self.tmp,
            &mut self.dtmp,
        )?;
        println!(" <== {:?}", fname);
        self.clock = clock;
        self.clock.dump_index = index + 1;
        self.integrator
            .set_completed_steps(self.clock.loop_counter);
        self.integrator.override_dt(self.clock.dt);
        self.update_velocity()?;
        Ok(())
    }

    /// Write checkpoint and clock for the current dump index
    ///
    /// # Errors
    /// Files cannot be written or histories are out of sync.
    pub fn dump(&mut self) -> Result<()> {
        let dir = &self.params.output_dir;
        let index = self.clock.dump_index;
        write_checkpoint(dump_name(dir, index), &self.w, &self.dw, &self.tmp, &self.dtmp)?;
        let fname = state_name(dir, index);
        if fname.exists() {
            std::fs::remove_file(&fname)?;
        }
        self.clock.save(&fname)?;
        println!(" ==> {:?}", fname);
        self.clock.dump_index += 1;
        Ok(())
    }

    /// Stream function from vorticity, velocities from stream function
    fn update_velocity(&mut self) -> Result<()> {
        let rhs = self.w.gets().mapv(|x| -x);
        self.psi.set_as_laplacian_soln(&rhs)?;
        self.ux.assign(&self.psi.sddz()?.mapv(|x| -x))?;
        self.ux.to_physical();
        self.uz.assign(&self.psi.sddx()?)?;
        self.uz.to_physical();
        Ok(())
    }

    /// Advance vorticity and temperature by one step
    fn step(&mut self) -> Result<()> {
        self.update_velocity()?;

        // Remove mean z variation
        self.tmp
            .gets_mut()
            .slice_mut(s![.., 0])
            .fill(Complex::zero());

        // Vorticity
        let pr = self.params.pr;
        let mut rhs = self.w.vec_dot_nabla(self.ux.getp(), self.uz.getp())?;
        let buoyancy = self.tmp.sddx()?;
        Zip::from(&mut rhs)
            .and(&buoyancy)
            .for_each(|r, &b| *r = -*r - b * pr);
        self.dw.set(&rhs)?;
        self.integrator
            .integrate(&mut self.w, &mut self.dw, &self.w_op)?;

        // Temperature
        let mut rhs = self.tmp.vec_dot_nabla(self.ux.getp(), self.uz.getp())?;
        rhs.mapv_inplace(|x| -x);
        self.dtmp.set(&rhs)?;
        self.integrator
            .integrate(&mut self.tmp, &mut self.dtmp, &self.tmp_op)?;

        self.integrator.commit(&mut [&mut self.dw, &mut self.dtmp])?;
        self.clock.tick(self.integrator.get_dt());
        Ok(())
    }

    /// Print progress and write diagnostic series
    fn save_diagnostics(&self) -> Result<()> {
        println!(
            "{:.2}% complete t = {:.2} dt = {:.2e} Remaining: {:.2} hr",
            self.clock.t / self.params.final_time * 100.,
            self.clock.t,
            self.clock.dt,
            self.wallclock_remaining / 3600.
        );
        self.ke_tracker.save()?;
        self.nusselt_tracker.save()?;
        Ok(())
    }

    /// Sample kinetic energy and Nusselt number, update the
    /// estimate of the remaining wallclock time
    fn sample_diagnostics(&mut self) {
        let t = self.clock.t;
        self.ke_tracker
            .append(t, kinetic_energy(self.ux.getp(), self.uz.getp()));
        self.tmp.to_physical();
        self.nusselt_tracker
            .append(t, nusselt_number(self.tmp.getp(), self.uz.getp()));

        let per_step = self.timer.split() / self.params.ke_cadence as f64;
        self.wallclock_remaining = per_step * (self.params.final_time - t) / self.clock.dt;
    }

    /// Kinetic energy series
    pub fn ke_tracker(&self) -> &ScalarTracker {
        &self.ke_tracker
    }

    /// Nusselt number series
    pub fn nusselt_tracker(&self) -> &ScalarTracker {
        &self.nusselt_tracker
    }

    /// Vorticity history
    pub fn dw(&self) -> &DerivativeHistory {
        &self.dw
    }

    /// Temperature history
    pub fn dtmp(&self) -> &DerivativeHistory {
        &self.dtmp
    }
}

impl Integrate for Convection2D {
    fn update(&mut self) -> Result<()> {
        self.step()
    }

    fn get_time(&self) -> f64 {
        self.clock.t
    }

    fn get_dt(&self) -> f64 {
        self.clock.dt
    }

    /// Save, dump, diagnostics and step size adaption, in this order
    fn callback(&mut self) -> Result<()> {
        let t = self.clock.t;
        let loop_counter = self.clock.loop_counter;

        if self.clock.save.is_due(t) {
            self.clock.save.advance();
            self.save_diagnostics()?;
        }

        if self.clock.dump.is_due(t) {
            self.clock.dump.advance();
            self.dump()?;
        }

        if self.clock.ke.is_due(loop_counter) {
            self.clock.ke.advance();
            self.sample_diagnostics();
        }

        if self.clock.cfl.is_due(loop_counter) {
            self.clock.cfl.advance();
            self.clock.dt = self.integrator.set_dt(self.ux.getp(), self.uz.getp());
        }
        Ok(())
    }

    fn exit(&mut self) -> bool {
        // Break if vorticity is nan
        self.w
            .gets()
            .iter()
            .any(|v| !v.re.is_finite() || !v.im.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldData;
    use crate::integrate::integrate;
    use crate::params::{param_map, ParamMap, ParamValue};
    use std::f64::consts::PI;
    use std::path::PathBuf;

    fn output_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rustrbc_convection_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn base_map(dir: &PathBuf, integrator: &str) -> ParamMap {
        param_map(vec![
            ("nx", ParamValue::from(8)),
            ("nz", ParamValue::from(8)),
            ("lx", ParamValue::from(2. * PI)),
            ("lz", ParamValue::from(2. * PI)),
            ("final_time", ParamValue::from(1e-3)),
            ("initial_dt", ParamValue::from(1e-3)),
            ("integrator", ParamValue::from(integrator)),
            ("output_dir", ParamValue::from(dir.to_string_lossy().to_string())),
        ])
    }

    fn single_mode(convection: &mut Convection2D) {
        let mut that = Array2::<Complex<f64>>::zeros((8, 8));
        that[[1, 1]] = Complex::new(1., 0.);
        convection
            .w
            .load(FieldData::Spectral(&Array2::zeros((8, 8))))
            .unwrap();
        convection.tmp.load(FieldData::Spectral(&that)).unwrap();
    }

    #[test]
    fn test_one_step_conserves_means() {
        for integrator in ["explicit", "semi_implicit"].iter() {
            let dir = output_dir(integrator);
            let params = Parameters::from_map(&base_map(&dir, integrator)).unwrap();
            let mut convection = Convection2D::new(&params).unwrap();
            single_mode(&mut convection);
            convection.update().unwrap();

            assert_eq!(convection.clock.loop_counter, 1);
            assert!((convection.get_time() - 1e-3).abs() < 1e-15);
            assert_eq!(convection.w.gets()[[0, 0]], Complex::zero());
            assert!(convection
                .tmp
                .gets()
                .slice(s![.., 0])
                .iter()
                .all(|v| *v == Complex::zero()));
            // buoyancy drives vorticity in the forced mode
            assert!(convection.w.gets()[[1, 1]].norm() > 0.);
            assert_eq!(convection.dw().get_curr_idx(), 1);
            assert_eq!(convection.dtmp().get_curr_idx(), 1);
        }
    }

    #[test]
    fn test_run_writes_output() {
        let dir = output_dir("run");
        let mut map = base_map(&dir, "semi_implicit");
        map.insert("final_time".to_string(), ParamValue::from(1e-2));
        map.insert("ke_cadence".to_string(), ParamValue::from(2));
        map.insert("cfl_cadence".to_string(), ParamValue::from(3));
        map.insert("max_dt".to_string(), ParamValue::from(2e-3));
        let params = Parameters::from_map(&map).unwrap();
        let mut convection = Convection2D::new(&params).unwrap();
        integrate(&mut convection, params.final_time).unwrap();

        assert!(convection.get_time() >= params.final_time);
        assert!(!convection.exit());
        assert!(!convection.ke_tracker().is_empty());
        assert_eq!(convection.ke_tracker().len(), convection.nusselt_tracker().len());
        assert!(dump_name(&dir, 0).exists());
        assert!(state_name(&dir, 0).exists());
        assert!(dir.join("kinetic_energy.h5").exists());
        assert!(convection.clock.dump_index >= 1);
    }

    #[test]
    fn test_restart_reproduces_state() {
        let dir = output_dir("restart");
        let mut map = base_map(&dir, "explicit");
        map.insert("final_time".to_string(), ParamValue::from(1.0));
        map.insert("dump_cadence".to_string(), ParamValue::from(1.0));
        let params = Parameters::from_map(&map).unwrap();
        let mut convection = Convection2D::new(&params).unwrap();
        for _ in 0..3 {
            convection.update().unwrap();
        }
        convection.clock.dump_index = 4;
        convection.dump().unwrap();
        assert_eq!(convection.clock.dump_index, 5);

        map.insert("load_from".to_string(), ParamValue::from(4));
        let params = Parameters::from_map(&map).unwrap();
        let restored = Convection2D::new(&params).unwrap();
        assert_eq!(restored.w.gets(), convection.w.gets());
        assert_eq!(restored.tmp.gets(), convection.tmp.gets());
        assert_eq!(restored.dw().get_all(), convection.dw().get_all());
        assert_eq!(restored.dtmp().get_all(), convection.dtmp().get_all());
        assert_eq!(restored.dw().get_curr_idx(), convection.dw().get_curr_idx());
        assert_eq!(restored.dtmp().get_curr_idx(), convection.dw().get_curr_idx());
        assert_eq!(restored.clock.t, convection.clock.t);
        assert_eq!(restored.clock.loop_counter, 3);
        assert_eq!(restored.clock.dump_index, 5);
        assert_eq!(restored.get_dt(), convection.get_dt());
    }

    #[test]
    fn test_restart_from_initial_dump_matches_cold_run() {
        let dir = output_dir("initial_dump");
        let mut map = base_map(&dir, "explicit");
        map.insert("final_time".to_string(), ParamValue::from(1.0));
        map.insert("integrator_order".to_string(), ParamValue::from(3));
        let params = Parameters::from_map(&map).unwrap();
        let mut cold = Convection2D::new(&params).unwrap();
        // writes dump0000 before any step, history still empty
        cold.callback().unwrap();
        assert!(dump_name(&dir, 0).exists());

        map.insert("load_from".to_string(), ParamValue::from(0));
        let params = Parameters::from_map(&map).unwrap();
        let mut restored = Convection2D::new(&params).unwrap();
        assert_eq!(restored.clock.loop_counter, 0);

        for _ in 0..4 {
            cold.update().unwrap();
            restored.update().unwrap();
        }
        assert_eq!(restored.w.gets(), cold.w.gets());
        assert_eq!(restored.tmp.gets(), cold.tmp.gets());
        assert_eq!(restored.dw().get_all(), cold.dw().get_all());
        assert_eq!(restored.dtmp().get_all(), cold.dtmp().get_all());
    }

    #[test]
    fn test_failed_restore_leaves_state() {
        let dir = output_dir("failed_restore");
        let params = Parameters::from_map(&base_map(&dir, "explicit")).unwrap();
        let mut convection = Convection2D::new(&params).unwrap();
        convection.update().unwrap();
        let w = convection.w.gets().clone();
        let clock = convection.clock.clone();
        assert!(convection.restore(7).is_err());
        assert_eq!(convection.w.gets(), &w);
        assert_eq!(convection.clock, clock);
    }

    #[test]
    fn test_exit_on_nan() {
        let dir = output_dir("nan");
        let params = Parameters::from_map(&base_map(&dir, "explicit")).unwrap();
        let mut convection = Convection2D::new(&params).unwrap();
        assert!(!convection.exit());
        convection.w.gets_mut()[[2, 3]] = Complex::new(f64::NAN, 0.);
        assert!(convection.exit());
    }
}
