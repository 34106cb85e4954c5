use rustrbc::params::{param_map, ParamValue, Parameters};
use rustrbc::timer::Timer;
use rustrbc::{integrate, Convection2D};

fn main() -> rustrbc::Result<()> {
    let map = param_map(vec![
        ("nx", ParamValue::from(1024)),
        ("nz", ParamValue::from(1024)),
        ("lx", ParamValue::from(335.0)),
        ("lz", ParamValue::from(536.0)),
        ("initial_dt", ParamValue::from(1e-3)),
        ("cfl_cutoff", ParamValue::from(0.5)),
        ("Pr", ParamValue::from(7.0)),
        ("final_time", ParamValue::from(1e-1)),
        ("spatial_derivative_order", ParamValue::from(2)),
        ("integrator_order", ParamValue::from(2)),
        ("integrator", ParamValue::from("explicit")),
        ("save_cadence", ParamValue::from(1e-2)),
        // ("load_from", ParamValue::from(49)),
        ("dump_cadence", ParamValue::from(10.0)),
    ]);
    let params = Parameters::from_map(&map)?;

    let timer = Timer::new();
    let mut convection = Convection2D::new(&params)?;
    integrate(&mut convection, params.final_time)?;

    let total = timer.elapsed();
    println!("Total time: {:.2} hr", total / 3600.);
    println!("Total time: {:.2} s", total);
    Ok(())
}
