//! # Simulation parameters
//!
//! Parameters are supplied as a mapping from option names to values.
//! They are validated as a whole, every problem is reported, and only
//! then the typed [`Parameters`] record is built and its derived
//! quantities (truncation, wavenumbers, grid spacing, defaults) are set.
//!
//! ```
//! use rustrbc::params::{param_map, ParamValue, Parameters};
//! let map = param_map(vec![
//!     ("nx", ParamValue::from(10)),
//!     ("nz", ParamValue::from(7)),
//!     ("lx", ParamValue::from(1.0)),
//!     ("lz", ParamValue::from(1.0)),
//!     ("final_time", ParamValue::from(2.0)),
//! ]);
//! let params = Parameters::from_map(&map).unwrap();
//! assert_eq!(params.nn, 3);
//! assert_eq!(params.nm, 2);
//! assert_eq!(params.dump_cadence, 0.1 * 2.0);
//! ```
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Mapping of option names to values
pub type ParamMap = HashMap<String, ParamValue>;

/// Options that must always be supplied
pub const REQUIRED_PARAMS: [&str; 5] = ["nx", "nz", "lx", "lz", "final_time"];

/// Options with a default value
pub const OPTIONAL_PARAMS: [&str; 14] = [
    "initial_dt",
    "cfl_cutoff",
    "cfl_cadence",
    "ke_cadence",
    "save_cadence",
    "dump_cadence",
    "integrator_order",
    "integrator",
    "spatial_derivative_order",
    "load_from",
    "Pr",
    "alpha",
    "max_dt",
    "output_dir",
];

/// Largest supported Adams-Bashforth order
pub const MAX_INTEGRATOR_ORDER: usize = 4;

/// Value of a single option
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Integer option
    Int(i64),
    /// Floating point option
    Float(f64),
    /// String option
    Str(String),
}

impl ParamValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Str(_) => None,
        }
    }

    fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Int(i) if *i >= 0 => Some(*i as usize),
            ParamValue::Float(f) if *f >= 0. && f.fract() == 0. => Some(*f as usize),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// Build a [`ParamMap`] from name/value pairs
pub fn param_map<I>(pairs: I) -> ParamMap
where
    I: IntoIterator<Item = (&'static str, ParamValue)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

/// Treatment of the linear (diffusive) term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    /// Linear term is part of the multistep explicit combination
    Explicit,
    /// Linear term is treated implicitly (IMEX)
    SemiImplicit,
}

impl FromStr for SchemeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(SchemeKind::Explicit),
            "semi_implicit" | "semi-implicit" | "imex" => Ok(SchemeKind::SemiImplicit),
            _ => Err(format!("integrator `{}` is not supported.", s)),
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeKind::Explicit => write!(f, "explicit"),
            SchemeKind::SemiImplicit => write!(f, "semi_implicit"),
        }
    }
}

/// Validated simulation configuration
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Number of grid points in x
    pub nx: usize,
    /// Number of grid points in z
    pub nz: usize,
    /// Domain length in x
    pub lx: f64,
    /// Domain length in z
    pub lz: f64,
    /// Simulation end time
    pub final_time: f64,
    /// Starting step size
    pub initial_dt: f64,
    /// Safety factor of the CFL condition
    pub cfl_cutoff: f64,
    /// Number of timesteps between CFL checks
    pub cfl_cadence: usize,
    /// Number of timesteps between kinetic energy samples
    pub ke_cadence: usize,
    /// Simulation time between diagnostic saves
    pub save_cadence: f64,
    /// Simulation time between checkpoints
    pub dump_cadence: f64,
    /// Order of the multistep scheme
    pub integrator_order: usize,
    /// Explicit or semi-implicit treatment of the linear term
    pub integrator: SchemeKind,
    /// Order of spatial derivatives. Fourier derivatives are exact,
    /// the value is kept for configuration compatibility.
    pub spatial_derivative_order: usize,
    /// Checkpoint index to resume from
    pub load_from: Option<usize>,
    /// Prandtl number
    pub pr: f64,
    /// Implicitness of the semi-implicit scheme (1 is fully implicit)
    pub alpha: f64,
    /// Upper bound of the adaptive step size
    pub max_dt: Option<f64>,
    /// Directory of checkpoints and diagnostics
    pub output_dir: PathBuf,
    /// Truncation index in x (2/3 rule)
    pub nn: usize,
    /// Truncation index in z (2/3 rule)
    pub nm: usize,
    /// Fundamental wavenumber in x
    pub kn: f64,
    /// Fundamental wavenumber in z
    pub km: f64,
    /// Grid spacing in x
    pub dx: f64,
    /// Grid spacing in z
    pub dz: f64,
}

impl Parameters {
    /// Validate, load and derive parameters.
    ///
    /// # Errors
    /// Returns `Error::InvalidParameters` with every problem found
    /// when a required key is missing or a value is invalid.
    pub fn from_map(params: &ParamMap) -> Result<Self> {
        let errors = Self::validate(params);
        if !errors.is_empty() {
            for e in &errors {
                println!("{}", e);
            }
            return Err(Error::InvalidParameters(errors));
        }
        for key in params.keys() {
            let known = REQUIRED_PARAMS
                .iter()
                .chain(OPTIONAL_PARAMS.iter())
                .any(|k| *k == key.as_str());
            if !known {
                println!("Unknown parameter {:?} is ignored.", key);
            }
        }
        let mut p = Self::load_from_map(params);
        p.set_derived_params(params);
        Ok(p)
    }

    /// Returns a message for every missing or invalid parameter.
    /// An empty list means `params` is valid.
    pub fn validate(params: &ParamMap) -> Vec<String> {
        let mut errors = Vec::new();
        for key in REQUIRED_PARAMS.iter() {
            if !params.contains_key(*key) {
                errors.push(format!("{} missing from input parameters.", key));
            }
        }

        for key in ["nx", "nz"].iter() {
            check_usize(params, key, 2, &mut errors);
        }
        for key in ["cfl_cadence", "ke_cadence", "integrator_order"].iter() {
            check_usize(params, key, 1, &mut errors);
        }
        check_usize(params, "spatial_derivative_order", 2, &mut errors);
        check_usize(params, "load_from", 0, &mut errors);
        for key in [
            "lx",
            "lz",
            "final_time",
            "initial_dt",
            "cfl_cutoff",
            "save_cadence",
            "dump_cadence",
            "Pr",
            "max_dt",
        ]
        .iter()
        {
            check_positive(params, key, &mut errors);
        }

        if let Some(order) = params.get("integrator_order").and_then(ParamValue::as_usize) {
            if order > MAX_INTEGRATOR_ORDER {
                errors.push(format!(
                    "integrator_order must be at most {}, got {}.",
                    MAX_INTEGRATOR_ORDER, order
                ));
            }
        }
        if let Some(order) = params
            .get("spatial_derivative_order")
            .and_then(ParamValue::as_usize)
        {
            if order % 2 != 0 {
                errors.push(format!("spatial_derivative_order must be even, got {}.", order));
            }
        }
        if let Some(v) = params.get("alpha") {
            match v.as_f64() {
                Some(a) if a > 0. && a <= 1. => (),
                _ => errors.push(format!("alpha must be in (0, 1], got {:?}.", v)),
            }
        }
        if let Some(v) = params.get("integrator") {
            match v.as_str() {
                Some(s) => {
                    if let Err(e) = s.parse::<SchemeKind>() {
                        errors.push(e);
                    }
                }
                None => errors.push(format!("integrator must be a string, got {:?}.", v)),
            }
        }
        if let Some(v) = params.get("output_dir") {
            if v.as_str().is_none() {
                errors.push(format!("output_dir must be a string, got {:?}.", v));
            }
        }
        errors
    }

    /// Load values of `params`, unspecified options receive defaults.
    /// Expects a validated map.
    fn load_from_map(params: &ParamMap) -> Self {
        let float = |key: &str, default: f64| {
            params
                .get(key)
                .and_then(ParamValue::as_f64)
                .unwrap_or(default)
        };
        let int = |key: &str, default: usize| {
            params
                .get(key)
                .and_then(ParamValue::as_usize)
                .unwrap_or(default)
        };
        let integrator = params
            .get("integrator")
            .and_then(ParamValue::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(SchemeKind::Explicit);
        let output_dir = params
            .get("output_dir")
            .and_then(ParamValue::as_str)
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        Parameters {
            nx: int("nx", 0),
            nz: int("nz", 0),
            lx: float("lx", 0.),
            lz: float("lz", 0.),
            final_time: float("final_time", 0.),
            initial_dt: float("initial_dt", 0.),
            cfl_cutoff: float("cfl_cutoff", 0.5),
            cfl_cadence: int("cfl_cadence", 10),
            ke_cadence: int("ke_cadence", 100),
            save_cadence: float("save_cadence", 0.),
            dump_cadence: float("dump_cadence", 0.),
            integrator_order: int("integrator_order", 2),
            integrator,
            spatial_derivative_order: int("spatial_derivative_order", 2),
            load_from: params.get("load_from").and_then(ParamValue::as_usize),
            pr: float("Pr", 7.0),
            alpha: float("alpha", 1.0),
            max_dt: params.get("max_dt").and_then(ParamValue::as_f64),
            output_dir,
            nn: 0,
            nm: 0,
            kn: 0.,
            km: 0.,
            dx: 0.,
            dz: 0.,
        }
    }

    /// Set quantities derived from the required parameters.
    /// Depends only on `self`'s required fields and on which keys
    /// `params` contains, so repeated calls give the same result.
    pub fn set_derived_params(&mut self, params: &ParamMap) {
        if !params.contains_key("dump_cadence") {
            self.dump_cadence = 0.1 * self.final_time;
        }
        if !params.contains_key("save_cadence") {
            self.save_cadence = 0.1 * self.final_time;
        }

        self.nn = (self.nx - 1) / 3;
        self.nm = (self.nz - 1) / 3;

        self.kn = 2. * PI / self.lx;
        self.km = 2. * PI / self.lz;

        self.dx = self.lx / self.nx as f64;
        self.dz = self.lz / self.nz as f64;

        if !params.contains_key("initial_dt") {
            self.initial_dt = 0.2 * self.dx.min(self.dz);
        }
    }
}

fn check_usize(params: &ParamMap, key: &str, min: usize, errors: &mut Vec<String>) {
    if let Some(v) = params.get(key) {
        match v.as_usize() {
            Some(x) if x >= min => (),
            _ => errors.push(format!(
                "{} must be an integer >= {}, got {:?}.",
                key, min, v
            )),
        }
    }
}

fn check_positive(params: &ParamMap, key: &str, errors: &mut Vec<String>) {
    if let Some(v) = params.get(key) {
        match v.as_f64() {
            Some(x) if x > 0. && x.is_finite() => (),
            _ => errors.push(format!("{} must be a positive number, got {:?}.", key, v)),
        }
    }
}
