//! Checkpoints of the co-evolved vorticity and temperature fields
//!
//! A checkpoint holds the spectral coefficients of both fields, their
//! derivative histories and the single rotation index shared by both
//! histories.
use crate::error::{check_shape, Error, Result};
use crate::field::{Field, FieldData};
use crate::hdf5::{
    read_from_hdf5_complex, read_scalar_from_hdf5, write_scalar_to_hdf5, write_to_hdf5_complex,
};
use crate::integrate::DerivativeHistory;
use ndarray::{Array2, Array3};
use num_complex::Complex;
use std::path::{Path, PathBuf};

/// File of checkpoint `index` in `dir`
pub fn dump_name<P: AsRef<Path>>(dir: P, index: usize) -> PathBuf {
    dir.as_ref().join(format!("dump{:04}.h5", index))
}

/// File of the clock state belonging to checkpoint `index`
pub fn state_name<P: AsRef<Path>>(dir: P, index: usize) -> PathBuf {
    dir.as_ref().join(format!("state{:04}.h5", index))
}

/// Write checkpoint, replacing an existing file of the same name.
///
/// # Errors
/// The histories disagree on their rotation index (nothing is
/// written), or the file cannot be written.
pub fn write_checkpoint<P: AsRef<Path>>(
    filename: P,
    w: &Field,
    dw: &DerivativeHistory,
    tmp: &Field,
    dtmp: &DerivativeHistory,
) -> Result<()> {
    let filename = filename.as_ref();
    if dw.get_curr_idx() != dtmp.get_curr_idx() {
        return Err(Error::HistoryDesync(vec![
            dw.get_curr_idx(),
            dtmp.get_curr_idx(),
        ]));
    }
    if filename.exists() {
        std::fs::remove_file(filename)?;
    }
    write_to_hdf5_complex(filename, "w", w.gets())?;
    write_to_hdf5_complex(filename, "dw", dw.get_all())?;
    write_to_hdf5_complex(filename, "tmp", tmp.gets())?;
    write_to_hdf5_complex(filename, "dtmp", dtmp.get_all())?;
    write_scalar_to_hdf5(filename, "curr_idx", dw.get_curr_idx() as u64)?;
    println!(" ==> {:?}", filename);
    Ok(())
}

/// Restore fields and histories from a checkpoint. The stored
/// rotation index is applied to both histories. Fields are
/// synchronised to physical space afterwards.
///
/// # Errors
/// File or datasets missing, shapes differ from the current
/// configuration, or the stored index exceeds the history capacity.
/// Fields and histories are left untouched in that case.
pub fn read_checkpoint<P: AsRef<Path>>(
    filename: P,
    w: &mut Field,
    dw: &mut DerivativeHistory,
    tmp: &mut Field,
    dtmp: &mut DerivativeHistory,
) -> Result<()> {
    let filename = filename.as_ref();
    let w_hat: Array2<Complex<f64>> = read_from_hdf5_complex(filename, "w")?;
    let dw_all: Array3<Complex<f64>> = read_from_hdf5_complex(filename, "dw")?;
    let tmp_hat: Array2<Complex<f64>> = read_from_hdf5_complex(filename, "tmp")?;
    let dtmp_all: Array3<Complex<f64>> = read_from_hdf5_complex(filename, "dtmp")?;
    let curr_idx = read_scalar_from_hdf5::<u64, _>(filename, "curr_idx")? as usize;

    // validate everything before the first target is touched
    check_shape(w.shape(), w_hat.shape())?;
    check_shape(tmp.shape(), tmp_hat.shape())?;
    check_shape(dw.get_all().shape(), dw_all.shape())?;
    check_shape(dtmp.get_all().shape(), dtmp_all.shape())?;
    let capacity = dw.capacity().min(dtmp.capacity());
    if curr_idx >= capacity {
        return Err(Error::HistoryIndex {
            idx: curr_idx,
            capacity,
        });
    }

    w.load(FieldData::Spectral(&w_hat))?;
    tmp.load(FieldData::Spectral(&tmp_hat))?;
    dw.load(&dw_all)?;
    dtmp.load(&dtmp_all)?;
    dw.set_curr_idx(curr_idx)?;
    dtmp.set_curr_idx(curr_idx)?;
    w.to_physical();
    tmp.to_physical();
    println!(" <== {:?}", filename);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Representation;

    fn state(nx: usize, nz: usize, seed: f64) -> (Field, DerivativeHistory) {
        let mut field = Field::new("f", nx, nz);
        let vhat = Array2::from_shape_fn((nx, nz), |(i, j)| {
            Complex::new(seed * i as f64, -(j as f64) / seed)
        });
        field.assign(&vhat).unwrap();
        let mut history = DerivativeHistory::new(3, nx, nz);
        for k in 0..3 {
            history
                .set(&Array2::from_elem((nx, nz), Complex::new(seed + k as f64, 1.)))
                .unwrap();
            history.advance();
        }
        history.advance();
        (field, history)
    }

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rustrbc_checkpoint_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_names() {
        assert_eq!(dump_name("out", 3), Path::new("out").join("dump0003.h5"));
        assert_eq!(state_name(".", 12), Path::new(".").join("state0012.h5"));
    }

    #[test]
    fn test_write_read() {
        let fname = dump_name(tmp_dir("roundtrip"), 0);
        let (w, dw) = state(6, 4, 2.);
        let (tmp, dtmp) = state(6, 4, 3.);
        write_checkpoint(&fname, &w, &dw, &tmp, &dtmp).unwrap();
        // second write replaces the file
        write_checkpoint(&fname, &w, &dw, &tmp, &dtmp).unwrap();

        let mut w2 = Field::new("w", 6, 4);
        let mut tmp2 = Field::new("tmp", 6, 4);
        let mut dw2 = DerivativeHistory::new(3, 6, 4);
        let mut dtmp2 = DerivativeHistory::new(3, 6, 4);
        read_checkpoint(&fname, &mut w2, &mut dw2, &mut tmp2, &mut dtmp2).unwrap();
        assert_eq!(w.gets(), w2.gets());
        assert_eq!(tmp.gets(), tmp2.gets());
        assert_eq!(dw.get_all(), dw2.get_all());
        assert_eq!(dtmp.get_all(), dtmp2.get_all());
        assert_eq!(dw2.get_curr_idx(), 1);
        assert_eq!(dtmp2.get_curr_idx(), 1);
        assert_eq!(w2.representation(), Representation::Synchronized);
    }

    #[test]
    fn test_desync_is_rejected() {
        let fname = dump_name(tmp_dir("desync"), 1);
        let (w, dw) = state(4, 4, 1.);
        let (tmp, mut dtmp) = state(4, 4, 1.);
        dtmp.advance();
        assert!(matches!(
            write_checkpoint(&fname, &w, &dw, &tmp, &dtmp),
            Err(Error::HistoryDesync(_))
        ));
        assert!(!fname.exists());
    }

    #[test]
    fn test_capacity_mismatch_leaves_targets() {
        let fname = dump_name(tmp_dir("capacity"), 0);
        let (w, dw) = state(4, 4, 2.);
        let (tmp, dtmp) = state(4, 4, 3.);
        write_checkpoint(&fname, &w, &dw, &tmp, &dtmp).unwrap();

        let mut w2 = Field::new("w", 4, 4);
        let mut tmp2 = Field::new("tmp", 4, 4);
        let mut dw2 = DerivativeHistory::new(2, 4, 4);
        let mut dtmp2 = DerivativeHistory::new(2, 4, 4);
        dw2.set(&Array2::from_elem((4, 4), Complex::new(1., 1.)))
            .unwrap();
        dw2.advance();
        dtmp2.advance();
        let before = (w2.gets().clone(), dw2.get_all().clone(), dtmp2.get_all().clone());

        assert!(read_checkpoint(&fname, &mut w2, &mut dw2, &mut tmp2, &mut dtmp2).is_err());
        assert_eq!(w2.gets(), &before.0);
        assert!(tmp2.gets().iter().all(|v| *v == Complex::new(0., 0.)));
        assert_eq!(dw2.get_all(), &before.1);
        assert_eq!(dtmp2.get_all(), &before.2);
        assert_eq!(dw2.get_curr_idx(), 1);
        assert_eq!(dtmp2.get_curr_idx(), 1);
    }

    #[test]
    fn test_shape_mismatch_on_read() {
        let fname = dump_name(tmp_dir("shape"), 0);
        let (w, dw) = state(4, 4, 1.);
        let (tmp, dtmp) = state(4, 4, 1.);
        write_checkpoint(&fname, &w, &dw, &tmp, &dtmp).unwrap();
        let mut w2 = Field::new("w", 8, 4);
        let mut tmp2 = Field::new("tmp", 8, 4);
        let mut dw2 = DerivativeHistory::new(3, 8, 4);
        let mut dtmp2 = DerivativeHistory::new(3, 8, 4);
        assert!(read_checkpoint(&fname, &mut w2, &mut dw2, &mut tmp2, &mut dtmp2).is_err());
    }
}
