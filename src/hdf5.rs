//! Read / Write with hdf5
//!
//! Real arrays are stored as they are, complex arrays as two real
//! datasets `<name>_re` and `<name>_im`. Scalars are stored as arrays
//! of length one.
use crate::error::{check_shape, Result};
use hdf5::H5Type;
use ndarray::{Array, Array1, ArrayBase, ArrayD, Data, Dimension, Zip};
use num_complex::Complex;
use std::path::Path;

/// Open `filename` for writing, create it if it does not exist
fn open_or_create<P: AsRef<Path>>(filename: P) -> Result<hdf5::File> {
    let file = if filename.as_ref().exists() {
        hdf5::File::append(filename)?
    } else {
        hdf5::File::create(filename)?
    };
    Ok(file)
}

/// Check if a variable exists in a hdf5 file
///
/// # Errors
/// When the file members cannot be listed.
pub fn variable_exists(file: &hdf5::File, name: &str) -> Result<bool> {
    Ok(file.member_names()?.iter().any(|i| i == name))
}

/// Read dataset from hdf5 file, return array
///
/// # Errors
/// When file or variable does not exist, or the dataset does not
/// have the dimensionality of `D`.
pub fn read_from_hdf5<T, D, P>(filename: P, name: &str) -> Result<Array<T, D>>
where
    T: H5Type + Copy,
    D: Dimension,
    P: AsRef<Path>,
{
    let file = hdf5::File::open(filename)?;
    let data = file.dataset(name)?;
    let y: ArrayD<T> = data.read_dyn::<T>()?;
    Ok(y.into_dimensionality::<D>()?)
}

/// Read complex dataset from its `_re` and `_im` parts
///
/// # Errors
/// When file or one of the parts does not exist, or both parts
/// differ in shape.
pub fn read_from_hdf5_complex<D, P>(filename: P, name: &str) -> Result<Array<Complex<f64>, D>>
where
    D: Dimension,
    P: AsRef<Path>,
{
    let re = read_from_hdf5::<f64, D, _>(&filename, &format!("{}_re", name))?;
    let im = read_from_hdf5::<f64, D, _>(&filename, &format!("{}_im", name))?;
    check_shape(re.shape(), im.shape())?;

    let mut x = Array::<Complex<f64>, D>::zeros(re.raw_dim());
    Zip::from(&mut x).and(&re).and(&im).for_each(|w, &r, &i| {
        w.re = r;
        w.im = i;
    });
    Ok(x)
}

/// Write dataset to hdf5 file. An existing variable of the same
/// name is overwritten.
///
/// # Errors
/// When the file cannot be created, or the variable exists
/// with a different shape.
pub fn write_to_hdf5<T, S, D, P>(filename: P, name: &str, array: &ArrayBase<S, D>) -> Result<()>
where
    T: H5Type + Copy,
    S: Data<Elem = T>,
    D: Dimension,
    P: AsRef<Path>,
{
    let file = open_or_create(filename)?;
    let dset = if variable_exists(&file, name)? {
        let dset = file.dataset(name)?;
        check_shape(&dset.shape(), array.shape())?;
        dset
    } else {
        file.new_dataset::<T>()
            .shape(array.shape().to_vec())
            .create(name)?
    };
    dset.write(array.view())?;
    Ok(())
}

/// Write complex valued dataset as `<name>_re` and `<name>_im`
///
/// # Errors
/// See [`write_to_hdf5`].
pub fn write_to_hdf5_complex<S, D, P>(filename: P, name: &str, array: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = Complex<f64>>,
    D: Dimension,
    P: AsRef<Path>,
{
    write_to_hdf5(&filename, &format!("{}_re", name), &array.mapv(|x| x.re))?;
    write_to_hdf5(&filename, &format!("{}_im", name), &array.mapv(|x| x.im))?;
    Ok(())
}

/// Read scalar from hdf5
///
/// # Errors
/// When file or variable does not exist or the dataset
/// does not hold exactly one value.
pub fn read_scalar_from_hdf5<T, P>(filename: P, name: &str) -> Result<T>
where
    T: H5Type + Copy,
    P: AsRef<Path>,
{
    let scalar: Array1<T> = read_from_hdf5(filename, name)?;
    check_shape(&[1], scalar.shape())?;
    Ok(scalar[0])
}

/// Write scalar to hdf5 file
///
/// # Errors
/// See [`write_to_hdf5`].
pub fn write_scalar_to_hdf5<T, P>(filename: P, name: &str, scalar: T) -> Result<()>
where
    T: H5Type + Copy,
    P: AsRef<Path>,
{
    let x = Array1::<T>::from_elem(1, scalar);
    write_to_hdf5(filename, name, &x)
}
