//! Time series of a scalar diagnostic
use crate::error::Result;
use crate::hdf5::write_to_hdf5;
use ndarray::Array1;
use std::path::{Path, PathBuf};

/// Records `(t, value)` pairs and writes them to hdf5
#[derive(Debug, Clone)]
pub struct ScalarTracker {
    filename: PathBuf,
    time: Vec<f64>,
    value: Vec<f64>,
}

impl ScalarTracker {
    /// Empty series, written to `filename` on [`ScalarTracker::save`]
    pub fn new<P: AsRef<Path>>(filename: P) -> Self {
        Self {
            filename: filename.as_ref().to_path_buf(),
            time: Vec::new(),
            value: Vec::new(),
        }
    }

    /// Target file
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Add a sample
    pub fn append(&mut self, t: f64, value: f64) {
        self.time.push(t);
        self.value.push(value);
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True if no sample was recorded
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<(f64, f64)> {
        self.time.last().copied().zip(self.value.last().copied())
    }

    /// Rewrite the whole series as datasets `time` and `value`.
    /// Nothing is written while the series is empty.
    ///
    /// # Errors
    /// File cannot be written.
    pub fn save(&self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if self.filename.exists() {
            std::fs::remove_file(&self.filename)?;
        }
        write_to_hdf5(&self.filename, "time", &Array1::from(self.time.clone()))?;
        write_to_hdf5(&self.filename, "value", &Array1::from(self.value.clone()))?;
        Ok(())
    }
}
