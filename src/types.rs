//! Dataset and result types.

use crate::analysis::MethodReport;
use crate::config::check_num;
use crate::estimator::Method;
use anyhow::{Context, Result, bail};
use ndarray::{Array1, Array2};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Power matrix of a multi-day measurement series.
///
/// Rows are intraday samples evenly spaced over 0-24 hours, columns are days.
/// Missing samples are `NaN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Power matrix (`samples_per_day x n_days`).
    pub power: Array2<f64>,

    /// Known solar noon of each day (hours), if any.
    pub ref_noon: Option<Array1<f64>>,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.power.nrows()
    }

    pub fn n_days(&self) -> usize {
        self.power.ncols()
    }

    /// Load a [`Dataset`] from a MessagePack-encoded file and validate its shape.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let dataset: Dataset = read_msgpack(file).context("failed to read dataset")?;
        dataset.validate().context("failed to validate dataset")?;
        Ok(dataset)
    }

    /// Save the dataset to a MessagePack-encoded file.
    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        write_msgpack(file, self).context("failed to write dataset")
    }

    fn validate(&self) -> Result<()> {
        check_num(self.n_samples(), 1..).context("invalid number of samples per day")?;
        if let Some(ref_noon) = &self.ref_noon {
            let (len, n_days) = (ref_noon.len(), self.n_days());
            if len != n_days {
                bail!("reference noon length must be {n_days}, but is {len}");
            }
        }
        Ok(())
    }
}

/// Solar noon estimates of one method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub method: Method,

    /// Estimated solar noon of each day (hours).
    pub solar_noon: Array1<f64>,

    pub report: MethodReport,
}

/// Contents of a results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Results {
    pub estimates: Vec<Estimate>,
}

impl Results {
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        read_msgpack(file).context("failed to read results")
    }

    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        write_msgpack(file, self).context("failed to write results")
    }
}

fn read_msgpack<T: DeserializeOwned, P: AsRef<Path>>(file: P) -> Result<T> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let val = decode::from_read(&mut reader).context("failed to deserialize value")?;
    Ok(val)
}

fn write_msgpack<T: Serialize, P: AsRef<Path>>(file: P, val: &T) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, val).context("failed to serialize value")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
