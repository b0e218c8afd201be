use crate::estimator::Method;
use crate::stats::{Accumulator, AccumulatorReport};
use crate::types::Dataset;
use anyhow::{Result, bail};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Summary of the estimates of one method on one dataset.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MethodReport {
    pub method: Method,

    /// Statistics of the estimated solar noon over all days.
    pub noon: AccumulatorReport,

    /// Statistics of the estimation error, if the dataset has a reference.
    pub error: Option<AccumulatorReport>,
}

pub struct Analyzer {
    method: Method,
    noon_acc: Accumulator,
    error_acc: Option<Accumulator>,
}

impl Analyzer {
    pub fn new(method: Method, with_ref: bool) -> Self {
        Self {
            method,
            noon_acc: Accumulator::new(),
            error_acc: with_ref.then(Accumulator::new),
        }
    }

    /// Add the estimate of one day and, if tracked, its reference value.
    pub fn add_day(&mut self, noon: f64, ref_noon: Option<f64>) {
        self.noon_acc.add(noon);
        if let (Some(acc), Some(ref_noon)) = (&mut self.error_acc, ref_noon) {
            acc.add(noon - ref_noon);
        }
    }

    pub fn report(&self) -> MethodReport {
        MethodReport {
            method: self.method,
            noon: self.noon_acc.report(),
            error: self.error_acc.as_ref().map(Accumulator::report),
        }
    }
}

/// Summarize the estimates of `method` on `dataset`.
pub fn analyze(
    dataset: &Dataset,
    method: Method,
    solar_noon: ArrayView1<f64>,
) -> Result<MethodReport> {
    let (len, n_days) = (solar_noon.len(), dataset.n_days());
    if len != n_days {
        bail!("number of estimates must be {n_days}, but is {len}");
    }

    let mut analyzer = Analyzer::new(method, dataset.ref_noon.is_some());
    for (i_day, &noon) in solar_noon.iter().enumerate() {
        let ref_noon = dataset.ref_noon.as_ref().map(|ref_noon| ref_noon[i_day]);
        analyzer.add_day(noon, ref_noon);
    }

    Ok(analyzer.report())
}
