use serde::{Deserialize, Serialize};

/// Streaming mean and standard deviation of the finite values added to it.
///
/// Non-finite values are counted as undefined and otherwise ignored.
pub struct Accumulator {
    n_vals: usize,
    n_undef: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub n_undef: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            n_undef: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        if !val.is_finite() {
            self.n_undef += 1;
            return;
        }

        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            n_undef: self.n_undef,
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}
