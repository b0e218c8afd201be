//! Solar noon estimators.
//!
//! Both estimators consume a power matrix of shape `(T, D)`, with one row
//! per intraday sample and one column per day, and return one estimate in
//! hours per day. The time axis is inferred from `T`: samples are assumed to
//! be evenly spaced over the full 0-24 hour range, endpoints included.

use crate::config::EstimatorConfig;
use anyhow::{Result, bail};
use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};

/// Default relative night threshold of the sunrise/sunset estimator.
pub const DEFAULT_THRESHOLD: f64 = 0.005;

/// Solar noon estimation method.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Power-weighted centroid of each day in time.
    EnergyCom,
    /// Midpoint of the first and last daylight samples.
    SunriseSunset,
}

/// Treatment of missing (`NaN`) samples by [`energy_com`].
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Missing samples carry zero weight.
    #[default]
    Skip,
    /// Missing samples poison the day's sums, making its estimate `NaN`.
    Propagate,
}

/// Result of [`avg_sunrise_sunset`] for days without any daylight sample.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NightPolicy {
    /// Sunrise falls back to the first sample and sunset to the last one.
    #[default]
    Fallback,
    /// The estimate is `NaN`.
    Undefined,
}

/// Sunrise and sunset times of a single day, in hours.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct DaylightWindow {
    pub sunrise: f64,
    pub sunset: f64,
}

impl DaylightWindow {
    /// Midpoint of the window.
    pub fn midpoint(&self) -> f64 {
        (self.sunrise + self.sunset) / 2.0
    }
}

/// Hour of day of each of `n_samples` evenly spaced samples spanning 0 to 24.
///
/// # Errors
/// Returns an error if `n_samples` is zero.
pub fn hour_axis(n_samples: usize) -> Result<Array1<f64>> {
    if n_samples == 0 {
        bail!("time axis must have at least one sample");
    }
    if n_samples == 1 {
        return Ok(Array1::zeros(1));
    }
    let n_steps = (n_samples - 1) as f64;
    Ok(Array1::from_shape_fn(n_samples, |i_smp| {
        i_smp as f64 * 24.0 / n_steps
    }))
}

/// Estimate solar noon as the energy center of mass of each day.
///
/// Days with zero total energy yield `NaN`.
///
/// # Errors
/// Returns an error if the matrix has no rows.
pub fn energy_com(data: ArrayView2<f64>, missing: MissingPolicy) -> Result<Array1<f64>> {
    let hours = hour_axis(data.nrows())?;

    let com = data
        .axis_iter(Axis(1))
        .map(|day| {
            let mut moment = 0.0;
            let mut energy = 0.0;
            for (&hour, &val) in hours.iter().zip(day.iter()) {
                if val.is_nan() && missing == MissingPolicy::Skip {
                    continue;
                }
                moment += hour * val;
                energy += val;
            }
            if energy == 0.0 {
                f64::NAN
            } else {
                moment / energy
            }
        })
        .collect();

    Ok(com)
}

/// Classify every sample as daylight (`true`) or night (`false`).
///
/// A sample is night if it is missing or below `threshold` times the largest
/// non-missing value of the whole matrix. If every sample is missing, every
/// sample is night.
pub fn daylight_mask(data: ArrayView2<f64>, threshold: f64) -> Array2<bool> {
    let peak = data
        .iter()
        .copied()
        .filter(|val| !val.is_nan())
        .reduce(f64::max)
        .unwrap_or(f64::NAN);
    let cutoff = threshold * peak;

    data.mapv(|val| !(val.is_nan() || val < cutoff))
}

/// Detect the sunrise and sunset time of each day.
///
/// Sunrise is the hour of the first daylight sample and sunset the hour of
/// the last one (see [`daylight_mask`]). Days without daylight are handled
/// according to `night`.
///
/// # Errors
/// Returns an error if the matrix has no rows.
pub fn daylight_windows(
    data: ArrayView2<f64>,
    threshold: f64,
    night: NightPolicy,
) -> Result<Vec<DaylightWindow>> {
    let hours = hour_axis(data.nrows())?;
    let mask = daylight_mask(data, threshold);
    let i_last = data.nrows() - 1;

    let windows = mask
        .axis_iter(Axis(1))
        .map(|good| {
            let i_rise = good.iter().position(|&day| day);
            let i_set = good.iter().rposition(|&day| day);
            match (i_rise, i_set, night) {
                (Some(i_rise), Some(i_set), _) => DaylightWindow {
                    sunrise: hours[i_rise],
                    sunset: hours[i_set],
                },
                (_, _, NightPolicy::Fallback) => DaylightWindow {
                    sunrise: hours[0],
                    sunset: hours[i_last],
                },
                (_, _, NightPolicy::Undefined) => DaylightWindow {
                    sunrise: f64::NAN,
                    sunset: f64::NAN,
                },
            }
        })
        .collect();

    Ok(windows)
}

/// Estimate solar noon as the midpoint between sunrise and sunset of each day.
///
/// # Errors
/// Returns an error if the matrix has no rows.
pub fn avg_sunrise_sunset(
    data: ArrayView2<f64>,
    threshold: f64,
    night: NightPolicy,
) -> Result<Array1<f64>> {
    let windows = daylight_windows(data, threshold, night)?;
    Ok(windows.iter().map(DaylightWindow::midpoint).collect())
}

/// Run the estimator selected by `method` with the parameters in `cfg`.
pub fn estimate(
    data: ArrayView2<f64>,
    method: Method,
    cfg: &EstimatorConfig,
) -> Result<Array1<f64>> {
    match method {
        Method::EnergyCom => energy_com(data, cfg.missing),
        Method::SunriseSunset => avg_sunrise_sunset(data, cfg.threshold, cfg.night),
    }
}

/// Largest absolute difference between two estimate sequences, ignoring
/// days where either is undefined.
pub fn max_abs_diff(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let mut max_diff = 0.0_f64;
    Zip::from(a).and(b).for_each(|&x, &y| {
        let diff = (x - y).abs();
        if !diff.is_nan() {
            max_diff = max_diff.max(diff);
        }
    });
    max_diff
}
