use crate::estimator::{DEFAULT_THRESHOLD, Method, MissingPolicy, NightPolicy};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Tool configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Estimator parameters.
    #[serde(default)]
    pub estimator: EstimatorConfig,

    /// Synthetic dataset parameters.
    pub synth: Option<SynthConfig>,
}

/// Estimator parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Methods to run on each dataset.
    pub methods: Vec<Method>,

    /// Night threshold relative to the dataset's peak power.
    pub threshold: f64,

    /// Treatment of missing samples by the energy center of mass.
    pub missing: MissingPolicy,

    /// Result of the sunrise/sunset midpoint on days without daylight.
    pub night: NightPolicy,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            methods: vec![Method::EnergyCom, Method::SunriseSunset],
            threshold: DEFAULT_THRESHOLD,
            missing: MissingPolicy::default(),
            night: NightPolicy::default(),
        }
    }
}

/// Synthetic dataset parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthConfig {
    /// Number of days (matrix columns).
    pub n_days: usize,
    /// Number of samples per day (matrix rows).
    pub samples_per_day: usize,

    /// Clear-sky peak power.
    pub peak_power: f64,

    /// Mean solar noon (hours).
    pub noon_hour: f64,
    /// Amplitude of the seasonal solar noon swing (hours).
    pub noon_swing: f64,
    /// Length of daylight (hours).
    pub daylight_hours: f64,

    /// Probability of a daylight sample being shaded by clouds.
    pub prob_cloud: f64,
    /// Probability of a sample being missing.
    pub prob_missing: f64,
    /// Standard deviation of the additive noise, relative to the peak power.
    pub std_dev_noise: f64,

    /// Random number generator seed.
    pub seed: Option<u64>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must contain a TOML-encoded [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.estimator
            .validate()
            .context("invalid estimator parameters")?;
        if let Some(synth) = &self.synth {
            synth.validate().context("invalid synth parameters")?;
        }
        Ok(())
    }
}

impl EstimatorConfig {
    fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            bail!("at least one method must be selected");
        }
        check_num(self.threshold, 0.0..=1.0).context("invalid threshold")?;
        Ok(())
    }
}

impl SynthConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        check_num(self.n_days, 1..100_000).context("invalid number of days")?;
        check_num(self.samples_per_day, 2..100_000)
            .context("invalid number of samples per day")?;

        check_pos(self.peak_power, 1e9).context("invalid peak power")?;

        check_num(self.noon_hour, 0.0..24.0).context("invalid noon hour")?;
        check_num(self.noon_swing, 0.0..2.0).context("invalid noon swing")?;
        check_pos(self.daylight_hours, 24.0).context("invalid daylight hours")?;

        check_num(self.prob_cloud, 0.0..=1.0).context("invalid cloud probability")?;
        check_num(self.prob_missing, 0.0..=1.0).context("invalid missing probability")?;
        check_num(self.std_dev_noise, 0.0..1.0).context("invalid noise standard deviation")?;

        Ok(())
    }
}

pub(crate) fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_pos(num: f64, max: f64) -> Result<()> {
    // Positive, and no larger than `max`.
    if !(num > 0.0 && num <= max) {
        bail!("number must be positive and at most {max:?}, but is {num:?}");
    }
    Ok(())
}
