use crate::config::SynthConfig;
use crate::estimator::hour_axis;
use crate::types::Dataset;
use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Normal, Uniform};
use std::f64::consts::PI;

/// Number of days of a full seasonal cycle of solar noon.
const DAYS_PER_YEAR: f64 = 365.0;

/// Generate a synthetic dataset with known solar noon.
///
/// Each day follows a cosine clear-sky curve centered on its solar noon,
/// with random cloud shading, additive noise and missing samples.
pub fn generate(cfg: &SynthConfig) -> Result<Dataset> {
    cfg.validate().context("invalid synth parameters")?;

    let mut rng = match cfg.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::try_from_os_rng()?,
    };

    let cloud_dist = Bernoulli::new(cfg.prob_cloud)?;
    let shade_dist = Uniform::new(0.2, 0.8)?;
    let missing_dist = Bernoulli::new(cfg.prob_missing)?;
    let noise_dist = Normal::new(0.0, cfg.std_dev_noise * cfg.peak_power)?;

    let hours = hour_axis(cfg.samples_per_day)?;
    let ref_noon = Array1::from_shape_fn(cfg.n_days, |i_day| {
        let phase = 2.0 * PI * i_day as f64 / DAYS_PER_YEAR;
        cfg.noon_hour + cfg.noon_swing * phase.sin()
    });
    let half_day = cfg.daylight_hours / 2.0;

    let mut power = Array2::zeros((cfg.samples_per_day, cfg.n_days));
    for (i_day, &noon) in ref_noon.iter().enumerate() {
        for (i_smp, &hour) in hours.iter().enumerate() {
            let x = (hour - noon) / half_day;

            // Clear-sky power is zero outside daylight.
            let mut val = if x.abs() < 1.0 {
                cfg.peak_power * (0.5 * PI * x).cos()
            } else {
                0.0
            };

            if val > 0.0 {
                if cloud_dist.sample(&mut rng) {
                    val *= shade_dist.sample(&mut rng);
                }
                val = (val + noise_dist.sample(&mut rng)).max(0.0);
            }

            if missing_dist.sample(&mut rng) {
                val = f64::NAN;
            }

            power[[i_smp, i_day]] = val;
        }
    }

    Ok(Dataset {
        power,
        ref_noon: Some(ref_noon),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{
        DEFAULT_THRESHOLD, MissingPolicy, NightPolicy, avg_sunrise_sunset, energy_com,
    };

    fn clear_sky() -> SynthConfig {
        SynthConfig {
            n_days: 40,
            samples_per_day: 289,
            peak_power: 5.0,
            noon_hour: 12.5,
            noon_swing: 0.5,
            daylight_hours: 14.0,
            prob_cloud: 0.0,
            prob_missing: 0.0,
            std_dev_noise: 0.0,
            seed: Some(1),
        }
    }

    #[test]
    fn shape_and_reference() {
        let dataset = generate(&clear_sky()).unwrap();
        assert_eq!(dataset.power.dim(), (289, 40));

        let ref_noon = dataset.ref_noon.unwrap();
        assert_eq!(ref_noon.len(), 40);
        assert_eq!(ref_noon[0], 12.5);
        assert!(ref_noon.iter().all(|&noon| (12.0..=13.0).contains(&noon)));
        assert!(dataset.power.iter().all(|&val| val >= 0.0));
    }

    #[test]
    fn seed_is_reproducible() {
        let mut cfg = clear_sky();
        cfg.prob_cloud = 0.3;
        cfg.prob_missing = 0.05;
        cfg.std_dev_noise = 0.02;

        let a = generate(&cfg).unwrap();
        let b = generate(&cfg).unwrap();
        assert_eq!(a.power.len(), b.power.len());
        assert!(
            a.power
                .iter()
                .zip(b.power.iter())
                .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
        );
        assert!(a.power.iter().any(|val| val.is_nan()));
    }

    #[test]
    fn estimators_recover_clear_sky_noon() {
        let dataset = generate(&clear_sky()).unwrap();
        let ref_noon = dataset.ref_noon.as_ref().unwrap();
        // Five-minute sampling.
        let step = 24.0 / 288.0;

        let com = energy_com(dataset.power.view(), MissingPolicy::Skip).unwrap();
        for (est, exp) in com.iter().zip(ref_noon.iter()) {
            assert!((est - exp).abs() < step, "expected {exp}, got {est}");
        }

        let mid =
            avg_sunrise_sunset(dataset.power.view(), DEFAULT_THRESHOLD, NightPolicy::Fallback)
                .unwrap();
        for (est, exp) in mid.iter().zip(ref_noon.iter()) {
            assert!((est - exp).abs() < step, "expected {exp}, got {est}");
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        let mut cfg = clear_sky();
        cfg.n_days = 0;
        assert!(generate(&cfg).is_err());
    }
}
