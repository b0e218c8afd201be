use crate::analysis::analyze;
use crate::config::Config;
use crate::estimator::{estimate, max_abs_diff};
use crate::synth::generate;
use crate::types::{Dataset, Estimate, Results};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Manages the datasets and results of a data directory.
pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(data_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { data_dir, cfg })
    }

    /// Generate a synthetic dataset and save it as the next matrix file.
    pub fn synthesize(&self) -> Result<()> {
        let synth_cfg = self
            .cfg
            .synth
            .as_ref()
            .context("config has no synth section")?;

        let file_idx = self
            .count_matrix_files()
            .context("failed to count matrix files")?;

        let dataset = generate(synth_cfg).context("failed to generate dataset")?;

        let matrix_file = self.matrix_file(file_idx);
        dataset
            .save(&matrix_file)
            .with_context(|| format!("failed to save {matrix_file:?}"))?;
        log::info!("created {matrix_file:?}");

        Ok(())
    }

    /// Run every configured method on every dataset and save the results.
    pub fn estimate(&self) -> Result<()> {
        let n_files = self
            .count_matrix_files()
            .context("failed to count matrix files")?;

        for file_idx in 0..n_files {
            let matrix_file = self.matrix_file(file_idx);
            let dataset = Dataset::load(&matrix_file)
                .with_context(|| format!("failed to load {matrix_file:?}"))?;
            log::info!(
                "loaded {matrix_file:?} ({} samples x {} days)",
                dataset.n_samples(),
                dataset.n_days()
            );

            let mut estimates = Vec::with_capacity(self.cfg.estimator.methods.len());
            for &method in &self.cfg.estimator.methods {
                let solar_noon = estimate(dataset.power.view(), method, &self.cfg.estimator)
                    .with_context(|| format!("failed to estimate solar noon with {method:?}"))?;

                let report = analyze(&dataset, method, solar_noon.view())
                    .context("failed to analyze estimates")?;
                log::info!("{report:#?}");

                estimates.push(Estimate {
                    method,
                    solar_noon,
                    report,
                });
            }

            if let [a, b] = estimates.as_slice() {
                let diff = max_abs_diff(&a.solar_noon, &b.solar_noon);
                log::info!(
                    "max difference between {:?} and {:?}: {diff:.4} h",
                    a.method,
                    b.method
                );
            }

            let results_file = self.results_file(file_idx);
            Results { estimates }
                .save(&results_file)
                .with_context(|| format!("failed to save {results_file:?}"))?;
            log::info!("created {results_file:?}");
        }

        Ok(())
    }

    /// Remove all results files, keeping the datasets.
    pub fn clean(&self) -> Result<()> {
        for file in self.glob_files("noon-*.msgpack")? {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    fn glob_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.data_dir.join(pattern);
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob files")?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        Ok(files)
    }

    fn count_matrix_files(&self) -> Result<usize> {
        Ok(self.glob_files("matrix-*.msgpack")?.len())
    }

    fn matrix_file(&self, file_idx: usize) -> PathBuf {
        self.data_dir.join(format!("matrix-{file_idx:04}.msgpack"))
    }

    fn results_file(&self, file_idx: usize) -> PathBuf {
        self.data_dir.join(format!("noon-{file_idx:04}.msgpack"))
    }
}
