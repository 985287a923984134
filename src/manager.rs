use crate::analysis::{Analyzer, Dataset, Forecast};
use crate::bootstrap::resample;
use crate::config::Config;
use crate::data::{ModelOutput, read_file, write_file};
use crate::series::{Ensemble, TimeSeries};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Runs the workflow steps on the files of a work directory.
pub struct Manager {
    work_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(work_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { work_dir, cfg })
    }

    /// Resample the training rates and save the bootstrap samples.
    pub fn create_samples(&self) -> Result<()> {
        let dataset = self.load_dataset()?;

        let samples = resample(
            &dataset.train,
            self.cfg.bootstrap.n_samples,
            self.cfg.bootstrap.seed,
        )
        .context("failed to resample training rates")?;
        log::info!("drew {} samples", samples.ensemble.len());

        let samples_file = self.samples_file();
        write_file(&samples_file, &samples)
            .with_context(|| format!("failed to save {samples_file:?}"))?;
        log::info!("saved {samples_file:?}");

        Ok(())
    }

    /// Summarize the model forecasts and save the rate and level reports.
    pub fn summarize_forecasts(&self) -> Result<()> {
        let dataset = self.load_dataset()?;

        let forecast_file = self.forecast_file();
        let output: ModelOutput = read_file(&forecast_file)
            .with_context(|| format!("failed to load {forecast_file:?}"))?;

        let rep_files = self
            .replicate_files()
            .context("failed to collect replicate files")?;
        let mut reps = Vec::with_capacity(rep_files.len());
        for rep_file in &rep_files {
            let rep: TimeSeries =
                read_file(rep_file).with_context(|| format!("failed to load {rep_file:?}"))?;
            reps.push(rep);
        }
        log::info!("loaded {} replicate forecasts", reps.len());

        let reps = Ensemble::new(reps).context("failed to construct replicate ensemble")?;
        let forecast =
            Forecast::new(output.point.clone(), reps).context("failed to construct forecast")?;

        let band = &self.cfg.band;
        let analyzer = Analyzer::new(
            band.lower_q,
            band.upper_q,
            self.cfg.reconstruction.extra_anchor,
        )?;
        let analysis = analyzer
            .analyze(&dataset, &output, &forecast)
            .context("failed to analyze forecast")?;

        let reports_file = self.reports_file();
        write_file(&reports_file, &analysis)
            .with_context(|| format!("failed to save {reports_file:?}"))?;
        log::info!("saved {reports_file:?}");

        Ok(())
    }

    /// Remove generated files.
    pub fn clean_outputs(&self) -> Result<()> {
        for file in [self.samples_file(), self.reports_file()] {
            if file.exists() {
                fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
                log::info!("removed {file:?}");
            }
        }
        Ok(())
    }

    fn load_dataset(&self) -> Result<Dataset> {
        let dataset_file = self.work_dir.join("dataset.msgpack");
        read_file(&dataset_file).with_context(|| format!("failed to load {dataset_file:?}"))
    }

    fn replicate_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.work_dir.join("replicates").join("replicate-*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob replicate files")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read replicate path")?;
        Ok(files)
    }

    fn forecast_file(&self) -> PathBuf {
        self.work_dir.join("forecast.msgpack")
    }

    fn samples_file(&self) -> PathBuf {
        self.work_dir.join("samples.msgpack")
    }

    fn reports_file(&self) -> PathBuf {
        self.work_dir.join("reports.msgpack")
    }
}
