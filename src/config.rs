use crate::band::{LOWER_Q, UPPER_Q};
use crate::reconstruct::ExtraAnchor;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Analysis configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub band: BandConfig,
    #[serde(default)]
    pub reconstruction: ReconstructionConfig,
}

/// Bootstrap parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Number of bootstrap samples.
    pub n_samples: usize,
    /// Random seed (optional). Without it every run draws different samples.
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_samples: 100,
            seed: None,
        }
    }
}

/// Prediction band parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BandConfig {
    /// Lower quantile level.
    pub lower_q: f64,
    /// Upper quantile level.
    pub upper_q: f64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            lower_q: LOWER_Q,
            upper_q: UPPER_Q,
        }
    }
}

/// Level reconstruction parameters.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconstructionConfig {
    /// Level the extra horizon compounds from after a test horizon.
    #[serde(default)]
    pub extra_anchor: ExtraAnchor,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded. Missing sections take their defaults.
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
        check_num(self.bootstrap.n_samples, 1..100_000).context("invalid number of samples")?;

        check_num(self.band.lower_q, 0.0..=1.0).context("invalid lower quantile")?;
        check_num(self.band.upper_q, 0.0..=1.0).context("invalid upper quantile")?;
        if self.band.lower_q >= self.band.upper_q {
            bail!("lower quantile must be smaller than upper quantile");
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
