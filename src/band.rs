use crate::error::{Error, Result};
use crate::series::Ensemble;
use crate::stats::{check_quantiles, mean, quantile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default lower quantile level.
pub const LOWER_Q: f64 = 0.025;
/// Default upper quantile level.
pub const UPPER_Q: f64 = 0.975;

/// Pointwise prediction band of an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBand {
    pub lower_q: f64,
    pub upper_q: f64,
    pub index: Vec<NaiveDate>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub mean: Vec<f64>,
}

impl PredictionBand {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Compute the `lower_q` and `upper_q` quantiles and the mean of the
/// replicates at every index position.
///
/// Quantiles interpolate linearly between order statistics.
///
/// # Errors
/// Returns [`Error::InvalidQuantile`] unless `0 <= lower_q < upper_q <= 1`
/// and [`Error::EmptyEnsemble`] if there are no replicates.
pub fn summarize(ensemble: &Ensemble, lower_q: f64, upper_q: f64) -> Result<PredictionBand> {
    check_quantiles(lower_q, upper_q)?;
    if ensemble.is_empty() {
        return Err(Error::EmptyEnsemble);
    }

    let index = ensemble.index().to_vec();
    let mut band = PredictionBand {
        lower_q,
        upper_q,
        lower: Vec::with_capacity(index.len()),
        upper: Vec::with_capacity(index.len()),
        mean: Vec::with_capacity(index.len()),
        index,
    };
    for vals in (0..).map_while(|pos| ensemble.values_at(pos)) {
        band.lower.push(quantile(&vals, lower_q));
        band.upper.push(quantile(&vals, upper_q));
        band.mean.push(mean(&vals));
    }

    Ok(band)
}
