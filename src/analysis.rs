use crate::band::{LOWER_Q, UPPER_Q, summarize};
use crate::error::{Error, Result};
use crate::reconstruct::{ExtraAnchor, Segments, reconstruct};
use crate::report::{LevelReport, RateReport};
use crate::series::{Ensemble, TimeSeries};
use crate::stats::check_quantiles;
use serde::{Deserialize, Serialize};

/// Fitted time-series model of the growth rate.
pub trait RateModel {
    /// In-sample fitted rates, one per training period.
    fn predict(&self) -> Vec<f64>;
}

/// Fitted rates of `model` on the training index.
///
/// # Errors
/// Returns [`Error::LengthMismatch`] if the model does not return exactly one
/// rate per training period.
pub fn fitted_rates<M: RateModel + ?Sized>(model: &M, train: &TimeSeries) -> Result<TimeSeries> {
    let rates = model.predict();
    if rates.len() != train.len() {
        return Err(Error::LengthMismatch {
            what: "fitted rates",
            expected: train.len(),
            actual: rates.len(),
        });
    }
    TimeSeries::new(train.index().to_vec(), rates)
}

/// Observed levels and observed rates over the training and test periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub levels: TimeSeries,
    pub train: TimeSeries,
    pub test: TimeSeries,
}

/// Point forecast of the rate and one forecast per bootstrap replicate,
/// all over the test and extra periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub point: TimeSeries,
    pub replicates: Ensemble,
}

impl Forecast {
    /// Create a forecast, checking that the replicates share the point forecast index.
    pub fn new(point: TimeSeries, replicates: Ensemble) -> Result<Self> {
        if !replicates.is_empty() && replicates.index() != point.index() {
            return Err(Error::IndexMismatch {
                what: "replicate",
                position: 0,
            });
        }
        Ok(Self { point, replicates })
    }
}

/// Rate and level summaries of one forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub rate: RateReport,
    pub level: LevelReport,
}

/// Turns rate forecasts into rate and level prediction bands.
#[derive(Debug, Clone, PartialEq)]
pub struct Analyzer {
    lower_q: f64,
    upper_q: f64,
    anchor: ExtraAnchor,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            lower_q: LOWER_Q,
            upper_q: UPPER_Q,
            anchor: ExtraAnchor::default(),
        }
    }
}

impl Analyzer {
    pub fn new(lower_q: f64, upper_q: f64, anchor: ExtraAnchor) -> Result<Self> {
        check_quantiles(lower_q, upper_q)?;
        Ok(Self {
            lower_q,
            upper_q,
            anchor,
        })
    }

    /// Summarize `forecast` in rate and level space.
    ///
    /// The first forecast periods must coincide with the observed test
    /// periods; any later periods form the extra horizon. Every replicate
    /// is reconstructed into levels the same way as the point forecast.
    pub fn analyze<M: RateModel + ?Sized>(
        &self,
        data: &Dataset,
        model: &M,
        forecast: &Forecast,
    ) -> Result<Analysis> {
        let fitted = fitted_rates(model, &data.train)?;
        let n_test = data.test.len();
        check_test_index(&data.test, &forecast.point)?;

        let base_level = match fitted.first() {
            Some((start, _)) => {
                let (_, level) = data
                    .levels
                    .last_before(start)
                    .ok_or(Error::MissingObservation { date: start })?;
                level
            }
            None => f64::NAN,
        };
        let segments = Segments::split(fitted.clone(), &forecast.point, n_test)?;
        let rec = reconstruct(base_level, &segments, &data.levels, self.anchor)?;
        if let Some(error) = rec.error {
            log::info!("prediction error: {error}");
        }

        let rate_band = summarize(&forecast.replicates, self.lower_q, self.upper_q)?;

        let mut level_reps = Vec::with_capacity(forecast.replicates.len());
        for rep in forecast.replicates.replicates() {
            let segments = Segments::split(TimeSeries::empty(), rep, n_test)?;
            let rep_rec = reconstruct(base_level, &segments, &data.levels, self.anchor)?;
            level_reps.push(rep_rec.forecast_levels());
        }
        let level_band = summarize(&Ensemble::new(level_reps)?, self.lower_q, self.upper_q)?;

        let observed = data.train.concat(&data.test)?;
        let rate = RateReport::new(
            &observed,
            &fitted,
            &forecast.point,
            &rate_band,
            data.train.last(),
        )?;
        let level = LevelReport::new(&data.levels, &rec, &level_band)?;

        Ok(Analysis { rate, level })
    }
}

fn check_test_index(test: &TimeSeries, point: &TimeSeries) -> Result<()> {
    if point.len() < test.len() {
        return Err(Error::LengthMismatch {
            what: "point forecast",
            expected: test.len(),
            actual: point.len(),
        });
    }
    match test.index().iter().zip(point.index()).position(|(a, b)| a != b) {
        Some(pos) => Err(Error::IndexMismatch {
            what: "point forecast date",
            position: pos,
        }),
        None => Ok(()),
    }
}
