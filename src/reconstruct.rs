//! Reconstruction of level series from per-period growth rates.
//!
//! A level follows `level(t) = level(t - 1) * (1 + rate(t))`. Over the
//! training segment the fitted rates are compounded from a base level. Over
//! the test segment each prediction starts again from the observed level of
//! the previous period, so the result measures the rate model rather than
//! accumulated compounding error. Past the observed data (the extra segment)
//! there is nothing to reset to and predictions compound.

use crate::error::{Error, Result};
use crate::series::TimeSeries;
use crate::stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Level the extra segment is compounded from when a test segment precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraAnchor {
    /// Last predicted test level.
    #[default]
    LastPredicted,
    /// Last observed test level.
    LastObserved,
}

/// Which forecast segments hold data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    TestOnly,
    ExtraOnly,
    Both,
    Neither,
}

impl Horizon {
    pub fn of(test: &TimeSeries, extra: &TimeSeries) -> Self {
        match (test.is_empty(), extra.is_empty()) {
            (false, true) => Self::TestOnly,
            (true, false) => Self::ExtraOnly,
            (false, false) => Self::Both,
            (true, true) => Self::Neither,
        }
    }
}

/// Rates over the training, test and extra segments.
///
/// Segments follow each other in time; any of them may be empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segments {
    train: TimeSeries,
    test: TimeSeries,
    extra: TimeSeries,
}

impl Segments {
    /// Create segments, checking that each one starts after the previous ends.
    pub fn new(train: TimeSeries, test: TimeSeries, extra: TimeSeries) -> Result<Self> {
        check_follows(&train, &test)?;
        check_follows(&test, &extra)?;
        check_follows(&train, &extra)?;
        Ok(Self { train, test, extra })
    }

    /// Create segments from training rates and a forecast over the test and extra periods.
    ///
    /// The first `n_test` forecast periods form the test segment.
    pub fn split(train: TimeSeries, forecast: &TimeSeries, n_test: usize) -> Result<Self> {
        let (test, extra) = forecast.split_at(n_test);
        Self::new(train, test, extra)
    }

    pub fn train(&self) -> &TimeSeries {
        &self.train
    }

    pub fn test(&self) -> &TimeSeries {
        &self.test
    }

    pub fn extra(&self) -> &TimeSeries {
        &self.extra
    }

    pub fn horizon(&self) -> Horizon {
        Horizon::of(&self.test, &self.extra)
    }
}

fn check_follows(prev: &TimeSeries, next: &TimeSeries) -> Result<()> {
    if let (Some((prev, _)), Some((next, _))) = (prev.last(), next.first()) {
        if next <= prev {
            return Err(Error::NonContiguousSegments { prev, next });
        }
    }
    Ok(())
}

/// Fitted and predicted levels with the test-horizon error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    /// Levels over the training index.
    pub fitted: TimeSeries,
    /// Observed anchor level followed by the predicted levels, empty if
    /// there is no forecast horizon.
    pub predicted: TimeSeries,
    /// Root-mean-square error over the test horizon.
    pub error: Option<f64>,
}

impl Reconstruction {
    /// Predicted levels without the observed anchor.
    pub fn forecast_levels(&self) -> TimeSeries {
        let n_anchor = usize::from(!self.predicted.is_empty());
        self.predicted.split_at(n_anchor).1
    }

    /// Test-horizon error.
    ///
    /// # Errors
    /// Returns [`Error::EmptySegment`] if there was no test segment to evaluate.
    pub fn require_error(&self) -> Result<f64> {
        self.error.ok_or(Error::EmptySegment { segment: "test" })
    }
}

/// Reconstruct fitted and predicted levels.
///
/// `base_level` is the level of the period before the training segment and
/// `actual` holds the observed levels. The predicted series starts with the
/// observed level before the forecast horizon.
///
/// # Errors
/// Returns [`Error::MissingObservation`] if `actual` lacks a level needed as
/// anchor or ground truth.
pub fn reconstruct(
    base_level: f64,
    segments: &Segments,
    actual: &TimeSeries,
    anchor: ExtraAnchor,
) -> Result<Reconstruction> {
    let fitted = TimeSeries::new(
        segments.train.index().to_vec(),
        compound(base_level, segments.train.values()),
    )?;

    let (predicted, error) = match segments.horizon() {
        Horizon::TestOnly => predict_test_only(&segments.test, actual)?,
        Horizon::ExtraOnly => predict_extra_only(&segments.extra, actual)?,
        Horizon::Both => predict_both(&segments.test, &segments.extra, actual, anchor)?,
        Horizon::Neither => (TimeSeries::empty(), None),
    };

    Ok(Reconstruction {
        fitted,
        predicted,
        error,
    })
}

type Prediction = (TimeSeries, Option<f64>);

fn predict_test_only(test: &TimeSeries, actual: &TimeSeries) -> Result<Prediction> {
    let (anchor_date, anchor) = observed_before(test, actual)?;
    let steps = one_step_ahead(anchor, test, actual)?;
    let error = stats::rmse(&steps.observed, &steps.predicted)?;
    let predicted = TimeSeries::new(test.index().to_vec(), steps.predicted)?;
    Ok((predicted.prepend(anchor_date, anchor)?, Some(error)))
}

fn predict_extra_only(extra: &TimeSeries, actual: &TimeSeries) -> Result<Prediction> {
    let (anchor_date, anchor) = observed_before(extra, actual)?;
    let predicted = TimeSeries::new(extra.index().to_vec(), compound(anchor, extra.values()))?;
    Ok((predicted.prepend(anchor_date, anchor)?, None))
}

fn predict_both(
    test: &TimeSeries,
    extra: &TimeSeries,
    actual: &TimeSeries,
    anchor: ExtraAnchor,
) -> Result<Prediction> {
    let (anchor_date, test_anchor) = observed_before(test, actual)?;
    let steps = one_step_ahead(test_anchor, test, actual)?;
    let error = stats::rmse(&steps.observed, &steps.predicted)?;

    let extra_anchor = match anchor {
        ExtraAnchor::LastPredicted => steps.predicted.last(),
        ExtraAnchor::LastObserved => steps.observed.last(),
    };
    let extra_anchor = extra_anchor.copied().unwrap_or(test_anchor);

    let mut levels = steps.predicted;
    levels.extend(compound(extra_anchor, extra.values()));
    let index = test.index().iter().chain(extra.index()).copied().collect();
    let predicted = TimeSeries::new(index, levels)?;
    Ok((predicted.prepend(anchor_date, test_anchor)?, Some(error)))
}

/// Compound `anchor` through `rates`, one level per rate.
fn compound(anchor: f64, rates: &[f64]) -> Vec<f64> {
    rates
        .iter()
        .scan(anchor, |level, rate| {
            *level *= 1.0 + rate;
            Some(*level)
        })
        .collect()
}

struct Steps {
    predicted: Vec<f64>,
    observed: Vec<f64>,
}

/// Apply each rate to the observed level of the previous period.
fn one_step_ahead(anchor: f64, rates: &TimeSeries, actual: &TimeSeries) -> Result<Steps> {
    let mut prev = anchor;
    let mut steps = Steps {
        predicted: Vec::with_capacity(rates.len()),
        observed: Vec::with_capacity(rates.len()),
    };
    for (date, rate) in rates.iter() {
        steps.predicted.push(prev * (1.0 + rate));
        prev = actual.get(date).ok_or(Error::MissingObservation { date })?;
        steps.observed.push(prev);
    }
    Ok(steps)
}

/// Observed level of the period before `segment` starts.
fn observed_before(segment: &TimeSeries, actual: &TimeSeries) -> Result<(NaiveDate, f64)> {
    let (start, _) = segment.first().ok_or(Error::EmptySegment { segment: "forecast" })?;
    actual
        .last_before(start)
        .ok_or(Error::MissingObservation { date: start })
}
