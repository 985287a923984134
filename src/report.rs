//! Tabular summaries and chart data for rate and level forecasts.
//!
//! Charts are plain data: a set of lines and one shaded band, ready to be
//! handed to whatever draws them.

use crate::band::PredictionBand;
use crate::error::{Error, Result};
use crate::reconstruct::Reconstruction;
use crate::series::TimeSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Header of the rate table value column.
pub const RATE_HEADER: &str = "Predicted Growth Rate";
/// Header of the level table value column.
pub const LEVEL_HEADER: &str = "Level Value";
/// Header of the band mean column.
pub const MEAN_HEADER: &str = "Mean (Prediction interval)";

/// One row of a prediction-interval table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRow {
    pub date: NaiveDate,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    pub mean: f64,
}

/// Point forecast next to its prediction band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub columns: Vec<String>,
    pub rows: Vec<BandRow>,
}

impl BandTable {
    /// Join `point` with `band`, which must share its index.
    pub fn new(value_header: &str, point: &TimeSeries, band: &PredictionBand) -> Result<Self> {
        if band.len() != point.len() {
            return Err(Error::LengthMismatch {
                what: "prediction band",
                expected: point.len(),
                actual: band.len(),
            });
        }
        if let Some(pos) = point.index().iter().zip(&band.index).position(|(a, b)| a != b) {
            return Err(Error::IndexMismatch {
                what: "prediction band date",
                position: pos,
            });
        }

        let columns = vec![
            "Date".to_string(),
            value_header.to_string(),
            interval_header(band.lower_q),
            interval_header(band.upper_q),
            MEAN_HEADER.to_string(),
        ];
        let rows = point
            .iter()
            .enumerate()
            .map(|(pos, (date, value))| BandRow {
                date,
                value,
                lower: band.lower[pos],
                upper: band.upper[pos],
                mean: band.mean[pos],
            })
            .collect();

        Ok(Self { columns, rows })
    }
}

fn interval_header(q: f64) -> String {
    // Round away binary noise such as 97.49999999999999.
    let pct = (q * 100.0 * 1e6).round() / 1e6;
    format!("Prediction interval ({pct}%)")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    /// Solid line with point markers.
    Marked,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub label: String,
    pub style: LineStyle,
    pub series: TimeSeries,
}

impl Line {
    fn new(label: &str, style: LineStyle, series: TimeSeries) -> Self {
        Self {
            label: label.to_string(),
            style,
            series,
        }
    }
}

/// Shaded area between two bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shade {
    pub index: Vec<NaiveDate>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Single time-series figure with a shaded uncertainty band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub lines: Vec<Line>,
    pub shade: Shade,
}

impl Chart {
    fn new(mut lines: Vec<Line>, band: &PredictionBand) -> Result<Self> {
        let mean = TimeSeries::new(band.index.clone(), band.mean.clone())?;
        lines.push(Line::new(MEAN_HEADER, LineStyle::Dashed, mean));
        let shade = Shade {
            index: band.index.clone(),
            lower: band.lower.clone(),
            upper: band.upper.clone(),
        };
        Ok(Self { lines, shade })
    }
}

/// Growth-rate forecast summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateReport {
    pub table: BandTable,
    pub chart: Chart,
}

impl RateReport {
    /// Build the rate table and chart.
    ///
    /// `observed` holds the observed rates over the training and test
    /// periods, `train_end` the last observed training rate, which the
    /// predicted line starts from.
    pub fn new(
        observed: &TimeSeries,
        fitted: &TimeSeries,
        point: &TimeSeries,
        band: &PredictionBand,
        train_end: Option<(NaiveDate, f64)>,
    ) -> Result<Self> {
        let table = BandTable::new(RATE_HEADER, point, band)?;

        let predicted = match train_end {
            Some((date, rate)) => point.clone().prepend(date, rate)?,
            None => point.clone(),
        };
        let lines = vec![
            Line::new("Observed", LineStyle::Marked, observed.clone()),
            Line::new("Fitted", LineStyle::Marked, fitted.clone()),
            Line::new("Predicted", LineStyle::Marked, predicted),
        ];
        let chart = Chart::new(lines, band)?;

        Ok(Self { table, chart })
    }
}

/// Level forecast summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub table: BandTable,
    pub chart: Chart,
    /// Root-mean-square error over the test horizon, if there was one.
    pub error: Option<f64>,
}

impl LevelReport {
    /// Build the level table and chart.
    ///
    /// The first observed level only serves as base of the fitted levels and
    /// is left out of the chart.
    pub fn new(actual: &TimeSeries, rec: &Reconstruction, band: &PredictionBand) -> Result<Self> {
        let table = BandTable::new(LEVEL_HEADER, &rec.forecast_levels(), band)?;

        let (_, actual) = actual.split_at(1);
        let lines = vec![
            Line::new("Actual", LineStyle::Marked, actual),
            Line::new("Fitted", LineStyle::Marked, rec.fitted.clone()),
            Line::new("Predicted", LineStyle::Marked, rec.predicted.clone()),
        ];
        let chart = Chart::new(lines, band)?;

        Ok(Self {
            table,
            chart,
            error: rec.error,
        })
    }
}
