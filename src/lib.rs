//! Bootstrap prediction bands for growth-rate forecasts and for the level
//! series the rates compound into.
//!
//! The library resamples a rate series with a circular block bootstrap,
//! reconstructs levels from fitted and forecast rates, and summarizes
//! ensembles of replicate forecasts into pointwise quantile bands.

pub mod analysis;
pub mod band;
pub mod bootstrap;
pub mod config;
pub mod data;
pub mod error;
pub mod manager;
pub mod reconstruct;
pub mod report;
pub mod series;
pub mod stats;

pub use analysis::{Analysis, Analyzer, Dataset, Forecast, RateModel, fitted_rates};
pub use band::{PredictionBand, summarize};
pub use bootstrap::{Samples, resample};
pub use error::{Error, Result};
pub use reconstruct::{ExtraAnchor, Horizon, Reconstruction, Segments, reconstruct};
pub use series::{Ensemble, TimeSeries};
pub use stats::rmse;
