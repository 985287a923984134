use crate::analysis::RateModel;
use crate::series::TimeSeries;
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Output of the external model fit: in-sample fitted rates and the point
/// forecast over the test and extra periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub fitted: Vec<f64>,
    pub point: TimeSeries,
}

impl RateModel for ModelOutput {
    fn predict(&self) -> Vec<f64> {
        self.fitted.clone()
    }
}

/// Read a MessagePack-encoded value from a file.
pub fn read_file<T: DeserializeOwned, P: AsRef<Path>>(file: P) -> Result<T> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let value = decode::from_read(&mut reader).context("failed to deserialize value")?;
    Ok(value)
}

/// Write a value to a file, MessagePack-encoded with named fields.
pub fn write_file<T: Serialize, P: AsRef<Path>>(file: P, value: &T) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write_named(&mut writer, value).context("failed to serialize value")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
