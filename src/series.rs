//! Date-indexed series and ensembles of replicates.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered sequence of `(date, value)` pairs.
///
/// The index is strictly increasing and has the same length as the values.
/// Both invariants are checked on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeries")]
pub struct TimeSeries {
    index: Vec<NaiveDate>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTimeSeries {
    index: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TryFrom<RawTimeSeries> for TimeSeries {
    type Error = Error;

    fn try_from(raw: RawTimeSeries) -> Result<Self> {
        Self::new(raw.index, raw.values)
    }
}

impl TimeSeries {
    /// Create a series, checking length and ordering of the index.
    pub fn new(index: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if values.len() != index.len() {
            return Err(Error::LengthMismatch {
                what: "values",
                expected: index.len(),
                actual: values.len(),
            });
        }
        check_ordered(&index)?;
        Ok(Self { index, values })
    }

    /// Create an empty series.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(date, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// Value observed exactly at `date`.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.index
            .binary_search(&date)
            .ok()
            .map(|pos| self.values[pos])
    }

    /// Last observation strictly before `date`.
    pub fn last_before(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        let pos = self.index.partition_point(|&d| d < date);
        pos.checked_sub(1)
            .map(|pos| (self.index[pos], self.values[pos]))
    }

    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.iter().last()
    }

    /// Split into the first `n` observations and the rest.
    ///
    /// `n` is clamped to the series length.
    pub fn split_at(&self, n: usize) -> (Self, Self) {
        let n = n.min(self.len());
        let head = Self {
            index: self.index[..n].to_vec(),
            values: self.values[..n].to_vec(),
        };
        let tail = Self {
            index: self.index[n..].to_vec(),
            values: self.values[n..].to_vec(),
        };
        (head, tail)
    }

    /// Replace the index, keeping the values.
    pub fn with_index(self, index: Vec<NaiveDate>) -> Result<Self> {
        Self::new(index, self.values)
    }

    /// Insert an observation before the first one.
    pub fn prepend(self, date: NaiveDate, value: f64) -> Result<Self> {
        let mut index = Vec::with_capacity(self.len() + 1);
        index.push(date);
        index.extend(self.index);
        let mut values = Vec::with_capacity(index.len());
        values.push(value);
        values.extend(self.values);
        Self::new(index, values)
    }

    /// Concatenate two series, the second starting after the first ends.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        let index = self.index.iter().chain(&other.index).copied().collect();
        let values = self.values.iter().chain(&other.values).copied().collect();
        Self::new(index, values)
    }
}

fn check_ordered(index: &[NaiveDate]) -> Result<()> {
    match index.windows(2).position(|pair| pair[0] >= pair[1]) {
        Some(pos) => Err(Error::UnorderedIndex { position: pos + 1 }),
        None => Ok(()),
    }
}

/// Collection of replicates sharing one index.
///
/// Replicate order carries no meaning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawEnsemble")]
pub struct Ensemble {
    replicates: Vec<TimeSeries>,
}

#[derive(Deserialize)]
struct RawEnsemble {
    replicates: Vec<TimeSeries>,
}

impl TryFrom<RawEnsemble> for Ensemble {
    type Error = Error;

    fn try_from(raw: RawEnsemble) -> Result<Self> {
        Self::new(raw.replicates)
    }
}

impl Ensemble {
    /// Create an ensemble, checking that every replicate shares the index of the first.
    pub fn new(replicates: Vec<TimeSeries>) -> Result<Self> {
        if let Some((first, rest)) = replicates.split_first() {
            if let Some(pos) = rest.iter().position(|rep| rep.index != first.index) {
                return Err(Error::IndexMismatch {
                    what: "replicate",
                    position: pos + 1,
                });
            }
        }
        Ok(Self { replicates })
    }

    /// Number of replicates.
    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    /// Shared index, empty if there are no replicates.
    pub fn index(&self) -> &[NaiveDate] {
        self.replicates
            .first()
            .map(|rep| rep.index())
            .unwrap_or_default()
    }

    pub fn replicates(&self) -> &[TimeSeries] {
        &self.replicates
    }

    /// Values of every replicate at one index position, `None` if `pos` is
    /// past the shared index.
    pub fn values_at(&self, pos: usize) -> Option<Vec<f64>> {
        self.replicates
            .iter()
            .map(|rep| rep.values.get(pos).copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn series(vals: &[f64]) -> TimeSeries {
        let index = (0..vals.len() as u32).map(|i| date(2000, i + 1)).collect();
        TimeSeries::new(index, vals.to_vec()).unwrap()
    }

    #[test]
    fn rejects_unordered_index() {
        let err = TimeSeries::new(vec![date(2000, 2), date(2000, 1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::UnorderedIndex { position: 1 }));

        let err = TimeSeries::new(vec![date(2000, 1), date(2000, 1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::UnorderedIndex { .. }));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TimeSeries::new(vec![date(2000, 1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn lookups() {
        let ts = series(&[1.0, 2.0, 3.0]);
        assert_eq!(ts.get(date(2000, 2)), Some(2.0));
        assert_eq!(ts.get(date(2001, 2)), None);
        assert_eq!(ts.last_before(date(2000, 3)), Some((date(2000, 2), 2.0)));
        assert_eq!(ts.last_before(date(2000, 1)), None);
        assert_eq!(ts.last_before(date(2010, 1)), Some((date(2000, 3), 3.0)));
    }

    #[test]
    fn split_and_concat() {
        let ts = series(&[1.0, 2.0, 3.0]);
        let (head, tail) = ts.split_at(1);
        assert_eq!(head.values(), &[1.0]);
        assert_eq!(tail.values(), &[2.0, 3.0]);
        assert_eq!(head.concat(&tail).unwrap(), ts);
        assert!(tail.concat(&head).is_err());

        let (all, none) = ts.split_at(10);
        assert_eq!(all, ts);
        assert!(none.is_empty());
    }

    #[test]
    fn prepend_keeps_order() {
        let (_, tail) = series(&[1.0, 2.0, 3.0]).split_at(1);
        let ts = tail.prepend(date(2000, 1), 9.0).unwrap();
        assert_eq!(ts.values(), &[9.0, 2.0, 3.0]);
        assert!(ts.prepend(date(2000, 5), 0.0).is_err());
    }

    #[test]
    fn ensemble_requires_shared_index() {
        let a = series(&[1.0, 2.0]);
        let b = a.clone().with_index(vec![date(2001, 1), date(2001, 2)]).unwrap();
        let err = Ensemble::new(vec![a.clone(), a.clone(), b]).unwrap_err();
        assert!(matches!(err, Error::IndexMismatch { position: 2, .. }));

        let ens = Ensemble::new(vec![a.clone(), series(&[3.0, 4.0])]).unwrap();
        assert_eq!(ens.len(), 2);
        assert_eq!(ens.index(), a.index());
        assert_eq!(ens.values_at(1), Some(vec![2.0, 4.0]));
        assert_eq!(ens.values_at(2), None);
    }

    #[test]
    fn empty_ensemble_has_empty_index() {
        let ens = Ensemble::new(Vec::new()).unwrap();
        assert!(ens.is_empty());
        assert!(ens.index().is_empty());
    }
}
