use approx::assert_relative_eq;
use bootband::{
    Ensemble, Error, ExtraAnchor, Segments, TimeSeries, reconstruct, resample, rmse, summarize,
};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn daily(start: u64, vals: &[f64]) -> TimeSeries {
    let origin = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    let index = (0..vals.len() as u64)
        .map(|i| origin + Days::new(start + i))
        .collect();
    TimeSeries::new(index, vals.to_vec()).unwrap()
}

proptest! {
    #[test]
    fn resample_preserves_length_and_index(
        vals in prop::collection::vec(-1.0f64..1.0, 8..80),
        count in 1usize..12,
        seed in any::<u64>(),
    ) {
        let series = daily(0, &vals);
        let samples = resample(&series, count, Some(seed)).unwrap();
        prop_assert_eq!(samples.ensemble.len(), count);
        for rep in samples.ensemble.replicates() {
            prop_assert_eq!(rep.len(), series.len());
            prop_assert_eq!(rep.index(), series.index());
            prop_assert!(rep.values().iter().all(|val| vals.contains(val)));
        }
    }

    #[test]
    fn zero_training_rates_keep_base_level(base in 1.0f64..1e6, n_train in 0usize..30) {
        let segments = Segments::new(
            daily(0, &vec![0.0; n_train]),
            TimeSeries::empty(),
            TimeSeries::empty(),
        )
        .unwrap();
        let rec =
            reconstruct(base, &segments, &TimeSeries::empty(), ExtraAnchor::default()).unwrap();
        prop_assert_eq!(rec.fitted.len(), n_train);
        prop_assert!(rec.fitted.values().iter().all(|&level| level == base));
    }

    #[test]
    fn band_lies_within_replicate_range(
        reps in prop::collection::vec(prop::collection::vec(-100.0f64..100.0, 3), 1..30),
        lower_q in 0.0f64..0.5,
        upper_q in 0.5f64..1.0,
    ) {
        prop_assume!(lower_q < upper_q);
        let reps: Vec<_> = reps.iter().map(|vals| daily(0, vals)).collect();
        let ens = Ensemble::new(reps).unwrap();
        let band = summarize(&ens, lower_q, upper_q).unwrap();
        for pos in 0..band.len() {
            let vals = ens.values_at(pos).unwrap();
            let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
            let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(min <= band.lower[pos]);
            prop_assert!(band.lower[pos] <= band.upper[pos]);
            prop_assert!(band.upper[pos] <= max);
            prop_assert!(min <= band.mean[pos] && band.mean[pos] <= max);
        }
    }
}

#[test]
fn compounding_example() {
    let none = TimeSeries::empty();
    let segments = Segments::new(daily(1, &[0.1, -0.05]), none.clone(), none).unwrap();
    let rec = reconstruct(100.0, &segments, &TimeSeries::empty(), ExtraAnchor::default()).unwrap();
    assert_relative_eq!(rec.fitted.values()[0], 110.0, epsilon = 1e-9);
    assert_relative_eq!(rec.fitted.values()[1], 104.5, epsilon = 1e-9);
}

#[test]
fn one_step_ahead_example() {
    let actual = daily(0, &[100.0, 110.0, 120.0]);
    let none = TimeSeries::empty();
    let segments = Segments::new(none.clone(), daily(1, &[0.05, 0.10]), none).unwrap();
    let rec = reconstruct(100.0, &segments, &actual, ExtraAnchor::default()).unwrap();
    let levels = rec.forecast_levels();
    assert_relative_eq!(levels.values()[0], 105.0, epsilon = 1e-9);
    assert_relative_eq!(levels.values()[1], 121.0, epsilon = 1e-9);
}

#[test]
fn extra_horizon_example() {
    let actual = daily(0, &[100.0]);
    let none = TimeSeries::empty();
    let segments = Segments::new(none.clone(), none, daily(1, &[0.1, 0.1])).unwrap();
    let rec = reconstruct(100.0, &segments, &actual, ExtraAnchor::default()).unwrap();
    let levels = rec.forecast_levels();
    assert_relative_eq!(levels.values()[0], 110.0, epsilon = 1e-9);
    assert_relative_eq!(levels.values()[1], 121.0, epsilon = 1e-9);
    assert!(rec.error.is_none());
}

#[test]
fn rmse_example() {
    let err = rmse(&[100.0, 110.0], &[105.0, 108.0]).unwrap();
    assert_relative_eq!(err, 3.808, epsilon = 1e-3);
    assert!(matches!(
        rmse(&[100.0, 110.0], &[105.0]),
        Err(Error::LengthMismatch { .. })
    ));
}

#[test]
fn quantile_band_example() {
    let reps = [1.0, 2.0, 3.0, 4.0].iter().map(|&val| daily(0, &[val])).collect();
    let band = summarize(&Ensemble::new(reps).unwrap(), 0.025, 0.975).unwrap();
    assert_relative_eq!(band.mean[0], 2.5);
    assert!(band.lower[0] <= band.mean[0] && band.mean[0] <= band.upper[0]);
    assert!(matches!(
        summarize(&Ensemble::new(vec![daily(0, &[1.0])]).unwrap(), 0.975, 0.025),
        Err(Error::InvalidQuantile { .. })
    ));
}
