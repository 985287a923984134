use crate::error::{Error, Result};

/// Arithmetic mean, ignoring NaN values.
///
/// Returns NaN if no value remains.
pub fn mean(vals: &[f64]) -> f64 {
    let (sum, n_vals) = vals
        .iter()
        .filter(|val| !val.is_nan())
        .fold((0.0, 0usize), |(sum, n_vals), &val| (sum + val, n_vals + 1));
    if n_vals == 0 {
        return f64::NAN;
    }
    sum / n_vals as f64
}

/// Empirical quantile with linear interpolation between order statistics, ignoring NaN values.
///
/// For sorted values `x` of length `n` the quantile is
/// `x[j] + (h - j) * (x[j + 1] - x[j])` with `h = (n - 1) * q` and `j = floor(h)`.
/// `q` is clamped to `[0, 1]`.
pub fn quantile(vals: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<_> = vals.iter().copied().filter(|val| !val.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q.clamp(0.0, 1.0))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let j = h.floor() as usize;
    match sorted.get(j + 1) {
        Some(&next) => sorted[j] + (h - j as f64) * (next - sorted[j]),
        None => sorted[j],
    }
}

/// Check quantile levels satisfy `0 <= lower < upper <= 1`.
pub fn check_quantiles(lower: f64, upper: f64) -> Result<()> {
    let valid = (0.0..=1.0).contains(&lower) && (0.0..=1.0).contains(&upper) && lower < upper;
    if !valid {
        return Err(Error::InvalidQuantile { lower, upper });
    }
    Ok(())
}

/// Root-mean-square error between observed and predicted values.
///
/// Returns NaN for empty inputs.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if predicted.len() != actual.len() {
        return Err(Error::LengthMismatch {
            what: "predicted values",
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Ok(f64::NAN);
    }
    let sq_err_sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok((sq_err_sum / actual.len() as f64).sqrt())
}

/// Sample autocovariance at `lag` of already demeaned values, normalized by the full length.
pub fn autocovariance(eps: &[f64], lag: usize) -> f64 {
    let n_vals = eps.len();
    if lag >= n_vals {
        return 0.0;
    }
    dot(&eps[lag..], &eps[..n_vals - lag]) / n_vals as f64
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
