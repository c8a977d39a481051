//! Descriptive statistics over nullable numeric columns.
//!
//! All functions ignore nulls and non-finite values, the way column
//! summaries of the statement tables are computed. They return `None` when
//! too few usable observations remain.

/// Minimum variance treated as non-zero in higher-moment statistics.
pub const MIN_VARIANCE_THRESHOLD: f64 = 1e-20;

/// Collects the finite values of a nullable column.
pub fn finite_values(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect()
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (N-1 denominator).
pub fn variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    Some(values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64)
}

/// Sample standard deviation (N-1 denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q` is clamped to `[0, 1]`. Matches the default interpolation of
/// NumPy's `nanquantile`.
///
/// # Examples
///
/// ```
/// use mktcap_traits::stats::quantile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile(&values, 0.5), Some(2.5));
/// ```
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Median (50% quantile).
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Bias-corrected sample skewness (adjusted Fisher-Pearson), needs 3 values.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    let m2 = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / nf;
    if m2 < MIN_VARIANCE_THRESHOLD {
        return Some(0.0);
    }
    let m3 = values.iter().map(|x| (x - m).powi(3)).sum::<f64>() / nf;
    Some((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * m3 / m2.powf(1.5))
}

/// Bias-corrected excess kurtosis, needs 4 values.
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let m = mean(values)?;
    let nf = n as f64;
    let s2 = variance(values)?;
    if s2 < MIN_VARIANCE_THRESHOLD {
        return Some(0.0);
    }
    let fourth = values.iter().map(|x| (x - m).powi(4)).sum::<f64>();
    let lead = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));
    let tail = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
    Some(lead * fourth / s2.powi(2) - tail)
}
