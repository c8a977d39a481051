//! Circular statistics on a periodic scale.
//!
//! Values in `[low, high)` are mapped onto the unit circle, so the two ends
//! of the range coincide: on a `[0, 365)` day-of-year scale, day 1 and
//! day 365 are one day apart.

use mktcap_traits::{MktcapError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Upper bound of the day-of-year scale.
pub const DAYS_IN_YEAR: f64 = 365.0;

/// Decimal places kept by [`CircularScale::distance`].
const DISTANCE_DECIMALS: i32 = 3;

/// A validated periodic scale `[low, high)`.
///
/// Deserializing goes through [`CircularScale::new`], so a stored scale
/// with an empty or non-finite range is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScale")]
pub struct CircularScale {
    low: f64,
    high: f64,
}

impl CircularScale {
    /// Creates a scale, rejecting empty or non-finite ranges.
    ///
    /// # Errors
    ///
    /// Returns [`MktcapError::DegenerateRange`] unless `low < high` and both
    /// bounds are finite.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(MktcapError::DegenerateRange { low, high });
        }
        Ok(Self { low, high })
    }

    /// The day-of-year scale `[0, 365)`.
    pub const fn days_of_year() -> Self {
        Self {
            low: 0.0,
            high: DAYS_IN_YEAR,
        }
    }

    /// Lower bound.
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound.
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Length of one full cycle.
    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    /// Largest possible distance between two points: half a cycle.
    pub fn max_distance(&self) -> f64 {
        self.span() / 2.0
    }

    fn to_angle(&self, value: f64) -> f64 {
        (value - self.low) / self.span() * TAU
    }

    /// Shortest distance between two values around the cycle.
    ///
    /// The result lies in `[0, span / 2]` and is rounded to three decimals.
    ///
    /// # Examples
    ///
    /// ```
    /// use mktcap_periods::CircularScale;
    ///
    /// let days = CircularScale::days_of_year();
    /// assert_eq!(days.distance(1.0, 365.0), 1.0);
    /// assert_eq!(days.distance(0.0, 182.5), 182.5);
    /// ```
    pub fn distance(&self, v1: f64, v2: f64) -> f64 {
        let (a1, a2) = (self.to_angle(v1), self.to_angle(v2));
        // Unit vectors at nearly the same angle can produce a dot product
        // slightly above 1, outside the domain of acos.
        let dot = (a1.cos() * a2.cos() + a1.sin() * a2.sin()).clamp(-1.0, 1.0);
        let distance = dot.acos() * self.span() / TAU;
        round_to(distance, DISTANCE_DECIMALS)
    }

    /// Circular mean of a set of values, mapped back into `[low, high)`.
    ///
    /// Returns `None` for an empty slice. Non-finite values are ignored.
    pub fn mean(&self, values: &[f64]) -> Option<f64> {
        let (mut sin_sum, mut cos_sum, mut count) = (0.0, 0.0, 0usize);
        for value in values.iter().filter(|v| v.is_finite()) {
            let angle = self.to_angle(*value);
            sin_sum += angle.sin();
            cos_sum += angle.cos();
            count += 1;
        }
        if count == 0 {
            return None;
        }

        let n = count as f64;
        let angle = (sin_sum / n).atan2(cos_sum / n).rem_euclid(TAU);
        let mapped = angle * self.span() / TAU + self.low;
        if mapped >= self.high {
            Some(self.low)
        } else {
            Some(mapped)
        }
    }
}

#[derive(Deserialize)]
struct RawScale {
    low: f64,
    high: f64,
}

impl TryFrom<RawScale> for CircularScale {
    type Error = MktcapError;

    fn try_from(raw: RawScale) -> Result<Self> {
        Self::new(raw.low, raw.high)
    }
}

impl Default for CircularScale {
    fn default() -> Self {
        Self::days_of_year()
    }
}

/// Shortest distance between `v1` and `v2` on the cycle `[low, high)`.
///
/// # Errors
///
/// Returns [`MktcapError::DegenerateRange`] when `low >= high`.
///
/// # Examples
///
/// ```
/// use mktcap_periods::circular_distance;
///
/// assert_eq!(circular_distance(0.0, 365.0, 0.0, 365.0).unwrap(), 0.0);
/// assert!(circular_distance(1.0, 2.0, 5.0, 5.0).is_err());
/// ```
pub fn circular_distance(v1: f64, v2: f64, low: f64, high: f64) -> Result<f64> {
    Ok(CircularScale::new(low, high)?.distance(v1, v2))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_to_self_is_zero() {
        let scale = CircularScale::days_of_year();
        for value in [0.0, 1.0, 90.5, 182.5, 364.9] {
            assert_eq!(scale.distance(value, value), 0.0);
        }
    }

    #[test]
    fn test_range_ends_coincide() {
        assert_eq!(circular_distance(0.0, 365.0, 0.0, 365.0).unwrap(), 0.0);
        assert_eq!(circular_distance(10.0, 20.0, 10.0, 20.0).unwrap(), 0.0);
    }

    #[test]
    fn test_wraparound_across_year_end() {
        assert_relative_eq!(circular_distance(1.0, 365.0, 0.0, 365.0).unwrap(), 1.0);
        assert_relative_eq!(circular_distance(360.0, 5.0, 0.0, 365.0).unwrap(), 10.0);
    }

    #[test]
    fn test_antipodal_points_are_maximally_distant() {
        assert_relative_eq!(
            circular_distance(0.0, 182.5, 0.0, 365.0).unwrap(),
            182.5
        );
        let scale = CircularScale::new(10.0, 30.0).unwrap();
        assert_relative_eq!(scale.distance(10.0, 20.0), scale.max_distance());
    }

    #[test]
    fn test_distance_is_symmetric() {
        let scale = CircularScale::days_of_year();
        let pairs = [(3.0, 300.0), (45.0, 46.5), (100.0, 280.0), (364.0, 2.0)];
        for (a, b) in pairs {
            assert_eq!(scale.distance(a, b), scale.distance(b, a));
        }
    }

    #[test]
    fn test_distance_is_rounded() {
        let scale = CircularScale::days_of_year();
        let d = scale.distance(0.0, 10.12345);
        assert_relative_eq!(d, 10.123);
    }

    #[test]
    fn test_nonzero_low_bound() {
        // Distances are measured on the span, independent of the offset.
        let scale = CircularScale::new(100.0, 200.0).unwrap();
        assert_relative_eq!(scale.distance(105.0, 195.0), 10.0);
        assert!(scale.distance(120.0, 170.0) <= scale.max_distance());
    }

    #[test]
    fn test_degenerate_range_rejected() {
        assert!(matches!(
            CircularScale::new(5.0, 5.0),
            Err(MktcapError::DegenerateRange { .. })
        ));
        assert!(CircularScale::new(10.0, 0.0).is_err());
        assert!(CircularScale::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_mean_wraps_around_year_end() {
        let scale = CircularScale::days_of_year();
        let mean = scale.mean(&[360.0, 10.0]).unwrap();
        // 360 and 10 are 15 days away from day 0 on either side.
        assert!(scale.distance(mean, 0.0) < 1e-6);
    }

    #[test]
    fn test_mean_of_clustered_values() {
        let scale = CircularScale::days_of_year();
        let mean = scale.mean(&[100.0, 110.0, 120.0]).unwrap();
        assert_relative_eq!(mean, 110.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mean_of_empty_is_none() {
        let scale = CircularScale::days_of_year();
        assert!(scale.mean(&[]).is_none());
        assert!(scale.mean(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_mean_stays_in_range() {
        let scale = CircularScale::new(0.0, 12.0).unwrap();
        let mean = scale.mean(&[11.5, 0.25]).unwrap();
        assert!((0.0..12.0).contains(&mean));
    }
}
