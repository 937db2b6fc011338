//! Yield cohorts and the fleet-wide threshold that separates them.
//!
//! A farm is an *outlier* when its yield is strictly below 30% of the average
//! yield across every farm in the fleet, and *normal* when it is strictly
//! above. A farm sitting exactly on the threshold belongs to neither cohort.
//!
//! ```
//! use farm_report_core::{Cohort, fleet_average, yield_threshold};
//! use rust_decimal::Decimal;
//!
//! let yields: Vec<Decimal> = ["8.5", "9.5", "12", "2", "1.5"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//! let average = fleet_average(&yields).unwrap();
//! let threshold = yield_threshold(average);
//! assert_eq!(threshold, "2.01".parse::<Decimal>().unwrap());
//! assert!(Cohort::Outliers.admits(Decimal::TWO, threshold));
//! assert!(Cohort::Normal.admits("8.5".parse::<Decimal>().unwrap(), threshold));
//! ```

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fraction of the fleet average below which a farm is an outlier.
pub const YIELD_THRESHOLD_RATIO: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Which side of the yield threshold a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    /// Farms with `yield < threshold`.
    Outliers,
    /// Farms with `yield > threshold`.
    Normal,
}

impl Cohort {
    /// Map the wire-level `outliers` flag to a cohort.
    #[must_use]
    pub const fn from_outliers_flag(outliers: bool) -> Self {
        if outliers { Self::Outliers } else { Self::Normal }
    }

    /// Whether a farm with `farm_yield` belongs to this cohort.
    #[must_use]
    pub fn admits(self, farm_yield: Decimal, threshold: Decimal) -> bool {
        match self {
            Self::Outliers => farm_yield < threshold,
            Self::Normal => farm_yield > threshold,
        }
    }

    /// SQL comparison operator matching [`Cohort::admits`].
    #[must_use]
    pub const fn sql_operator(self) -> &'static str {
        match self {
            Self::Outliers => "<",
            Self::Normal => ">",
        }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outliers => f.write_str("outliers"),
            Self::Normal => f.write_str("normal"),
        }
    }
}

/// Largest size or yield a single farm may record.
///
/// A fleet of such farms sums well inside `Decimal`'s range.
pub const MAX_MEASURE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Arithmetic mean of `yields`.
///
/// `None` for an empty fleet, or when the total does not fit in a `Decimal`.
#[must_use]
pub fn fleet_average(yields: &[Decimal]) -> Option<Decimal> {
    if yields.is_empty() {
        return None;
    }
    let total = yields
        .iter()
        .try_fold(Decimal::ZERO, |acc, y| acc.checked_add(*y))?;
    total.checked_div(Decimal::from(yields.len()))
}

/// The cohort boundary for a given fleet average.
#[must_use]
pub fn yield_threshold(average: Decimal) -> Decimal {
    average * YIELD_THRESHOLD_RATIO
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fleet() -> Vec<Decimal> {
        ["8.5", "9.5", "12", "2", "1.5"].into_iter().map(dec).collect()
    }

    #[test]
    fn test_ratio_is_three_tenths() {
        assert_eq!(YIELD_THRESHOLD_RATIO, dec("0.3"));
    }

    #[test]
    fn test_average_and_threshold_of_sample_fleet() {
        let average = fleet_average(&fleet()).unwrap();
        assert_eq!(average, dec("6.7"));
        assert_eq!(yield_threshold(average), dec("2.01"));
    }

    #[test]
    fn test_empty_fleet_has_no_average() {
        assert_eq!(fleet_average(&[]), None);
    }

    #[test]
    fn test_overflowing_total_has_no_average() {
        assert_eq!(fleet_average(&[Decimal::MAX, Decimal::MAX]), None);
        assert_eq!(fleet_average(&[Decimal::MAX]), Some(Decimal::MAX));
    }

    #[test]
    fn test_max_measure_fleet_averages_cleanly() {
        let yields = vec![MAX_MEASURE; 10_000];
        assert_eq!(fleet_average(&yields), Some(MAX_MEASURE));
    }

    #[test]
    fn test_sample_fleet_partition() {
        let threshold = yield_threshold(fleet_average(&fleet()).unwrap());
        let outliers: Vec<_> = fleet()
            .into_iter()
            .filter(|y| Cohort::Outliers.admits(*y, threshold))
            .collect();
        let normal: Vec<_> = fleet()
            .into_iter()
            .filter(|y| Cohort::Normal.admits(*y, threshold))
            .collect();
        assert_eq!(outliers, vec![dec("2"), dec("1.5")]);
        assert_eq!(normal, vec![dec("8.5"), dec("9.5"), dec("12")]);
    }

    #[test]
    fn test_boundary_yield_belongs_to_neither_cohort() {
        let threshold = dec("3");
        assert!(!Cohort::Outliers.admits(threshold, threshold));
        assert!(!Cohort::Normal.admits(threshold, threshold));
    }

    #[test]
    fn test_cohorts_are_disjoint() {
        let threshold = dec("2.01");
        for y in ["0", "1", "2.009", "2.01", "2.011", "20"].map(dec) {
            assert!(!(Cohort::Outliers.admits(y, threshold) && Cohort::Normal.admits(y, threshold)));
        }
    }

    #[test]
    fn test_outliers_flag_mapping() {
        assert_eq!(Cohort::from_outliers_flag(true), Cohort::Outliers);
        assert_eq!(Cohort::from_outliers_flag(false), Cohort::Normal);
        assert_eq!(Cohort::Outliers.sql_operator(), "<");
        assert_eq!(Cohort::Normal.sql_operator(), ">");
    }
}
