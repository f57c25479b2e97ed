//! Data-freshness grading.
//!
//! Every downstream risk decision is weighted by how stale its inputs are.
//! Grading is pure: two dates in, a grade and a decision weight out.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Staleness label for a dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessGrade {
    /// Under one day old.
    Fresh,
    /// One to seven days old, inclusive.
    Recent,
    /// Over seven and up to thirty days old.
    Stale,
    /// Over thirty days old; carries no decision weight.
    Expired,
}

impl FreshnessGrade {
    /// Grade an observation against a reference date.
    ///
    /// Branches are checked in order: an age of exactly 7 days is Recent,
    /// exactly 30 is Stale.
    pub fn grade(observation: NaiveDate, reference: NaiveDate) -> Self {
        let age_days = (reference - observation).num_days();
        if age_days < 1 {
            FreshnessGrade::Fresh
        } else if age_days <= 7 {
            FreshnessGrade::Recent
        } else if age_days <= 30 {
            FreshnessGrade::Stale
        } else {
            FreshnessGrade::Expired
        }
    }

    /// Decision-weight multiplier for this grade.
    pub fn weight(&self) -> Decimal {
        match self {
            FreshnessGrade::Fresh | FreshnessGrade::Recent => Decimal::ONE,
            FreshnessGrade::Stale => Decimal::new(5, 1), // 0.5
            FreshnessGrade::Expired => Decimal::ZERO,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessGrade::Fresh => "fresh",
            FreshnessGrade::Recent => "recent",
            FreshnessGrade::Stale => "stale",
            FreshnessGrade::Expired => "expired",
        }
    }
}

/// A record carrying an observation date, gradable for freshness.
pub trait Dated {
    fn observation_date(&self) -> NaiveDate;
}

/// A record with its freshness grade and decision weight attached.
#[derive(Debug, Clone, Serialize)]
pub struct Graded<R> {
    pub record: R,
    pub grade: FreshnessGrade,
    pub weight: Decimal,
}

/// Grade every record against `reference`; when `exclude_expired` is set,
/// Expired records are dropped from the result.
///
/// Deterministic and side-effect free: identical inputs produce identical
/// output, in input order.
pub fn filter_graded<R: Dated>(
    records: Vec<R>,
    reference: NaiveDate,
    exclude_expired: bool,
) -> Vec<Graded<R>> {
    records
        .into_iter()
        .filter_map(|record| {
            let grade = FreshnessGrade::grade(record.observation_date(), reference);
            if exclude_expired && grade == FreshnessGrade::Expired {
                return None;
            }
            Some(Graded {
                record,
                grade,
                weight: grade.weight(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
    }

    struct Obs {
        label: &'static str,
        observed: NaiveDate,
    }

    impl Dated for Obs {
        fn observation_date(&self) -> NaiveDate {
            self.observed
        }
    }

    #[test]
    fn test_grade_boundaries() {
        let reference = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let aged = |days: i64| reference - chrono::Duration::days(days);

        assert_eq!(FreshnessGrade::grade(aged(0), reference), FreshnessGrade::Fresh);
        assert_eq!(FreshnessGrade::grade(aged(1), reference), FreshnessGrade::Recent);
        assert_eq!(FreshnessGrade::grade(aged(7), reference), FreshnessGrade::Recent);
        assert_eq!(FreshnessGrade::grade(aged(8), reference), FreshnessGrade::Stale);
        assert_eq!(FreshnessGrade::grade(aged(30), reference), FreshnessGrade::Stale);
        assert_eq!(FreshnessGrade::grade(aged(31), reference), FreshnessGrade::Expired);
        assert_eq!(FreshnessGrade::grade(aged(365), reference), FreshnessGrade::Expired);
    }

    #[test]
    fn test_future_observation_grades_fresh() {
        let reference = day(10);
        assert_eq!(
            FreshnessGrade::grade(day(12), reference),
            FreshnessGrade::Fresh
        );
    }

    #[test]
    fn test_weights() {
        assert_eq!(FreshnessGrade::Fresh.weight(), Decimal::ONE);
        assert_eq!(FreshnessGrade::Recent.weight(), Decimal::ONE);
        assert_eq!(FreshnessGrade::Stale.weight(), Decimal::new(5, 1));
        assert_eq!(FreshnessGrade::Expired.weight(), Decimal::ZERO);
    }

    #[test]
    fn test_filter_drops_expired_by_default() {
        let reference = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let records = vec![
            Obs { label: "today", observed: reference },
            Obs { label: "last_week", observed: reference - chrono::Duration::days(7) },
            Obs { label: "last_month", observed: reference - chrono::Duration::days(20) },
            Obs { label: "ancient", observed: reference - chrono::Duration::days(90) },
        ];

        let graded = filter_graded(records, reference, true);
        assert_eq!(graded.len(), 3);
        assert_eq!(graded[0].record.label, "today");
        assert_eq!(graded[0].grade, FreshnessGrade::Fresh);
        assert_eq!(graded[1].grade, FreshnessGrade::Recent);
        assert_eq!(graded[2].grade, FreshnessGrade::Stale);
        assert_eq!(graded[2].weight, Decimal::new(5, 1));
    }

    #[test]
    fn test_filter_keeps_expired_when_asked() {
        let reference = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let records = vec![Obs {
            label: "ancient",
            observed: reference - chrono::Duration::days(90),
        }];

        let graded = filter_graded(records, reference, false);
        assert_eq!(graded.len(), 1);
        assert_eq!(graded[0].grade, FreshnessGrade::Expired);
        assert_eq!(graded[0].weight, Decimal::ZERO);
    }
}
