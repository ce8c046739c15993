use serde::Serialize;

use crate::bucket::WeekBuckets;
use crate::error::DomainError;

const WEEK_FIELDS: [&str; 5] = ["week1", "week2", "week3", "week4", "week5"];

/// Correct-answer or required-day counts for one user-month or one
/// school-month: weeks 1 through 5 plus the month total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodCounts {
    pub weeks: [i32; 5],
    pub month_total: i32,
}

impl PeriodCounts {
    /// Collapses bucketer output into the shape the evaluator compares.
    /// Bucket 0 days carry no weekly requirement but still count toward
    /// the month total.
    pub fn from_buckets(buckets: &WeekBuckets) -> Self {
        let mut weeks = [0i32; 5];
        for (i, slot) in weeks.iter_mut().enumerate() {
            *slot = buckets.week(i + 1) as i32;
        }
        Self {
            weeks,
            month_total: buckets.month_total.unwrap_or(0) as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChampionStatus {
    pub weeks: [bool; 5],
    pub month_champion: bool,
}

impl ChampionStatus {
    pub fn any(&self) -> bool {
        self.month_champion || self.weeks.iter().any(|&w| w)
    }
}

/// Champion status per period: strict equality between required and
/// achieved counts. Exceeding the requirement is not success, and a zero
/// requirement never awards champion status.
pub fn evaluate(
    criteria: &PeriodCounts,
    achieved: &PeriodCounts,
) -> Result<ChampionStatus, DomainError> {
    validate_non_negative(criteria)?;
    validate_non_negative(achieved)?;

    let mut weeks = [false; 5];
    for i in 0..5 {
        weeks[i] = criteria.weeks[i] > 0 && criteria.weeks[i] == achieved.weeks[i];
    }
    let month_champion =
        criteria.month_total > 0 && criteria.month_total == achieved.month_total;

    Ok(ChampionStatus {
        weeks,
        month_champion,
    })
}

fn validate_non_negative(counts: &PeriodCounts) -> Result<(), DomainError> {
    for (i, &value) in counts.weeks.iter().enumerate() {
        if value < 0 {
            return Err(DomainError::NegativeCount {
                field: WEEK_FIELDS[i],
                value,
            });
        }
    }
    if counts.month_total < 0 {
        return Err(DomainError::NegativeCount {
            field: "month_total",
            value: counts.month_total,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(weeks: [i32; 5], month_total: i32) -> PeriodCounts {
        PeriodCounts { weeks, month_total }
    }

    #[test]
    fn exact_match_awards_champion() {
        let criteria = counts([4, 5, 5, 5, 1], 20);
        let status = evaluate(&criteria, &criteria).unwrap();
        assert_eq!(status.weeks, [true; 5]);
        assert!(status.month_champion);
    }

    #[test]
    fn exceeding_the_requirement_is_not_champion() {
        let criteria = counts([4, 0, 0, 0, 0], 4);
        let achieved = counts([5, 0, 0, 0, 0], 4);
        let status = evaluate(&criteria, &achieved).unwrap();
        assert!(!status.weeks[0]);
        assert!(status.month_champion);
    }

    #[test]
    fn zero_requirement_never_awards_champion() {
        let criteria = counts([4, 0, 0, 0, 0], 4);
        let achieved = counts([4, 0, 7, 0, 0], 4);
        let status = evaluate(&criteria, &achieved).unwrap();
        assert!(status.weeks[0]);
        assert!(!status.weeks[1]);
        assert!(!status.weeks[2]);
    }

    #[test]
    fn falling_short_is_not_champion() {
        let criteria = counts([4, 5, 0, 0, 0], 9);
        let achieved = counts([4, 3, 0, 0, 0], 7);
        let status = evaluate(&criteria, &achieved).unwrap();
        assert!(status.weeks[0]);
        assert!(!status.weeks[1]);
        assert!(!status.month_champion);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let criteria = counts([4, 0, 0, 0, 0], 4);
        let achieved = counts([0, 0, -1, 0, 0], 0);
        assert_eq!(
            evaluate(&criteria, &achieved),
            Err(DomainError::NegativeCount {
                field: "week3",
                value: -1,
            })
        );
    }

    #[test]
    fn bucket_zero_feeds_the_month_total_only() {
        use crate::bucket::WeekBuckets;

        let buckets = WeekBuckets {
            weekly: [2, 4, 5, 5, 5, 1],
            month_total: Some(22),
        };
        let counts = PeriodCounts::from_buckets(&buckets);
        assert_eq!(counts.weeks, [4, 5, 5, 5, 1]);
        assert_eq!(counts.month_total, 22);
    }
}
