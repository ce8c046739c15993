use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy)]
pub struct BucketOptions {
    pub exclude_weekends: bool,
    pub exclude_fixed_holidays: bool,
    pub include_month_total: bool,
}

impl Default for BucketOptions {
    fn default() -> Self {
        Self {
            exclude_weekends: true,
            exclude_fixed_holidays: true,
            include_month_total: true,
        }
    }
}

/// Per-week counts of qualifying meal days for one school month.
///
/// `weekly[0]` holds days before the month's first Monday; `weekly[1..=5]`
/// are ordinary Monday-start weeks. `month_total` counts every retained
/// day, bucket 0 included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBuckets {
    pub weekly: [u32; 6],
    pub month_total: Option<u32>,
}

impl WeekBuckets {
    pub fn week(&self, index: usize) -> u32 {
        self.weekly[index]
    }
}

/// Partitions a month's meal-service dates into Monday-start week buckets.
///
/// Weekend and fixed-holiday filtering happens before bucketing. Dates in
/// the immediately following month are lookahead context: they count into
/// bucket 5 only when the Monday of their week falls inside the target
/// month, and are discarded otherwise (the next month's bucketing owns
/// them). Dates further afield are an error, never guessed at.
pub fn bucket_meal_days(
    year: i32,
    month: u32,
    meal_dates: &BTreeSet<NaiveDate>,
    options: BucketOptions,
) -> Result<WeekBuckets, DomainError> {
    let next = calendar::next_month(year, month)?;
    let mut weekly = [0u32; 6];

    for &date in meal_dates {
        if options.exclude_weekends && calendar::is_weekend(date) {
            continue;
        }
        if options.exclude_fixed_holidays && calendar::is_fixed_holiday(date) {
            continue;
        }

        let ym = (date.year(), date.month());
        if ym == (year, month) {
            // In-month dates never resolve past week 5.
            let index = calendar::resolve_week_index(year, month, date)?;
            weekly[index as usize] += 1;
        } else if ym == next {
            let monday = calendar::week_monday(date);
            if (monday.year(), monday.month()) == (year, month) {
                weekly[5] += 1;
            }
        } else {
            return Err(DomainError::MixedMonths { date, year, month });
        }
    }

    let month_total = options
        .include_month_total
        .then(|| weekly.iter().sum::<u32>());

    Ok(WeekBuckets { weekly, month_total })
}
