use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the pure calendar/bucketing/eligibility core.
///
/// Every variant is an invalid argument of some shape; the core never
/// clamps or silently drops bad input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),

    #[error("date {date} is outside the accepted window around {year}-{month:02}")]
    DateOutsideWindow {
        date: NaiveDate,
        year: i32,
        month: u32,
    },

    #[error("meal date {date} belongs to neither {year}-{month:02} nor the month after it")]
    MixedMonths {
        date: NaiveDate,
        year: i32,
        month: u32,
    },

    #[error("{field} must be non-negative, got {value}")]
    NegativeCount { field: &'static str, value: i32 },
}
