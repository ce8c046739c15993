use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::DomainError;

/// Fixed-date public holidays (month, day) on which no school lunch is
/// served: New Year's Day, Independence Movement Day, Children's Day,
/// Memorial Day, Liberation Day, National Foundation Day, Hangul Day,
/// Christmas. Lunar-calendar holidays are not covered.
const FIXED_HOLIDAYS: [(u32, u32); 8] = [
    (1, 1),
    (3, 1),
    (5, 5),
    (6, 6),
    (8, 15),
    (10, 3),
    (10, 9),
    (12, 25),
];

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::MonthOutOfRange(month));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(DomainError::MonthOutOfRange(month))
}

/// The earliest Monday on or after the first day of the month.
pub fn first_monday(year: i32, month: u32) -> Result<NaiveDate, DomainError> {
    let first = first_of_month(year, month)?;
    let offset = first.weekday().num_days_from_monday();
    if offset == 0 {
        Ok(first)
    } else {
        Ok(first + Duration::days((7 - offset) as i64))
    }
}

/// The Monday of the week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn next_month(year: i32, month: u32) -> Result<(i32, u32), DomainError> {
    first_of_month(year, month)?;
    if month == 12 {
        Ok((year + 1, 1))
    } else {
        Ok((year, month + 1))
    }
}

fn prev_month(year: i32, month: u32) -> Result<(i32, u32), DomainError> {
    first_of_month(year, month)?;
    if month == 1 {
        Ok((year - 1, 12))
    } else {
        Ok((year, month - 1))
    }
}

/// Week-of-month index for `date` under the Monday-start convention.
///
/// Returns 0 for dates before the month's first Monday (the trailing
/// partial week of the previous month that still falls inside this
/// calendar month). Otherwise returns `days_since_first_monday / 7 + 1`.
/// The raw index may exceed 5 for lookahead dates in the following
/// month; routing those is the bucketer's responsibility, not this
/// resolver's.
///
/// Rejects dates more than one calendar month away from the target.
pub fn resolve_week_index(year: i32, month: u32, date: NaiveDate) -> Result<u32, DomainError> {
    let target = (year, month);
    let ym = (date.year(), date.month());
    if ym != target && ym != prev_month(year, month)? && ym != next_month(year, month)? {
        return Err(DomainError::DateOutsideWindow { date, year, month });
    }

    let monday = first_monday(year, month)?;
    let diff = (date - monday).num_days();
    if diff < 0 {
        Ok(0)
    } else {
        Ok((diff / 7) as u32 + 1)
    }
}

/// Half-open date range a caller should fetch so that the month's last
/// week resolves even when it spills into the next month: the 1st of
/// the month through (exclusive) the 8th of the following month.
pub fn lookahead_window(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DomainError> {
    let start = first_of_month(year, month)?;
    let (ny, nm) = next_month(year, month)?;
    let end = first_of_month(ny, nm)? + Duration::days(7);
    Ok((start, end))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_fixed_holiday(date: NaiveDate) -> bool {
    FIXED_HOLIDAYS.contains(&(date.month(), date.day()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_monday_of_june_2025_is_the_second() {
        // June 1 2025 is a Sunday.
        assert_eq!(first_monday(2025, 6).unwrap(), date(2025, 6, 2));
    }

    #[test]
    fn first_monday_when_month_starts_on_monday() {
        // September 1 2025 is a Monday.
        assert_eq!(first_monday(2025, 9).unwrap(), date(2025, 9, 1));
    }

    #[test]
    fn sunday_before_first_monday_resolves_to_zero() {
        assert_eq!(resolve_week_index(2025, 6, date(2025, 6, 1)).unwrap(), 0);
    }

    #[test]
    fn first_monday_resolves_to_week_one() {
        assert_eq!(resolve_week_index(2025, 6, date(2025, 6, 2)).unwrap(), 1);
    }

    #[test]
    fn last_monday_of_june_2025_resolves_to_week_five() {
        assert_eq!(resolve_week_index(2025, 6, date(2025, 6, 30)).unwrap(), 5);
    }

    #[test]
    fn lookahead_date_may_resolve_past_week_five() {
        // July 7 2025 is five full weeks after June 2.
        assert_eq!(resolve_week_index(2025, 6, date(2025, 7, 7)).unwrap(), 6);
    }

    #[test]
    fn index_is_monotonic_within_the_month() {
        let mut last = 0;
        for day in 1..=30 {
            let idx = resolve_week_index(2025, 6, date(2025, 6, day)).unwrap();
            assert!(idx >= last, "week index went backwards at June {day}");
            last = idx;
        }
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert_eq!(
            resolve_week_index(2025, 13, date(2025, 6, 1)),
            Err(DomainError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn date_two_months_away_is_rejected() {
        let stray = date(2025, 9, 1);
        assert_eq!(
            resolve_week_index(2025, 6, stray),
            Err(DomainError::DateOutsideWindow {
                date: stray,
                year: 2025,
                month: 6,
            })
        );
    }

    #[test]
    fn adjacent_months_wrap_across_year_boundaries() {
        // December 2025 accepts January 2026 lookahead dates.
        assert!(resolve_week_index(2025, 12, date(2026, 1, 3)).is_ok());
        assert!(resolve_week_index(2026, 1, date(2025, 12, 31)).is_ok());
    }

    #[test]
    fn week_monday_snaps_back_to_monday() {
        assert_eq!(week_monday(date(2025, 7, 3)), date(2025, 6, 30));
        assert_eq!(week_monday(date(2025, 6, 30)), date(2025, 6, 30));
    }

    #[test]
    fn lookahead_window_spans_into_next_month() {
        let (start, end) = lookahead_window(2025, 6).unwrap();
        assert_eq!(start, date(2025, 6, 1));
        assert_eq!(end, date(2025, 7, 8));
    }

    #[test]
    fn memorial_day_is_a_fixed_holiday() {
        assert!(is_fixed_holiday(date(2025, 6, 6)));
        assert!(!is_fixed_holiday(date(2025, 6, 5)));
    }

    #[test]
    fn weekends_are_detected() {
        assert!(is_weekend(date(2025, 6, 1)));
        assert!(is_weekend(date(2025, 6, 7)));
        assert!(!is_weekend(date(2025, 6, 2)));
    }
}
