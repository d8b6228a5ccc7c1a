use chrono::{Datelike, NaiveDate, Weekday};
use derive_more::{Display, Error};

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CalendarError {
    #[display(fmt = "invalid month {}-{}", year, month)]
    InvalidMonth { year: i32, month: u32 },
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), CalendarError> {
    let invalid = || CalendarError::InvalidMonth { year, month };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    let last = next_first.pred_opt().ok_or_else(invalid)?;

    Ok((first, last))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday-to-Friday days of the month that are not holidays.
pub fn working_days_in_month(
    year: i32,
    month: u32,
    holidays: &[NaiveDate],
) -> Result<u32, CalendarError> {
    let (first, last) = month_bounds(year, month)?;

    let count = first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| !is_weekend(*d) && !holidays.contains(d))
        .count();

    Ok(count as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2).unwrap(), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(month_bounds(2025, 2).unwrap().1, date(2025, 2, 28));
        assert_eq!(month_bounds(2025, 12).unwrap().1, date(2025, 12, 31));
        assert_eq!(
            month_bounds(2025, 13),
            Err(CalendarError::InvalidMonth { year: 2025, month: 13 })
        );
        assert!(month_bounds(2025, 0).is_err());
    }

    #[test]
    fn test_working_days() {
        // January 2026 starts on a Thursday: 22 weekdays
        assert_eq!(working_days_in_month(2026, 1, &[]).unwrap(), 22);
        // February 2026: four full weeks
        assert_eq!(working_days_in_month(2026, 2, &[]).unwrap(), 20);
    }

    #[test]
    fn test_working_days_excludes_holidays_on_weekdays_only() {
        let holidays = [date(2026, 1, 1), date(2026, 1, 3)]; // Thursday, Saturday
        assert_eq!(working_days_in_month(2026, 1, &holidays).unwrap(), 21);
    }
}
