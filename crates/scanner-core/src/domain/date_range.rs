use std::fmt::{Display, Formatter};

use time::macros::format_description;
use time::{Date, Duration};

use crate::ValidationError;

/// Inclusive calendar-day range used by the earnings calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Date,
    pub to: Date,
}

impl DateRange {
    pub fn new(from: Date, to: Date) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedDateRange {
                from: format_iso_date(from),
                to: format_iso_date(to),
            });
        }
        Ok(Self { from, to })
    }

    /// `day - radius ..= day + radius`.
    pub fn around(day: Date, radius_days: i64) -> Self {
        let radius = Duration::days(radius_days.abs());
        Self {
            from: day.checked_sub(radius).unwrap_or(Date::MIN),
            to: day.checked_add(radius).unwrap_or(Date::MAX),
        }
    }

    pub fn contains(&self, day: Date) -> bool {
        self.from <= day && day <= self.to
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", format_iso_date(self.from), format_iso_date(self.to))
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
