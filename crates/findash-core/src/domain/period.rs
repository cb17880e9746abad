use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A reporting interval identified by its end date.
///
/// This is the period half of the (symbol, statement, period) upsert key;
/// ordering follows the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalPeriod(Date);

impl FiscalPeriod {
    /// Parse a `YYYY-MM-DD` reporting date.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        Date::parse(trimmed, DATE_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidPeriod {
                value: trimmed.to_string(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn end_date(self) -> Date {
        self.0
    }
}

impl Display for FiscalPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl TryFrom<String> for FiscalPeriod {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FiscalPeriod> for String {
    fn from(value: FiscalPeriod) -> Self {
        value.to_string()
    }
}

/// Inclusive period bounds for store queries; `None` leaves a side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodRange {
    pub from: Option<FiscalPeriod>,
    pub to: Option<FiscalPeriod>,
}

impl PeriodRange {
    pub const fn all() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    pub const fn between(from: FiscalPeriod, to: FiscalPeriod) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, period: FiscalPeriod) -> bool {
        if let Some(from) = self.from {
            if period < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if period > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_round_trips_iso_dates() {
        let period = FiscalPeriod::parse("2023-09-30").expect("period should parse");
        assert_eq!(period.to_string(), "2023-09-30");
    }

    #[test]
    fn rejects_non_dates() {
        assert!(FiscalPeriod::parse("FY2023").is_err());
        assert!(FiscalPeriod::parse("2023-13-01").is_err());
        assert!(FiscalPeriod::parse("").is_err());
    }

    #[test]
    fn ordering_follows_the_calendar() {
        let q3 = FiscalPeriod::parse("2023-09-30").expect("parse");
        let q4 = FiscalPeriod::parse("2023-12-31").expect("parse");
        assert!(q3 < q4);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let from = FiscalPeriod::parse("2022-12-31").expect("parse");
        let to = FiscalPeriod::parse("2023-12-31").expect("parse");
        let range = PeriodRange::between(from, to);

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(FiscalPeriod::parse("2022-09-30").expect("parse")));
        assert!(PeriodRange::all().contains(from));
    }
}
