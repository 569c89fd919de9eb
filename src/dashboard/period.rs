//! Period selection for the dashboard.

use std::ops::RangeInclusive;

use time::{Date, Duration};

use crate::Error;

/// How many days the week period covers, including today.
const WEEK_PERIOD_DAYS: i64 = 7;
/// How many days the month period covers, including today.
const MONTH_PERIOD_DAYS: i64 = 30;
/// How many days the year period covers, including today.
const YEAR_PERIOD_DAYS: i64 = 365;

/// The date range a dashboard aggregates over.
///
/// The relative periods are anchored on "today" in the configured local
/// timezone, all ranges are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Just today.
    Today,
    /// The last seven days.
    Week,
    /// The last thirty days.
    #[default]
    Month,
    /// The last 365 days.
    Year,
    /// An explicit start/end pair.
    Custom {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },
}

impl Period {
    /// Build a period from the raw dashboard query parameters.
    ///
    /// An unknown period name falls back to the default (month). A custom
    /// period needs both dates, otherwise it also falls back.
    ///
    /// # Errors
    /// Returns a [Error::InvalidDateRange] if a custom start date comes
    /// after its end date.
    pub fn from_query(
        period: Option<&str>,
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> Result<Self, Error> {
        match period {
            Some("today") => Ok(Period::Today),
            Some("week") => Ok(Period::Week),
            Some("year") => Ok(Period::Year),
            Some("custom") => match (start_date, end_date) {
                (Some(start), Some(end)) if start > end => Err(Error::InvalidDateRange),
                (Some(start), Some(end)) => Ok(Period::Custom { start, end }),
                _ => Ok(Period::default()),
            },
            _ => Ok(Period::Month),
        }
    }

    /// The inclusive date range this period covers, anchored on `today`.
    ///
    /// A relative period of N days ends today and starts N - 1 days earlier,
    /// so the range holds exactly N days.
    pub fn date_range(&self, today: Date) -> RangeInclusive<Date> {
        match self {
            Period::Today => today..=today,
            Period::Week => today - Duration::days(WEEK_PERIOD_DAYS - 1)..=today,
            Period::Month => today - Duration::days(MONTH_PERIOD_DAYS - 1)..=today,
            Period::Year => today - Duration::days(YEAR_PERIOD_DAYS - 1)..=today,
            Period::Custom { start, end } => *start..=*end,
        }
    }
}
