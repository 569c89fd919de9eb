//! Resolves canonical timezone names to UTC offsets.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Look up the current UTC offset for a canonical timezone name such as
/// "Pacific/Auckland". Returns [None] if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the given canonical timezone.
///
/// # Errors
/// Returns a [Error::InvalidTimezoneError] if the name is not a known
/// timezone.
pub fn today_local(canonical_timezone: &str) -> Result<Date, Error> {
    get_local_offset(canonical_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}
