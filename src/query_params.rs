//! Deserialization helpers for HTML form query strings.
//!
//! A GET form submits blank inputs as empty strings, e.g.
//! `?search=&min_amount=`, which must read as "not set" rather than fail to
//! parse.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, de};
use time::{Date, macros::format_description};

/// Deserialize a query parameter where a missing or blank value means `None`.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Deserialize an optional `YYYY-MM-DD` date where a missing or blank value
/// means `None`.
pub(crate) fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let date_format = format_description!("[year]-[month]-[day]");

    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Date::parse(text, &date_format)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod query_params_tests {
    use serde::Deserialize;
    use time::macros::date;

    use super::{empty_as_none, empty_date_as_none};

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct TestQuery {
        #[serde(default, deserialize_with = "empty_as_none")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "empty_date_as_none")]
        date: Option<time::Date>,
    }

    #[test]
    fn blank_values_read_as_none() {
        let query: TestQuery = serde_urlencoded::from_str("amount=&date=").unwrap();

        assert_eq!(query, TestQuery::default());
    }

    #[test]
    fn missing_values_read_as_none() {
        let query: TestQuery = serde_urlencoded::from_str("").unwrap();

        assert_eq!(query, TestQuery::default());
    }

    #[test]
    fn present_values_parse() {
        let query: TestQuery = serde_urlencoded::from_str("amount=12.5&date=2025-06-01").unwrap();

        assert_eq!(query.amount, Some(12.5));
        assert_eq!(query.date, Some(date!(2025 - 06 - 01)));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(serde_urlencoded::from_str::<TestQuery>("amount=abc").is_err());
        assert!(serde_urlencoded::from_str::<TestQuery>("date=01/06/2025").is_err());
    }
}
