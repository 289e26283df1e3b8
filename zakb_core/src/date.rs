//! Parsing of the German date titles of the calendar cells.
//!
//! A cell title looks like `Montag, März 4, 2024`: a weekday, the German month name, the day
//! and the year.

use std::{borrow::Cow, sync::LazyLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::{Captures, Regex};

use crate::error::ClientError;

static FORMAT: &str = "%B %d, %Y";

static MONTHS: [(&str, &str); 12] = [
    ("Januar", "January"),
    ("Februar", "February"),
    ("März", "March"),
    ("April", "April"),
    ("Mai", "May"),
    ("Juni", "June"),
    ("Juli", "July"),
    ("August", "August"),
    ("September", "September"),
    ("Oktober", "October"),
    ("November", "November"),
    ("Dezember", "December"),
];

static MONTH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = MONTHS.iter().map(|(german, _)| *german).collect();
    Regex::new(&format!(r"\b({})\b", names.join("|"))).unwrap()
});

/// Replace whole-word German month names by their English names.
pub fn replace_month(date_string: &str) -> Cow<'_, str> {
    MONTH_REGEX.replace_all(date_string, |captures: &Captures| {
        MONTHS
            .iter()
            .find(|(german, _)| *german == &captures[1])
            .map_or_else(|| captures[1].to_owned(), |(_, english)| (*english).to_owned())
    })
}

/// Parse a cell title into midnight of that day.
pub fn parse(date_string: &str) -> Result<NaiveDateTime, ClientError> {
    let replaced = replace_month(date_string);
    let Some((_weekday, date)) = replaced.split_once(", ") else {
        return Err(ClientError::MalformedDate(date_string.to_owned()));
    };
    let date = NaiveDate::parse_from_str(date, FORMAT)
        .map_err(|err| ClientError::MalformedDate(format!("{date_string}: {err}")))?;
    Ok(date.and_time(NaiveTime::MIN))
}

/// Read a naive date time as wall clock time in `timezone`.
///
/// An ambiguous wall clock time resolves to its earlier instant.
pub fn localize(naive: NaiveDateTime, timezone: Tz) -> Result<DateTime<Utc>, ClientError> {
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            ClientError::MalformedDate(format!("{naive} does not exist in {}", timezone.name()))
        })
}

/// Parse a cell title and localize it, see [`parse`] and [`localize`].
pub fn parse_localized(date_string: &str, timezone: Tz) -> Result<DateTime<Utc>, ClientError> {
    localize(parse(date_string)?, timezone)
}
