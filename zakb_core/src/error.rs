//! Errors of the garbage client.

use thiserror::Error;

/// Everything that can go wrong while fetching and reading the calendar page.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A form, form field or select option is not on the page.
    ///
    /// This is how a changed or unavailable site shows up, and also how a town or street
    /// unknown to the site shows up.
    #[error("form not found: {0}")]
    FormNotFound(String),
    /// The site did not answer in time.
    #[error("request timed out")]
    Timeout,
    /// A cell title is not a date like `Montag, März 4, 2024`.
    #[error("malformed date: {0}")]
    MalformedDate(String),
    /// A matched element lacks an attribute it needs.
    #[error("missing attribute: {0}")]
    MissingAttribute(&'static str),
    /// The configured URL can not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl ClientError {
    /// Whether this error means "no event this time" instead of a failure.
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::FormNotFound(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

/// A collection type code that is none of `R`, `B`, `P` and `G`.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown clearance code: {0:?}")]
pub struct UnknownClearance(pub String);
