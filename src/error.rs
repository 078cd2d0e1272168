// src/error.rs
use thiserror::Error;

/// Failures seen while fetching or evaluating the feed.
///
/// `Fetch` and `Parse` abort a whole cycle; `TimestampParse` and
/// `ValueConversion` only ever drop a single entry.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or HTTP-status failure.
    #[error("feed fetch failed: {0}")]
    Fetch(String),

    /// Malformed feed body.
    #[error("feed body malformed: {0}")]
    Parse(String),

    #[error("unparseable timestamp {raw:?}")]
    TimestampParse { raw: String },

    #[error("cannot convert {field} value {raw:?}")]
    ValueConversion { field: &'static str, raw: String },
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Fetch(e.to_string())
    }
}

impl From<quick_xml::de::DeError> for FeedError {
    fn from(e: quick_xml::de::DeError) -> Self {
        FeedError::Parse(e.to_string())
    }
}
