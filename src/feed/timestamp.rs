// src/feed/timestamp.rs
use chrono::NaiveDateTime;

use crate::error::FeedError;

const FEED_TS_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Parse a feed `pubDate` such as `Sat, 18 Oct 2026 14:02:11 +0200`.
///
/// The day-name token and the zone suffix are dropped and the remainder is
/// read as naive local time. The feed publishes in local time with the local
/// offset, so comparing naive values keeps the ordering the feed intends.
pub fn parse_feed_timestamp(raw: &str) -> Result<NaiveDateTime, FeedError> {
    let err = || FeedError::TimestampParse {
        raw: raw.to_string(),
    };

    let s = raw.trim();
    let s = match s.split_once(',') {
        Some((_day, rest)) => rest.trim(),
        None => s,
    };
    let (body, zone) = s.rsplit_once(' ').ok_or_else(err)?;
    if !is_zone_token(zone) {
        return Err(err());
    }
    NaiveDateTime::parse_from_str(body.trim(), FEED_TS_FORMAT).map_err(|_| err())
}

/// `+0200`, `-0500`, `GMT`, `UT`, `CEST` ...
fn is_zone_token(tok: &str) -> bool {
    let bytes = tok.as_bytes();
    match bytes.first() {
        Some(b'+') | Some(b'-') => bytes.len() == 5 && bytes[1..].iter().all(u8::is_ascii_digit),
        Some(_) => bytes.iter().all(u8::is_ascii_alphabetic),
        None => false,
    }
}
