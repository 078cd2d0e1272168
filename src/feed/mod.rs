// src/feed/mod.rs
pub mod rss;
pub mod source;
pub mod timestamp;
pub mod types;

pub use rss::parse_feed;
pub use source::{FixtureFeedSource, HttpFeedSource};
pub use timestamp::parse_feed_timestamp;
pub use types::{CacheValidators, FeedEntry, FeedSource, FetchOutcome, ParsedFeed};

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("p2000_fetch_total", "Feed fetch attempts.");
        describe_counter!(
            "p2000_fetch_errors_total",
            "Feed fetch/parse failures that aborted a cycle."
        );
        describe_counter!(
            "p2000_not_modified_total",
            "Fetches answered with 304 Not Modified."
        );
        describe_counter!("p2000_entries_parsed_total", "Entries parsed from the feed.");
        describe_counter!(
            "p2000_entries_new_total",
            "Entries newer than the cursor."
        );
        describe_counter!(
            "p2000_entries_discarded_total",
            "New entries dropped by a filter, labelled by reason."
        );
        describe_counter!(
            "p2000_events_published_total",
            "Cycles that replaced the current event."
        );
        describe_histogram!("p2000_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "p2000_last_cycle_ts",
            "Unix ts when the last successful cycle finished."
        );
    });
}

/// Normalize display text: collapse whitespace, cap at 500 chars.
///
/// Input comes from the XML reader with entities already decoded, so a
/// literal `<` or `&` in the result is feed content and is kept as is.
pub fn normalize_text(s: &str) -> String {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    let mut out = re_ws.replace_all(s, " ").trim().to_string();

    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }
    out
}
