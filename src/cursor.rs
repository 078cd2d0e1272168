//! # Feed cursor
//! Remembers the newest entry timestamp already seen so each cycle only
//! surfaces entries published after it. The first cycle of a session only
//! primes the cursor: the backlog present at startup is never surfaced.

use chrono::NaiveDateTime;

use crate::feed::{parse_feed_timestamp, FeedEntry};

/// An entry newer than the cursor, with its parsed timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub entry: FeedEntry,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CursorAdvance {
    pub cold_start: bool,
    /// Oldest first.
    pub new_entries: Vec<NewEntry>,
    /// Entries dropped for an unparseable timestamp.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedCursor {
    last_seen: Option<NaiveDateTime>,
}

impl FeedCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<NaiveDateTime> {
        self.last_seen
    }

    pub fn is_cold(&self) -> bool {
        self.last_seen.is_none()
    }

    /// Consume one fetched batch (newest-first, as delivered by the feed).
    pub fn advance(&mut self, entries: &[FeedEntry]) -> CursorAdvance {
        let mut out = CursorAdvance::default();

        let Some(boundary) = self.last_seen else {
            out.cold_start = true;
            let newest = entries
                .iter()
                .filter_map(|e| parse_feed_timestamp(&e.published).ok())
                .max();
            if let Some(ts) = newest {
                tracing::info!(target: "p2000", cursor = %ts, "cold start, last datestamp read");
                self.last_seen = Some(ts);
            } else {
                tracing::debug!(target: "p2000", "cold start on empty feed; cursor stays unset");
            }
            return out;
        };

        let mut high_water = boundary;
        for entry in entries.iter().rev() {
            let ts = match parse_feed_timestamp(&entry.published) {
                Ok(ts) => ts,
                Err(e) => {
                    tracing::warn!(target: "p2000", error = %e, title = %entry.title, "skipping entry");
                    out.skipped += 1;
                    continue;
                }
            };
            if ts <= boundary {
                continue;
            }
            high_water = high_water.max(ts);
            out.new_entries.push(NewEntry {
                entry: entry.clone(),
                timestamp: ts,
            });
        }

        if high_water > boundary {
            tracing::debug!(target: "p2000", from = %boundary, to = %high_water, "cursor advanced");
        }
        self.last_seen = Some(high_water);
        out
    }
}
