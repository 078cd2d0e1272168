//! # Feed session
//! One subscription's state across update cycles: cursor, cache validators
//! and the held current event. A cycle either commits all of its changes or,
//! when fetching/parsing fails, none of them.

use metrics::{counter, gauge};

use crate::cursor::FeedCursor;
use crate::error::FeedError;
use crate::feed::{CacheValidators, FeedSource, FetchOutcome, ParsedFeed};
use crate::filter::{CurrentEvent, EventFilter};

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// First batch of the session; cursor primed, nothing surfaced.
    ColdStart,
    NotModified,
    /// Nothing new passed the filters; the held event is untouched.
    NoChange { new_entries: usize },
    /// The held event was replaced.
    Updated(CurrentEvent),
}

impl CycleOutcome {
    pub fn updated(&self) -> Option<&CurrentEvent> {
        match self {
            CycleOutcome::Updated(ev) => Some(ev),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct FeedSession {
    name: String,
    cursor: FeedCursor,
    filter: EventFilter,
    validators: CacheValidators,
    current: Option<CurrentEvent>,
}

impl FeedSession {
    pub fn new(name: impl Into<String>, filter: EventFilter) -> Self {
        Self {
            name: name.into(),
            cursor: FeedCursor::new(),
            filter,
            validators: CacheValidators::default(),
            current: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> Option<&CurrentEvent> {
        self.current.as_ref()
    }

    pub fn cursor(&self) -> &FeedCursor {
        &self.cursor
    }

    pub fn validators(&self) -> &CacheValidators {
        &self.validators
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Fetch through `source` and run one cycle.
    ///
    /// On `Err` the session is exactly as it was before the call.
    pub async fn poll(&mut self, source: &dyn FeedSource) -> Result<CycleOutcome, FeedError> {
        crate::feed::ensure_metrics_described();
        counter!("p2000_fetch_total").increment(1);

        let outcome = match source.fetch(&self.validators).await {
            Ok(FetchOutcome::NotModified) => {
                counter!("p2000_not_modified_total").increment(1);
                tracing::debug!(target: "p2000", session = %self.name, "feed not modified");
                CycleOutcome::NotModified
            }
            Ok(FetchOutcome::Parsed(feed)) => self.ingest(feed),
            Err(e) => {
                tracing::warn!(
                    target: "p2000",
                    session = %self.name,
                    source = source.name(),
                    error = %e,
                    "cycle aborted"
                );
                return Err(e);
            }
        };

        gauge!("p2000_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);
        Ok(outcome)
    }

    /// Run one cycle on an already-parsed feed.
    pub fn ingest(&mut self, feed: ParsedFeed) -> CycleOutcome {
        let ParsedFeed {
            entries,
            validators,
        } = feed;
        tracing::debug!(target: "p2000", session = %self.name, entries = entries.len(), "entries downloaded");

        let mut cursor = self.cursor;
        let adv = cursor.advance(&entries);

        let outcome = if adv.cold_start {
            CycleOutcome::ColdStart
        } else {
            counter!("p2000_entries_new_total").increment(adv.new_entries.len() as u64);
            match self.filter.apply(&adv.new_entries) {
                Some(ev) => CycleOutcome::Updated(ev),
                None => CycleOutcome::NoChange {
                    new_entries: adv.new_entries.len(),
                },
            }
        };

        // commit
        self.cursor = cursor;
        self.validators = validators;
        if let CycleOutcome::Updated(ev) = &outcome {
            counter!("p2000_events_published_total").increment(1);
            tracing::info!(
                target: "p2000",
                session = %self.name,
                message = %ev.message,
                time = %ev.timestamp,
                distance_m = ev.distance_m,
                "new emergency event"
            );
            self.current = Some(ev.clone());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedEntry;
    use crate::filter::{FeedVariant, FilterCriteria};
    use crate::geo::GeoPoint;

    fn session() -> FeedSession {
        let criteria = FilterCriteria::new(GeoPoint::new(52.3731, 4.8926)).with_radius(Some(5000.0));
        FeedSession::new("test", EventFilter::new(FeedVariant::LiveP2000, criteria))
    }

    fn entry(published: &str, title: &str) -> FeedEntry {
        FeedEntry {
            published: published.into(),
            title: title.into(),
            geo_lat: Some("52.375".into()),
            geo_long: Some("4.89".into()),
            ..Default::default()
        }
    }

    fn feed(entries: Vec<FeedEntry>) -> ParsedFeed {
        ParsedFeed {
            entries,
            validators: CacheValidators {
                etag: Some("\"v1\"".into()),
                last_modified: None,
            },
        }
    }

    #[test]
    fn validators_are_remembered_for_next_fetch() {
        let mut s = session();
        s.ingest(feed(vec![entry("Sat, 18 Oct 2026 10:00:00 +0200", "a")]));
        assert_eq!(s.validators().etag.as_deref(), Some("\"v1\""));
    }

    #[test]
    fn filtered_out_batch_keeps_previous_event() {
        let mut s = session();
        s.ingest(feed(vec![entry("Sat, 18 Oct 2026 10:00:00 +0200", "old")]));
        let out = s.ingest(feed(vec![entry("Sat, 18 Oct 2026 10:01:00 +0200", "near")]));
        assert_eq!(out.updated().map(|e| e.message.as_str()), Some("near"));

        let mut far = entry("Sat, 18 Oct 2026 10:02:00 +0200", "far");
        far.geo_lat = Some("53.2".into());
        let out = s.ingest(feed(vec![far]));
        assert_eq!(out, CycleOutcome::NoChange { new_entries: 1 });
        assert_eq!(s.current().map(|e| e.message.as_str()), Some("near"));
        // the far entry still moved the boundary
        assert_eq!(
            s.cursor().last_seen().map(|t| t.to_string()),
            Some("2026-10-18 10:02:00".to_string())
        );
    }
}
