// src/filter/mod.rs
//! # Event filter
//! Pure per-entry predicates that turn a batch of new feed entries into at
//! most one [`CurrentEvent`]. Predicates run in a fixed order and the first
//! failing one discards the entry; the batch keeps going.
//!
//! Order: region → discipline → location/radius → capcode → contains-text.

pub mod variant;

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use metrics::counter;
use serde::Serialize;

use crate::cursor::NewEntry;
use crate::feed::FeedEntry;
use crate::geo::GeoPoint;
pub use variant::{Discipline, FeedVariant};
use variant::{discipline_name, region_name, strip_leading_zeros};

/// User-configured matching criteria; fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Region codes without leading zeros. Empty = any region.
    pub regions: BTreeSet<String>,
    /// Discipline codes. Empty = any discipline.
    pub disciplines: BTreeSet<String>,
    pub capcodes: BTreeSet<String>,
    pub contains_text: Option<String>,
    /// `None` disables distance filtering.
    pub radius_meters: Option<f64>,
    pub allow_no_location: bool,
    pub reference_point: GeoPoint,
}

impl FilterCriteria {
    /// Criteria that accept every located entry.
    pub fn new(reference_point: GeoPoint) -> Self {
        Self {
            regions: BTreeSet::new(),
            disciplines: BTreeSet::new(),
            capcodes: BTreeSet::new(),
            contains_text: None,
            radius_meters: None,
            allow_no_location: false,
            reference_point,
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.regions = normalized_codes(regions);
        self
    }

    pub fn with_disciplines<I, S>(mut self, disciplines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.disciplines = normalized_codes(disciplines);
        self
    }

    pub fn with_capcodes<I, S>(mut self, capcodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.capcodes = capcodes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    pub fn with_contains_text(mut self, text: Option<String>) -> Self {
        self.contains_text = text.filter(|t| !t.is_empty());
        self
    }

    /// A radius of 0 (or negative) disables the distance filter.
    pub fn with_radius(mut self, meters: Option<f64>) -> Self {
        self.radius_meters = meters.filter(|m| *m > 0.0);
        self
    }

    pub fn allow_no_location(mut self, allow: bool) -> Self {
        self.allow_no_location = allow;
        self
    }
}

fn normalized_codes<I, S>(codes: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|c| strip_leading_zeros(c.as_ref()).to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// The latest entry that survived every filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentEvent {
    pub message: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Whole meters from the reference point; 0 when unknown.
    pub distance_m: u64,
    pub timestamp: NaiveDateTime,
    pub published: String,
    pub capcode: Option<String>,
    pub region: Option<String>,
    pub region_name: Option<String>,
    pub discipline: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    Region,
    Discipline,
    UnknownDiscipline,
    NoLocation,
    BadCoordinates,
    OutOfRange,
    Capcode,
    Text,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::Region => "region",
            DiscardReason::Discipline => "discipline",
            DiscardReason::UnknownDiscipline => "unknown_discipline",
            DiscardReason::NoLocation => "no_location",
            DiscardReason::BadCoordinates => "bad_coordinates",
            DiscardReason::OutOfRange => "out_of_range",
            DiscardReason::Capcode => "capcode",
            DiscardReason::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventFilter {
    variant: FeedVariant,
    criteria: FilterCriteria,
}

impl EventFilter {
    pub fn new(variant: FeedVariant, criteria: FilterCriteria) -> Self {
        Self { variant, criteria }
    }

    pub fn variant(&self) -> FeedVariant {
        self.variant
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Evaluate a batch (oldest first). The last surviving entry wins.
    pub fn apply(&self, entries: &[NewEntry]) -> Option<CurrentEvent> {
        let mut latest = None;
        for new in entries {
            match self.evaluate(&new.entry, new.timestamp) {
                Ok(ev) => {
                    tracing::debug!(
                        target: "p2000",
                        distance_m = ev.distance_m,
                        time = %ev.timestamp,
                        "entry matched"
                    );
                    latest = Some(ev);
                }
                Err(reason) => {
                    tracing::debug!(
                        target: "p2000",
                        reason = reason.as_str(),
                        title = %new.entry.title,
                        "entry discarded"
                    );
                    counter!("p2000_entries_discarded_total", "reason" => reason.as_str())
                        .increment(1);
                }
            }
        }
        latest
    }

    /// Run every active predicate against one entry.
    pub fn evaluate(
        &self,
        entry: &FeedEntry,
        timestamp: NaiveDateTime,
    ) -> Result<CurrentEvent, DiscardReason> {
        let c = &self.criteria;

        let region = entry
            .region
            .as_deref()
            .map(|r| strip_leading_zeros(r).to_string());
        if let Some(r) = &region {
            if !c.regions.is_empty() && !c.regions.contains(r) {
                return Err(DiscardReason::Region);
            }
        }

        let discipline = match self.variant.discipline(entry) {
            Discipline::Absent => None,
            Discipline::Known(code) => {
                if !c.disciplines.is_empty() && !c.disciplines.contains(code) {
                    return Err(DiscardReason::Discipline);
                }
                Some(discipline_name(code).unwrap_or(code).to_string())
            }
            Discipline::Unknown(raw) => {
                if !c.disciplines.is_empty() {
                    tracing::warn!(target: "p2000", discipline = %raw, variant = %self.variant, "unknown discipline");
                    return Err(DiscardReason::UnknownDiscipline);
                }
                Some(raw)
            }
        };

        let (point, distance) = match entry.coordinates() {
            Ok(Some(p)) => {
                let d = c.reference_point.distance_to(&p);
                if let Some(max) = c.radius_meters {
                    if d > max {
                        tracing::debug!(target: "p2000", distance_m = d, max_m = max, "outside range");
                        return Err(DiscardReason::OutOfRange);
                    }
                }
                (p, d)
            }
            Ok(None) if c.allow_no_location => (GeoPoint::default(), 0.0),
            Ok(None) => return Err(DiscardReason::NoLocation),
            Err(e) => {
                tracing::warn!(target: "p2000", error = %e, "skipping entry");
                return Err(DiscardReason::BadCoordinates);
            }
        };

        let capcode = if c.capcodes.is_empty() {
            entry.capcodes.first().cloned()
        } else {
            Some(
                self.variant
                    .match_capcode(entry, &c.capcodes)
                    .ok_or(DiscardReason::Capcode)?,
            )
        };

        if let Some(needle) = &c.contains_text {
            if !entry.title.contains(needle.as_str()) {
                return Err(DiscardReason::Text);
            }
        }

        Ok(CurrentEvent {
            message: entry.title.clone(),
            latitude: point.latitude,
            longitude: point.longitude,
            distance_m: distance.round() as u64,
            timestamp,
            published: entry.published.clone(),
            capcode,
            region_name: region.as_deref().and_then(region_name).map(str::to_string),
            region,
            discipline,
            link: entry.link.clone(),
        })
    }
}
