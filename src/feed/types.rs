// src/feed/types.rs
use crate::error::FeedError;
use crate::geo::GeoPoint;

/// One parsed feed item. Fields a feed variant does not carry stay `None`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeedEntry {
    /// Feed-native timestamp, e.g. `Sat, 18 Oct 2026 14:02:11 +0200`.
    pub published: String,
    pub title: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    /// Raw `geo:lat` / `geo:long` text; converted lazily so a bad value only
    /// drops its own entry.
    pub geo_lat: Option<String>,
    pub geo_long: Option<String>,
    pub region: Option<String>,
    pub discipline: Option<String>,
    pub capcodes: Vec<String>,
}

impl FeedEntry {
    /// Coordinates of the incident, `Ok(None)` when the entry has none.
    pub fn coordinates(&self) -> Result<Option<GeoPoint>, FeedError> {
        let (Some(lat), Some(lon)) = (self.geo_lat.as_deref(), self.geo_long.as_deref()) else {
            return Ok(None);
        };
        let latitude = parse_coord("geo:lat", lat)?;
        let longitude = parse_coord("geo:long", lon)?;
        // 0,0 is what some feeds emit for "unknown"
        if latitude == 0.0 && longitude == 0.0 {
            return Ok(None);
        }
        Ok(Some(GeoPoint::new(latitude, longitude)))
    }
}

fn parse_coord(field: &'static str, raw: &str) -> Result<f64, FeedError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeedError::ValueConversion {
            field,
            raw: raw.to_string(),
        })
}

/// `ETag` / `Last-Modified` pair echoed back on the next request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheValidators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Entries are ordered newest-first, as delivered by the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub entries: Vec<FeedEntry>,
    pub validators: CacheValidators,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Parsed(ParsedFeed),
    /// Server answered 304; nothing to evaluate this cycle.
    NotModified,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, validators: &CacheValidators) -> Result<FetchOutcome, FeedError>;
    fn name(&self) -> &str;
}
