// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::{EventFilter, FeedVariant, FilterCriteria};
use crate::geo::GeoPoint;
use crate::session::FeedSession;

pub const ENV_CONFIG_PATH: &str = "P2000_CONFIG_PATH";
pub const ENV_HOME_LATITUDE: &str = "HOME_LATITUDE";
pub const ENV_HOME_LONGITUDE: &str = "HOME_LONGITUDE";

pub const DEFAULT_CONFIG_TOML: &str = "config/p2000.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/p2000.json";

const BASE_URL: &str = "https://feeds.livep2000.nl";
pub const MIN_SCAN_INTERVAL_SECS: u64 = 10;

fn default_name() -> String {
    "P2000".to_string()
}
fn default_disciplines() -> Vec<String> {
    vec!["1".into(), "2".into(), "3".into(), "4".into()]
}
fn default_radius() -> f64 {
    5000.0
}
fn default_scan_interval() -> u64 {
    MIN_SCAN_INTERVAL_SECS
}
fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

/// One monitored feed subscription plus the process settings around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub variant: FeedVariant,
    /// Overrides the URL built from `regions` / `disciplines`.
    #[serde(default)]
    pub url: Option<String>,
    /// Comma-separated string or array.
    #[serde(default, deserialize_with = "comma_list")]
    pub regions: Vec<String>,
    #[serde(default = "default_disciplines", deserialize_with = "comma_list")]
    pub disciplines: Vec<String>,
    #[serde(default, deserialize_with = "comma_list")]
    pub capcodes: Vec<String>,
    #[serde(default)]
    pub contains: Option<String>,
    /// Meters; 0 disables the distance filter.
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub allow_no_location: bool,
    /// Observer position; falls back to HOME_LATITUDE / HOME_LONGITUDE.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            variant: FeedVariant::default(),
            url: None,
            regions: Vec::new(),
            disciplines: default_disciplines(),
            capcodes: Vec::new(),
            contains: None,
            radius: default_radius(),
            allow_no_location: false,
            latitude: None,
            longitude: None,
            scan_interval_secs: default_scan_interval(),
            bind: default_bind(),
        }
    }
}

impl MonitorConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: MonitorConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing json config {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("parsing toml config {}", path.display()))?,
        };
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $P2000_CONFIG_PATH
    /// 2) config/p2000.toml
    /// 3) config/p2000.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
        }
        for candidate in [DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_JSON] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    pub fn feed_url(&self) -> String {
        match &self.url {
            Some(u) => u.clone(),
            None => format!(
                "{BASE_URL}?r={}&d={}",
                self.regions.join(","),
                self.disciplines.join(",")
            ),
        }
    }

    /// Poll interval, never below the 10 s throttle.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(MIN_SCAN_INTERVAL_SECS))
    }

    pub fn reference_point(&self) -> Result<GeoPoint> {
        let lat = match self.latitude {
            Some(v) => v,
            None => env_coord(ENV_HOME_LATITUDE)?,
        };
        let lon = match self.longitude {
            Some(v) => v,
            None => env_coord(ENV_HOME_LONGITUDE)?,
        };
        if !(-90.0..=90.0).contains(&lat) {
            bail!("latitude {lat} out of range");
        }
        if !(-180.0..=180.0).contains(&lon) {
            bail!("longitude {lon} out of range");
        }
        Ok(GeoPoint::new(lat, lon))
    }

    pub fn criteria(&self) -> Result<FilterCriteria> {
        if self.radius < 0.0 {
            bail!("radius must not be negative, got {}", self.radius);
        }
        Ok(FilterCriteria::new(self.reference_point()?)
            .with_regions(&self.regions)
            .with_disciplines(&self.disciplines)
            .with_capcodes(&self.capcodes)
            .with_contains_text(self.contains.clone())
            .with_radius(Some(self.radius))
            .allow_no_location(self.allow_no_location))
    }

    pub fn build_session(&self) -> Result<FeedSession> {
        let filter = EventFilter::new(self.variant, self.criteria()?);
        Ok(FeedSession::new(self.name.clone(), filter))
    }
}

fn env_coord(key: &str) -> Result<f64> {
    let raw = std::env::var(key)
        .map_err(|_| anyhow!("no observer position: set latitude/longitude or {key}"))?;
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("{key}={raw:?} is not a number"))
}

fn comma_list<'de, D>(de: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }
    let items = match Raw::deserialize(de)? {
        Raw::One(s) => s.split(',').map(str::to_string).collect(),
        Raw::Many(v) => v,
    };
    Ok(clean_list(items))
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() {
            set.insert(t.to_string());
        }
    }
    set.into_iter().collect()
}
