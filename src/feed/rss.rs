// src/feed/rss.rs
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::FeedError;
use crate::feed::types::{CacheValidators, FeedEntry, ParsedFeed};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    // quick-xml matches on local names: <geo:lat> is "lat"
    #[serde(rename = "lat")]
    geo_lat: Option<String>,
    #[serde(rename = "long")]
    geo_long: Option<String>,
    regio: Option<String>,
    discipline: Option<String>,
    #[serde(rename = "capcode", default)]
    capcodes: Vec<String>,
}

/// Parse an RSS 2.0 document into newest-first entries.
///
/// A body that is not an RSS document is a `FeedError::Parse`; a valid
/// document without items is an empty feed.
pub fn parse_feed(xml: &str, validators: CacheValidators) -> Result<ParsedFeed, FeedError> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean)?;

    let entries: Vec<FeedEntry> = rss.channel.item.into_iter().map(to_entry).collect();

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("p2000_parse_ms").record(ms);
    counter!("p2000_entries_parsed_total").increment(entries.len() as u64);

    Ok(ParsedFeed {
        entries,
        validators,
    })
}

fn to_entry(it: Item) -> FeedEntry {
    // livep2000 pads titles with '~' between message blocks
    let title = it.title.as_deref().unwrap_or_default().replace('~', " ");
    FeedEntry {
        published: it.pub_date.unwrap_or_default().trim().to_string(),
        title: crate::feed::normalize_text(&title),
        summary: it.description,
        link: it.link,
        geo_lat: non_empty(it.geo_lat),
        geo_long: non_empty(it.geo_long),
        region: non_empty(it.regio),
        discipline: non_empty(it.discipline),
        capcodes: it
            .capcodes
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&euml;", "ë")
        .replace("&eacute;", "é")
}
