// tests/common/mod.rs
// Small builders for synthetic RSS documents.
#![allow(dead_code)]

use p2000_monitor::geo::GeoPoint;

/// Dam square, Amsterdam.
pub const HOME: GeoPoint = GeoPoint {
    latitude: 52.3731,
    longitude: 4.8926,
};

pub const FIXTURE_XML: &str = include_str!("../fixtures/p2000_feed.xml");

/// `<item>` at `minutes` past 10:00 on 18 Oct 2026, `north_deg` degrees of
/// latitude north of HOME (`None` = no coordinates).
pub fn item(minutes: u32, title: &str, north_deg: Option<f64>) -> String {
    let geo = match north_deg {
        Some(d) => format!(
            "<geo:lat>{}</geo:lat><geo:long>{}</geo:long>",
            HOME.latitude + d,
            HOME.longitude
        ),
        None => String::new(),
    };
    format!(
        "<item><title>{title}</title><pubDate>{}</pubDate>{geo}</item>",
        pub_date(minutes)
    )
}

pub fn pub_date(minutes: u32) -> String {
    format!(
        "Sat, 18 Oct 2026 {:02}:{:02}:00 +0200",
        10 + minutes / 60,
        minutes % 60
    )
}

/// Wrap items (newest first) into an RSS document.
pub fn rss(items: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:geo="http://www.w3.org/2003/01/geo/wgs84_pos#">
<channel><title>P2000</title>{}</channel></rss>"#,
        items.concat()
    )
}
