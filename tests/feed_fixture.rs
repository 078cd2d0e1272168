// tests/feed_fixture.rs
//
// Real-shaped feed document: parsing plus both filter variants.

mod common;

use common::{FIXTURE_XML, HOME};
use p2000_monitor::cursor::NewEntry;
use p2000_monitor::feed::{parse_feed, parse_feed_timestamp, CacheValidators};
use p2000_monitor::{EventFilter, FeedVariant, FilterCriteria};

fn all_as_new() -> Vec<NewEntry> {
    let feed = parse_feed(FIXTURE_XML, CacheValidators::default()).expect("fixture parses");
    feed.entries
        .into_iter()
        .rev()
        .map(|entry| NewEntry {
            timestamp: parse_feed_timestamp(&entry.published).unwrap(),
            entry,
        })
        .collect()
}

#[test]
fn fixture_parses_structured_fields() {
    let feed = parse_feed(FIXTURE_XML, CacheValidators::default()).unwrap();
    assert_eq!(feed.entries.len(), 3);

    let newest = &feed.entries[0];
    assert_eq!(newest.title, "A1 Damrak 1012LG Amsterdam 13101");
    assert_eq!(newest.region.as_deref(), Some("13"));
    assert_eq!(newest.discipline.as_deref(), Some("Ambulance"));
    assert_eq!(newest.capcodes, vec!["1301001", "1301999"]);

    let oldest = &feed.entries[2];
    assert!(oldest.geo_lat.is_none());
    assert_eq!(oldest.region.as_deref(), Some("013"));
}

#[test]
fn structured_variant_filters_by_region_discipline_and_capcode() {
    let entries = all_as_new();

    // Fire in Kennemerland only
    let f = EventFilter::new(
        FeedVariant::Structured,
        FilterCriteria::new(HOME)
            .with_regions(["12"])
            .with_disciplines(["1"]),
    );
    let ev = f.apply(&entries).expect("haarlem fire matches");
    assert!(ev.message.contains("Haarlem"));
    assert_eq!(ev.region_name.as_deref(), Some("Kennemerland"));
    assert_eq!(ev.discipline.as_deref(), Some("Brandweer"));
    assert!(ev.distance_m > 15_000);

    // exact capcode; the police entry has no location and is dropped
    let f = EventFilter::new(
        FeedVariant::Structured,
        FilterCriteria::new(HOME).with_capcodes(["1301999", "1330001"]),
    );
    let ev = f.apply(&entries).unwrap();
    assert_eq!(ev.capcode.as_deref(), Some("1301999"));
    assert!(ev.distance_m < 1_000);
}

#[test]
fn livep2000_variant_matches_capcode_inside_summary() {
    let entries = all_as_new();
    let f = EventFilter::new(
        FeedVariant::LiveP2000,
        FilterCriteria::new(HOME)
            .with_capcodes(["1201999"])
            .with_radius(Some(20_000.0)),
    );
    let ev = f.apply(&entries).unwrap();
    assert!(ev.message.starts_with("P 1 BDH-01"));
    assert_eq!(ev.capcode.as_deref(), Some("1201999"));
}

#[test]
fn livep2000_variant_drops_named_disciplines_when_filtering() {
    // livep2000 expects numeric codes; service names are unknown there
    let entries = all_as_new();
    let f = EventFilter::new(
        FeedVariant::LiveP2000,
        FilterCriteria::new(HOME)
            .with_disciplines(["1", "2", "3", "4"])
            .allow_no_location(true),
    );
    assert!(f.apply(&entries).is_none());
}
