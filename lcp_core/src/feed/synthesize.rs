//! Serialization of a merged interval set into an iCalendar feed.
//!
//! Consuming platforms deduplicate by UID, so event identifiers must be
//! stable across regenerations for unchanged data: internal intervals use
//! the persisted reservation id, external ones fall back to source and
//! position. Nothing in the output depends on the wall clock, which makes
//! repeated synthesis byte-identical.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use ical::generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property};
use ical::ical_property;
use regex::Regex;

use crate::interval::BusyInterval;

static PROD_ID: [&str; 2] = ["Calendrier LIVABLOM", "livablom.fr"];
static UID_DOMAIN: &str = "livablom.fr";
static FEED_NAME: &str = "Calendrier LIVABLOM";

const DT_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Stamp used for a feed with no events; with events the stamp derives
/// from the latest interval end, so it only moves when the data does.
static EMPTY_FEED_STAMP: &str = "20200101T000000";

#[derive(Debug, Clone, Default)]
pub struct SynthesizeOptions {
    /// Shift every DTEND forward by one day, converting an inclusive
    /// end-date convention into the exclusive one some platforms expect.
    /// Applies to all events or none.
    pub exclusive_end: bool,
}

/// Build the feed calendar for one property from an already-merged
/// interval sequence. Input order is preserved.
pub fn synthesize(
    property_label: &str,
    intervals: &[BusyInterval],
    timezone: Tz,
    options: &SynthesizeOptions,
) -> IcalCalendar {
    let changed = feed_stamp(intervals, timezone);
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(prod_id(property_label))
        .build();
    calendar
        .properties
        .push(ical_property!("X-WR-CALNAME", format!("{FEED_NAME} - {property_label}")));
    calendar
        .properties
        .push(ical_property!("X-WR-TIMEZONE", timezone.to_string()));
    for (index, interval) in intervals.iter().enumerate() {
        calendar
            .events
            .push(busy_event(property_label, interval, index, timezone, options, &changed));
    }
    calendar
}

fn busy_event(
    property_label: &str,
    interval: &BusyInterval,
    index: usize,
    timezone: Tz,
    options: &SynthesizeOptions,
    changed: &str,
) -> IcalEvent {
    let end = if options.exclusive_end {
        interval.end + Duration::days(1)
    } else {
        interval.end
    };
    let identity = interval
        .identity
        .clone()
        .unwrap_or_else(|| format!("{}-{}", interval.source, index));
    let mut builder = IcalEventBuilder::tzid(timezone.to_string())
        .uid(uid(property_label, &identity))
        .changed(changed.to_string())
        .start(format_local(interval.start, timezone))
        .end(format_local(end, timezone))
        .set(ical_property!("SUMMARY", interval.title.clone()));
    if let Some(description) = &interval.description {
        builder = builder.set(ical_property!("DESCRIPTION", description.clone()));
    }
    if let Some(location) = &interval.location {
        builder = builder.set(ical_property!("LOCATION", location.clone()));
    }
    if let Some(url) = &interval.url {
        builder = builder.set(ical_property!("URL", url.clone()));
    }
    builder.build()
}

fn format_local(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant.with_timezone(&timezone).format(DT_FORMAT).to_string()
}

fn feed_stamp(intervals: &[BusyInterval], timezone: Tz) -> String {
    intervals
        .iter()
        .map(|interval| interval.end)
        .max()
        .map(|end| format_local(end, timezone))
        .unwrap_or_else(|| EMPTY_FEED_STAMP.to_string())
}

fn prod_id(property_label: &str) -> String {
    let mut strings: Vec<String> = Vec::from(PROD_ID).into_iter().map(String::from).collect();
    strings.splice(0..0, [String::from("-"), String::from(property_label)]);
    strings.join("//")
}

/// Get the unique id of one busy event in one property's feed.
///
/// Changing this function is a breaking change!
fn uid(property_label: &str, identity: &str) -> String {
    let whitespace_regex = Regex::new(r"\s+").unwrap();
    let whitespace_rep = "-";
    let property_label = whitespace_regex.replace_all(property_label, whitespace_rep);
    let identity = whitespace_regex.replace_all(identity, whitespace_rep);
    format!("Reservation_{property_label}_{identity}@{UID_DOMAIN}")
}
