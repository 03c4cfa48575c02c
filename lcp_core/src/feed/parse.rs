//! Parsing of raw iCalendar text into normalized busy intervals.
//!
//! The external providers expose two feed shapes: bare availability blocks
//! (Airbnb, Booking.com — date-only, often without a summary) and richer
//! event feeds (Google Calendar — description, location, URL). Both go
//! through the same path; the extra fields are carried when present and
//! never required. Events missing either bound, and anything malformed,
//! are dropped rather than escalated.

use std::io::{BufReader, Cursor};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::IcalParser;
use tracing::warn;

use crate::interval::BusyInterval;

trait GetIcalProperty {
    fn get_ical_property_value(&self, name: &str) -> Option<&String>;
}

impl GetIcalProperty for IcalEvent {
    fn get_ical_property_value(&self, name: &str) -> Option<&String> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_ref())
    }
}

/// Parse feed text from one source into busy intervals.
pub fn parse_feed(ics: &str, source: &str, timezone: Tz) -> Vec<BusyInterval> {
    let parser = IcalParser::new(BufReader::new(Cursor::new(ics)));
    let mut intervals = Vec::new();
    for calendar_result in parser {
        let calendar = match calendar_result {
            Ok(calendar) => calendar,
            Err(err) => {
                warn!(source, error = %err, "skipping malformed calendar block");
                continue;
            }
        };
        for event in calendar.events {
            let title = event.get_ical_property_value("SUMMARY").cloned();
            let start = event
                .get_ical_property_value("DTSTART")
                .and_then(|value| parse_instant(value, timezone));
            let end = event
                .get_ical_property_value("DTEND")
                .and_then(|value| parse_instant(value, timezone));
            let Some(mut interval) = BusyInterval::checked(title, start, end, source) else {
                continue;
            };
            interval.description = event.get_ical_property_value("DESCRIPTION").cloned();
            interval.location = event.get_ical_property_value("LOCATION").cloned();
            interval.url = event.get_ical_property_value("URL").cloned();
            intervals.push(interval);
        }
    }
    intervals
}

/// Parse an iCalendar DATE or DATE-TIME value into an absolute instant.
///
/// `...Z` values are UTC; bare date-times are read in the operating zone;
/// date-only values become midnight in the operating zone, which keeps
/// Airbnb-style all-day blocks meaningful while satisfying the
/// instants-only invariant of the merge.
fn parse_instant(value: &str, timezone: Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Some(stripped) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S").ok()?;
        return Some(naive.and_utc());
    }
    if value.len() == 8 {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return local_to_utc(date.and_hms_opt(0, 0, 0)?, timezone);
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    local_to_utc(naive, timezone)
}

/// Map a wall-clock time in the operating zone to UTC. During a DST gap or
/// fold the earlier valid mapping wins.
pub(crate) fn local_to_utc(naive: NaiveDateTime, timezone: Tz) -> Option<DateTime<Utc>> {
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
