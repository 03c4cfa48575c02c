//! The normalized busy-interval record every calendar source is reduced to.

use chrono::{DateTime, Utc};

/// Summary used when a source does not name its event.
pub static DEFAULT_TITLE: &str = "Réservé";

/// Source name for intervals backed by the reservation store.
pub static INTERNAL_SOURCE: &str = "internal";

/// A blocked time range for one property, from any origin.
///
/// `start` and `end` are absolute instants; date-only values have been
/// promoted before an interval is built. `identity` is only needed at feed
/// synthesis time and is left empty for external events (they get a
/// positional one there). The description/location/url fields are carried
/// opportunistically from richer feeds and never required.
#[derive(Debug, Clone, PartialEq)]
pub struct BusyInterval {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source: String,
    pub identity: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
}

impl BusyInterval {
    /// Build an interval from possibly-missing parts.
    ///
    /// Returns `None` when either bound is missing or `start >= end`;
    /// callers drop such events silently, which is the defined
    /// normalization rule rather than an error.
    pub fn checked(
        title: Option<String>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        source: &str,
    ) -> Option<Self> {
        let (Some(start), Some(end)) = (start, end) else {
            return None;
        };
        if start >= end {
            return None;
        }
        Some(Self {
            title: title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            start,
            end,
            source: source.to_string(),
            identity: None,
            description: None,
            location: None,
            url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_checked_requires_both_bounds() {
        let start = Some(instant("2025-03-01T15:00:00"));
        let end = Some(instant("2025-03-05T10:00:00"));
        assert!(BusyInterval::checked(None, start, end, "airbnb").is_some());
        assert!(BusyInterval::checked(None, start, None, "airbnb").is_none());
        assert!(BusyInterval::checked(None, None, end, "airbnb").is_none());
    }

    #[test]
    fn test_checked_requires_ordered_bounds() {
        let start = instant("2025-03-05T10:00:00");
        let end = instant("2025-03-01T15:00:00");
        assert!(BusyInterval::checked(None, Some(start), Some(end), "google").is_none());
        assert!(BusyInterval::checked(None, Some(start), Some(start), "google").is_none());
    }

    #[test]
    fn test_checked_applies_title_default() {
        let start = Some(instant("2025-03-01T15:00:00"));
        let end = Some(instant("2025-03-05T10:00:00"));
        let interval = BusyInterval::checked(None, start, end, "booking").unwrap();
        assert_eq!(interval.title, DEFAULT_TITLE);
        let interval =
            BusyInterval::checked(Some("  ".to_string()), start, end, "booking").unwrap();
        assert_eq!(interval.title, DEFAULT_TITLE);
        let interval =
            BusyInterval::checked(Some("Séjour".to_string()), start, end, "booking").unwrap();
        assert_eq!(interval.title, "Séjour");
    }
}
