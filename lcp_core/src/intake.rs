//! Validation and persistence of reservation writes from the booking site.
//!
//! Date-only boundaries are expanded with the configured check-in and
//! check-out times, reflecting lodging semantics: a stay "2025-03-01 to
//! 2025-03-05" blocks from arrival at 15:00 to departure at 10:00. The
//! same policy applies to every caller.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::local_to_utc;
use crate::store::{normalize_property_key, NewReservation, ReservationStore};

/// Title recorded when the booking site sends none.
pub static DEFAULT_INTAKE_TITLE: &str = "Réservé (site LIVABLŌM)";

/// A raw reservation write, exactly as received from the client.
#[derive(Debug, Clone, Default)]
pub struct ReservationRequest {
    pub property: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub title: Option<String>,
}

/// Validate, normalize and persist one reservation. Returns the id the
/// store assigned.
pub fn intake(
    store: &dyn ReservationStore,
    config: &Config,
    request: &ReservationRequest,
) -> Result<i64> {
    let property = required(&request.property, "property")?;
    let raw_start = required(&request.start, "start")?;
    let raw_end = required(&request.end, "end")?;

    let code = normalize_property_key(property);
    if config.property(&code).is_none() {
        return Err(Error::UnknownProperty(code));
    }

    let start = parse_boundary(raw_start, config.check_in, config.timezone);
    let end = parse_boundary(raw_end, config.check_out, config.timezone);
    let title = request
        .title
        .clone()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_INTAKE_TITLE.to_string());

    let id = store.insert(&NewReservation {
        property: code.clone(),
        start,
        end,
        title,
    })?;
    info!(property = %code, %start, %end, id, "reservation stored");
    Ok(id)
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Validation(format!("missing field: {name}")))
}

/// Turn a client-supplied boundary into an absolute instant.
///
/// Date-only values get `default_time` in the operating zone; RFC 3339
/// and common local date-time shapes are taken as-is. Anything else
/// degrades to today at the default hour instead of rejecting the write —
/// lenient on purpose, so slightly malformed upstream integrations keep
/// working. See DESIGN.md before tightening this.
fn parse_boundary(raw: &str, default_time: NaiveTime, timezone: Tz) -> DateTime<Utc> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(instant) = local_to_utc(date.and_time(default_time), timezone) {
            return instant;
        }
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return instant.with_timezone(&Utc);
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            if let Some(instant) = local_to_utc(naive, timezone) {
                return instant;
            }
        }
    }
    warn!(raw, "unparseable reservation boundary, falling back to today");
    let today = Utc::now().with_timezone(&timezone).date_naive();
    local_to_utc(today.and_time(default_time), timezone).unwrap_or_else(Utc::now)
}
