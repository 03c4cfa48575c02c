//! Merging of external feeds and stored reservations for one property.
//!
//! Every configured source is fetched and parsed concurrently; a failing
//! source contributes nothing and cannot abort the others. The reservation
//! store is authoritative: its failure is the only thing that fails an
//! aggregation.

use std::sync::Arc;

use futures_util::future;
use tracing::debug;

use crate::config::{Config, SourceConfig};
use crate::error::{Error, Result};
use crate::feed::{fetch_feed, parse_feed};
use crate::interval::BusyInterval;
use crate::store::ReservationStore;

/// Merge all busy intervals of `property`: external sources in configured
/// order, then internal reservations. No deduplication and no overlap
/// resolution — overlapping bookings from different platforms are
/// surfaced as-is for the consumer to judge.
pub async fn aggregate(
    config: &Config,
    store: Arc<dyn ReservationStore>,
    client: &reqwest::Client,
    property: &str,
) -> Result<Vec<BusyInterval>> {
    let property = config
        .property(property)
        .ok_or_else(|| Error::UnknownProperty(property.to_string()))?;

    let fetches = property
        .sources
        .iter()
        .map(|source| fetch_one(client, source, config));
    let per_source = future::join_all(fetches).await;

    let mut intervals: Vec<BusyInterval> = per_source.into_iter().flatten().collect();
    debug!(
        property = %property.code,
        external = intervals.len(),
        "external sources merged"
    );

    // rusqlite is synchronous; keep the async workers free while the
    // query touches disk under the connection mutex.
    let code = property.code.clone();
    let reservations = tokio::task::spawn_blocking(move || store.list_by_property(&code))
        .await
        .expect("reservation store task panicked")?;
    intervals.extend(
        reservations
            .into_iter()
            .filter_map(|reservation| reservation.into_interval()),
    );
    Ok(intervals)
}

/// Fetch and parse a single source; any failure collapses to zero
/// intervals here so the join sees only successes.
async fn fetch_one(
    client: &reqwest::Client,
    source: &SourceConfig,
    config: &Config,
) -> Vec<BusyInterval> {
    match fetch_feed(client, &source.url).await {
        Some(text) => parse_feed(&text, &source.name, config.timezone),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use ical::generator::Emitter;

    use super::*;
    use crate::error::StoreError;
    use crate::feed::{feed_client, synthesize, SynthesizeOptions};
    use crate::interval::INTERNAL_SOURCE;
    use crate::store::{NewReservation, Reservation, SqliteStore};

    fn instant(s: &str) -> chrono::DateTime<chrono::Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn dead_source(name: &str) -> SourceConfig {
        // Port 9 is the discard service; connections fail immediately.
        SourceConfig {
            name: name.to_string(),
            url: format!("http://127.0.0.1:9/{name}.ics"),
        }
    }

    /// Serve one fixture feed over a loopback listener for a single
    /// request, as a stand-in for a healthy provider.
    async fn live_source(name: &str, ics: &'static str) -> SourceConfig {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/calendar\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{ics}",
                    ics.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        SourceConfig {
            name: name.to_string(),
            url: format!("http://{addr}/{name}.ics"),
        }
    }

    /// A dead source contributes nothing and leaves a healthy source's
    /// intervals untouched within the same aggregation call.
    #[tokio::test]
    async fn test_dead_source_does_not_affect_live_source() {
        let google = live_source("google", include_str!("feed/tests/google_feed.ics")).await;
        let config = Config::default()
            .with_property("LIVA", vec![google, dead_source("airbnb")]);
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store
            .insert(&NewReservation {
                property: "LIVA".to_string(),
                start: instant("2025-05-01T13:00:00"),
                end: instant("2025-05-03T08:00:00"),
                title: "Réservé".to_string(),
            })
            .unwrap();
        let client = feed_client().unwrap();
        let intervals = aggregate(&config, store, &client, "LIVA").await.unwrap();
        let sources: Vec<&str> = intervals
            .iter()
            .map(|interval| interval.source.as_str())
            .collect();
        // Both fixture events survive, then the internal row; the dead
        // airbnb source contributes nothing.
        assert_eq!(sources, ["google", "google", INTERNAL_SOURCE]);
        assert_eq!(intervals[0].title, "Location LIVA");
    }

    #[tokio::test]
    async fn test_unknown_property_short_circuits() {
        let config = Config::default().with_property("LIVA", Vec::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let client = feed_client().unwrap();
        let result = aggregate(&config, store, &client, "GHOST").await;
        assert!(matches!(result, Err(Error::UnknownProperty(_))));
    }

    #[tokio::test]
    async fn test_all_sources_down_still_yields_internal_rows() {
        let config = Config::default().with_property(
            "LIVA",
            vec![dead_source("google"), dead_source("airbnb"), dead_source("booking")],
        );
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store
            .insert(&NewReservation {
                property: "LIVA".to_string(),
                start: instant("2025-03-01T14:00:00"),
                end: instant("2025-03-05T09:00:00"),
                title: "Réservé".to_string(),
            })
            .unwrap();
        let client = feed_client().unwrap();
        let intervals = aggregate(&config, store, &client, "liva").await.unwrap();
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].source, INTERNAL_SOURCE);
        assert_eq!(intervals[0].identity.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_no_sources_and_no_rows_yields_empty() {
        let config = Config::default().with_property("BLOM", Vec::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let client = feed_client().unwrap();
        let intervals = aggregate(&config, store, &client, "BLOM").await.unwrap();
        assert!(intervals.is_empty());
    }

    /// Round-trip: persisted reservations with no external sources come
    /// back as exactly one feed event each, with ids stable across
    /// repeated generation.
    #[tokio::test]
    async fn test_round_trip_reservations_into_feed() {
        let config = Config::default().with_property("LIVA", Vec::new());
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        for (start, end) in [
            ("2025-03-01T14:00:00", "2025-03-05T09:00:00"),
            ("2025-04-10T14:00:00", "2025-04-12T09:00:00"),
        ] {
            store
                .insert(&NewReservation {
                    property: "LIVA".to_string(),
                    start: instant(start),
                    end: instant(end),
                    title: "Réservé".to_string(),
                })
                .unwrap();
        }
        let client = feed_client().unwrap();
        let intervals = aggregate(&config, store.clone(), &client, "LIVA")
            .await
            .unwrap();
        assert_eq!(intervals.len(), 2);
        let feed = synthesize(
            "LIVA",
            &intervals,
            config.timezone,
            &SynthesizeOptions::default(),
        );
        assert_eq!(feed.events.len(), 2);
        let text = feed.generate();
        assert!(text.contains("Reservation_LIVA_1@livablom.fr"));
        assert!(text.contains("Reservation_LIVA_2@livablom.fr"));

        let again = aggregate(&config, store, &client, "LIVA").await.unwrap();
        let regenerated = synthesize(
            "LIVA",
            &again,
            config.timezone,
            &SynthesizeOptions::default(),
        )
        .generate();
        assert_eq!(text, regenerated);
    }

    #[tokio::test]
    async fn test_store_failure_escalates() {
        struct FailingStore;
        impl ReservationStore for FailingStore {
            fn insert(&self, _: &NewReservation) -> std::result::Result<i64, StoreError> {
                Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
            }
            fn list_by_property(
                &self,
                _: &str,
            ) -> std::result::Result<Vec<Reservation>, StoreError> {
                Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
            }
        }
        let config = Config::default().with_property("LIVA", Vec::new());
        let client = feed_client().unwrap();
        let result = aggregate(&config, Arc::new(FailingStore), &client, "LIVA").await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
