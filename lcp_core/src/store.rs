//! Reservation store adapter.
//!
//! Owns the lifecycle of reservations created through the booking site:
//! insert and read-by-property, nothing else. The SQLite schema is applied
//! on open and versioned through `PRAGMA user_version`.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use tracing::info;

use crate::error::StoreError;
use crate::interval::{BusyInterval, INTERNAL_SOURCE};

const SCHEMA_VERSION: u32 = 1;

/// Stored timestamp format. UTC and second precision, so lexicographic
/// order equals chronological order and `ORDER BY start` is correct.
const STORED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Normalize a property key to the partition-key convention: trimmed,
/// uppercased, accents folded to their base letter. Insert and lookup both
/// go through this, so `liva`, `LIVA` and `Lívà` address the same rows.
pub fn normalize_property_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(|c| c.to_uppercase())
        .map(|c| match c {
            'À'..='Å' | 'Ā' | 'Ă' => 'A',
            'Ç' | 'Ć' | 'Č' => 'C',
            'È'..='Ë' | 'Ē' | 'Ė' => 'E',
            'Ì'..='Ï' | 'Ī' => 'I',
            'Ñ' => 'N',
            'Ò'..='Ö' | 'Ō' | 'Ø' => 'O',
            'Ù'..='Ü' | 'Ū' => 'U',
            'Ý' | 'Ÿ' => 'Y',
            other => other,
        })
        .collect()
}

/// A persisted reservation row. Never mutated after insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: i64,
    pub property: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
}

impl Reservation {
    /// Convert into a merge-ready interval. The row id becomes the stable
    /// feed identity. Rows violating the interval invariant are dropped,
    /// like any other source.
    pub fn into_interval(self) -> Option<BusyInterval> {
        let mut interval = BusyInterval::checked(
            Some(self.title),
            Some(self.start),
            Some(self.end),
            INTERNAL_SOURCE,
        )?;
        interval.identity = Some(self.id.to_string());
        Some(interval)
    }
}

/// A reservation about to be persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub property: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
}

pub trait ReservationStore: Send + Sync {
    /// Persist a reservation and return its assigned id. The property key
    /// is normalized before storage. Not retried on failure.
    fn insert(&self, reservation: &NewReservation) -> Result<i64, StoreError>;

    /// All reservations of a property, ascending by start time. Empty for
    /// a property with no rows, never an error.
    fn list_by_property(&self, property: &str) -> Result<Vec<Reservation>, StoreError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self::from_connection(Connection::open(path.as_ref())?)?;
        info!(path = %path.as_ref().display(), "reservation store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        apply_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("reservation store mutex poisoned")
    }
}

fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < SCHEMA_VERSION {
        // "end" is quoted everywhere: END is an SQL keyword.
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reservations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                property TEXT NOT NULL,
                start TEXT NOT NULL,
                \"end\" TEXT NOT NULL,
                title TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reservations_property_start
                ON reservations (property, start);
            PRAGMA user_version = 1;",
        )?;
    }
    Ok(())
}

impl ReservationStore for SqliteStore {
    fn insert(&self, reservation: &NewReservation) -> Result<i64, StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO reservations (property, start, \"end\", title)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                normalize_property_key(&reservation.property),
                reservation.start.format(STORED_TIME_FORMAT).to_string(),
                reservation.end.format(STORED_TIME_FORMAT).to_string(),
                reservation.title,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_by_property(&self, property: &str) -> Result<Vec<Reservation>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, property, start, \"end\", title
             FROM reservations
             WHERE property = ?1
             ORDER BY start ASC",
        )?;
        let rows = stmt.query_map([normalize_property_key(property)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;
        let mut reservations = Vec::new();
        for row in rows {
            let (id, property, start, end, title) = row?;
            let (Some(start), Some(end)) = (parse_stored(&start), parse_stored(&end)) else {
                // Row in an unknown timestamp format; skip it rather than
                // feed a corrupt instant into the merge.
                continue;
            };
            reservations.push(Reservation {
                id,
                property,
                start,
                end,
                title,
            });
        }
        Ok(reservations)
    }
}

fn parse_stored(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, STORED_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
