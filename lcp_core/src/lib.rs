//! This crate implements the booking aggregation core of the LIVABLŌM
//! calendar proxy.
//!
//! For every registered rental property it fetches the external iCalendar
//! feeds (Google Calendar, Airbnb, Booking.com), normalizes their events
//! into busy intervals, merges them with reservations persisted by the
//! booking site, and serializes the merged set back into an iCalendar feed
//! consumable by third-party platforms. It also accepts new reservation
//! writes so they show up in later merges.

pub use ical;
pub use rusqlite;

pub mod aggregate;
pub mod config;
pub mod error;
pub mod feed;
pub mod intake;
pub mod interval;
pub mod store;

pub use aggregate::aggregate;
pub use config::Config;
pub use error::{Error, Result, StoreError};
pub use interval::BusyInterval;
