//! Feed handling: fetching raw calendar text, normalizing it into busy
//! intervals, and serializing a merged set back into an iCalendar feed.

mod fetch;
mod parse;
mod synthesize;

pub use fetch::{feed_client, fetch_feed};
pub use parse::parse_feed;
pub use synthesize::{synthesize, SynthesizeOptions};

pub(crate) use parse::local_to_utc;
