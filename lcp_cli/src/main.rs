//! One-shot CLI: aggregate a property and write its merged iCalendar feed
//! to the current directory. Reads the same environment as the server.

use std::{env::current_dir, fs::write, sync::Arc};

use anyhow::Result;
use clap::Parser;
use lcp_core::{
    aggregate,
    feed::{feed_client, synthesize, SynthesizeOptions},
    ical::generator::Emitter,
    store::SqliteStore,
    Config,
};

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the property code, e.g. LIVA
    pub property: String,
    /// shift every event end forward by one day (exclusive end-date convention)
    #[arg(long)]
    pub exclusive_end: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    let config = Config::from_env();
    let database_path = std::env::var("LCP_DATABASE_PATH")
        .unwrap_or_else(|_| String::from("reservations.sqlite3"));
    let store = Arc::new(SqliteStore::open(&database_path)?);
    let client = feed_client()?;
    let intervals = aggregate(&config, store, &client, &args.property).await?;
    let label = config
        .property(&args.property)
        .map(|property| property.code.clone())
        .unwrap_or_else(|| args.property.clone());
    let calendar = synthesize(
        &label,
        &intervals,
        config.timezone,
        &SynthesizeOptions {
            exclusive_end: args.exclusive_end || config.exclusive_end,
        },
    );
    let mut path = current_dir()?;
    path.push(format!("{label}.ics"));
    write(path, calendar.generate())?;
    Ok(())
}
