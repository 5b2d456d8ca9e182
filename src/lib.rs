//! Compiled row-to-record mapping and cancellable async row streams.
//!
//! Query results arrive as rows of named columns; this crate turns them
//! into typed records or name-indexed snapshots, one row at a time, as the
//! provider produces them.
//!
//! ## Accessors
//!
//! - [`Mapped`] / [`mapped!`] — Declares the members a type exposes by name
//! - [`Accessors`] — Per-type table of get/set closures, compiled once and cached
//! - [`FromValue`] — The explicit value → member conversion policy
//!
//! ## Pipeline
//!
//! - [`Executor`] — Entry point: `stream_rows`, `stream_typed`, `stream_dynamic`, `execute_count`
//! - [`RowStream`] — Lazy, single-pass, cancellable stream of results
//! - [`Provider`] / [`Cursor`] — The data source seam
//! - [`Lease`] — Exactly-once ownership of an open cursor
//!
//! ## Providers
//!
//! - [`memory::MemoryProvider`] — Scripted in-memory results with lifecycle counters
//! - [`postgres::Postgres`] — `tokio_postgres` client (feature `postgres`)
mod accessor;
mod cancel;
mod command;
mod convert;
mod cursor;
mod error;
mod executor;
mod mapped;
mod projection;
mod provider;
mod record;
mod row;
mod stream;
mod value;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use accessor::*;
pub use cancel::*;
pub use command::*;
pub use convert::*;
pub use cursor::*;
pub use error::*;
pub use executor::*;
pub use provider::*;
pub use record::*;
pub use row::*;
pub use stream::RowStream;
pub use value::*;

use projection::Projection;

/// Initialize terminal logging.
///
/// Level comes from `ROWMAP_LOG` (`error`, `warn`, `info`, `debug`, `trace`),
/// defaulting to `info`. Logs go to stderr so stdout stays clean for output.
#[cfg(feature = "cli")]
pub fn log() {
    let level = std::env::var("ROWMAP_LOG")
        .ok()
        .and_then(|s| s.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}
