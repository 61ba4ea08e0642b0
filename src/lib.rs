pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::server::LookupServer;
pub use core::{
    loader::CsvSource, lookup::LookupService, snapshot::Snapshot, store::SnapshotStore,
    ConfigProvider, Counter, CounterReading, Field, Projection, Record, RecordSource,
};
pub use utils::error::{LookupError, Result};
