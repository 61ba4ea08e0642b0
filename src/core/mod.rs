pub mod loader;
pub mod lookup;
pub mod phone;
pub mod snapshot;
pub mod store;

pub use crate::domain::model::{Counter, CounterReading, Field, Projection, Record};
pub use crate::domain::ports::{ConfigProvider, RecordSource};
