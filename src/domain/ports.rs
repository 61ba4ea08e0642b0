use crate::domain::model::Record;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Something that can produce the full, ordered set of customer records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Record>>;

    /// Human-readable location, used in logs and error messages.
    fn describe(&self) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn csv_path(&self) -> &str;
    fn delimiter(&self) -> &str;
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn default_fields(&self) -> &[String];
    fn reload_interval(&self) -> Option<Duration>;
    fn cors_enabled(&self) -> bool;

    fn bind_addr(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}
