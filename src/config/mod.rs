pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

pub const DEFAULT_CSV_PATH: &str = "customers.csv";
pub const DEFAULT_DELIMITER: &str = ";";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FIELDS: &str =
    "contract_code,platform,status,average_arpu,service_type,activation_date";

pub fn default_field_list() -> Vec<String> {
    DEFAULT_FIELDS.split(',').map(str::to_string).collect()
}

/// Checks shared by every config front-end.
pub fn validate_provider(config: &dyn ConfigProvider) -> Result<()> {
    validation::validate_path("csv_path", config.csv_path())?;
    validation::validate_delimiter("delimiter", config.delimiter())?;
    validation::validate_non_empty_string("host", config.host())?;
    validation::validate_range("port", config.port(), 1, u16::MAX)?;
    validation::validate_field_names("default_fields", config.default_fields())?;
    if let Some(interval) = config.reload_interval() {
        validation::validate_positive_number(
            "reload_interval_seconds",
            interval.as_secs(),
            1,
        )?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, clap::Parser)]
#[command(name = "customer-lookup")]
#[command(about = "Read-only customer lookup service over a delimited file")]
pub struct CliConfig {
    /// Path to the customer table
    #[arg(long, env = "CSV_PATH", default_value = DEFAULT_CSV_PATH)]
    pub csv_path: String,

    /// Column delimiter of the customer table
    #[arg(long, env = "CSV_SEP", default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,

    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Fields returned when a request has no `fields` parameter.
    ///
    /// The default leaves out `phone_number`; pass all seven names
    /// (`contract_code,phone_number,activation_date,platform,status,average_arpu,service_type`)
    /// to return every attribute.
    #[arg(long, env = "DEFAULT_FIELDS", value_delimiter = ',', default_value = DEFAULT_FIELDS)]
    pub default_fields: Vec<String>,

    /// Re-read the customer table every N seconds
    #[arg(long, env = "RELOAD_INTERVAL_SECONDS")]
    pub reload_interval_seconds: Option<u64>,

    /// Disable permissive CORS headers
    #[arg(long)]
    pub no_cors: bool,

    /// Load settings from a TOML file instead of flags
    #[arg(short, long)]
    pub config: Option<String>,

    /// Load the customer table, print a summary and exit without serving
    #[arg(long)]
    pub check: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn csv_path(&self) -> &str {
        &self.csv_path
    }

    fn delimiter(&self) -> &str {
        &self.delimiter
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn default_fields(&self) -> &[String] {
        &self.default_fields
    }

    fn reload_interval(&self) -> Option<Duration> {
        self.reload_interval_seconds.map(Duration::from_secs)
    }

    fn cors_enabled(&self) -> bool {
        !self.no_cors
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
