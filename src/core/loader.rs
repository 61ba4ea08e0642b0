use crate::core::phone::normalize_phone;
use crate::domain::model::{Counter, Counters, Field, Record};
use crate::domain::ports::RecordSource;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads customer records from a delimited text file on local disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocking read; `load` runs this on the blocking pool.
    pub fn load_blocking(&self) -> Result<Vec<Record>> {
        let source_name = self.describe();
        let file = File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LookupError::data_source(&source_name, "file not found")
            } else {
                LookupError::data_source(&source_name, format!("cannot open file: {}", e))
            }
        })?;
        read_records(file, self.delimiter, &source_name)
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn load(&self) -> Result<Vec<Record>> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.load_blocking())
            .await
            .map_err(|e| {
                LookupError::data_source(self.describe(), format!("load task failed: {}", e))
            })?
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn normalize_column_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Accepts RFC 3339 as-is and upgrades zone-less timestamps to the `Z` form.
/// No timezone conversion happens.
pub fn canonical_timestamp(raw: &str) -> String {
    if raw.is_empty() || DateTime::parse_from_rfc3339(raw).is_ok() {
        return raw.to_string();
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        }
    }

    tracing::debug!("Keeping unrecognized activation_date as-is: {}", raw);
    raw.to_string()
}

/// Parses a delimited table with a header row into records, in file order.
pub fn read_records<R: Read>(reader: R, delimiter: u8, source_name: &str) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_column_name)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(LookupError::data_source(source_name, "file is empty"));
    }

    let mut columns = [0usize; Field::ALL.len()];
    let mut missing = Vec::new();
    for (slot, field) in columns.iter_mut().zip(Field::ALL) {
        match headers.iter().position(|h| h == field.as_str()) {
            Some(index) => *slot = index,
            None => missing.push(field.as_str().to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(LookupError::MissingColumns { columns: missing });
    }

    // Counter columns are optional; absent ones keep their defaults.
    let counter_columns: Vec<(Counter, usize)> = Counter::ALL
        .iter()
        .filter_map(|&counter| {
            headers
                .iter()
                .position(|h| h == counter.column())
                .map(|index| (counter, index))
        })
        .collect();

    let cell = |row: &csv::StringRecord, field: Field| -> String {
        row.get(columns[field as usize])
            .unwrap_or_default()
            .to_string()
    };

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| {
            LookupError::data_source(source_name, format!("malformed row: {}", e))
        })?;

        let counters = read_counters(&row, &counter_columns).map_err(|message| {
            let line = row.position().map_or(0, |p| p.line());
            LookupError::data_source(source_name, format!("line {}: {}", line, message))
        })?;

        let phone_number = cell(&row, Field::PhoneNumber);
        records.push(Record {
            contract_code: cell(&row, Field::ContractCode),
            phone_key: normalize_phone(&phone_number),
            phone_number,
            activation_date: canonical_timestamp(&cell(&row, Field::ActivationDate)),
            platform: cell(&row, Field::Platform),
            status: cell(&row, Field::Status),
            average_arpu: cell(&row, Field::AverageArpu),
            service_type: cell(&row, Field::ServiceType),
            counters,
        });
    }

    tracing::debug!("Read {} rows from {}", records.len(), source_name);
    Ok(records)
}

fn read_counters(
    row: &csv::StringRecord,
    columns: &[(Counter, usize)],
) -> std::result::Result<Counters, String> {
    let mut counters = Counters::default();
    for &(counter, index) in columns {
        let raw = row.get(index).unwrap_or_default();
        match counter {
            Counter::TechnicalContacts => counters.num_contact_tec = parse_count(counter, raw)?,
            Counter::AdminContacts => counters.num_contact_amm = parse_count(counter, raw)?,
            Counter::BroadbandActive => counters.bb_active = parse_count(counter, raw)?,
            Counter::UserName => counters.user_name = raw.to_string(),
        }
    }
    Ok(counters)
}

/// Blank cells count as zero.
fn parse_count(counter: Counter, raw: &str) -> std::result::Result<i64, String> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<i64>()
        .map_err(|_| format!("{} is not an integer: {:?}", counter.column(), raw))
}
