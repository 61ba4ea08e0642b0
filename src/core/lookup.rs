use crate::core::phone::normalize_phone;
use crate::core::store::SnapshotStore;
use crate::domain::model::{Counter, CounterReading, Field, Projection, Record};
use crate::utils::error::{LookupError, Result};
use std::sync::Arc;

/// Answers phone and contract queries against the current snapshot.
pub struct LookupService {
    store: Arc<SnapshotStore>,
    default_fields: Vec<Field>,
}

impl LookupService {
    pub fn new(store: Arc<SnapshotStore>, default_fields: Vec<Field>) -> Self {
        Self {
            store,
            default_fields,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn default_fields(&self) -> &[Field] {
        &self.default_fields
    }

    /// `fields` is the raw comma-separated query value, if any.
    pub fn find_by_phone(&self, phone: &str, fields: Option<&str>) -> Result<Projection> {
        let wanted = self.resolve_fields(fields)?;
        self.with_phone(phone, |record| record.project(&wanted))
    }

    pub fn find_by_contract(&self, contract_code: &str, fields: Option<&str>) -> Result<Projection> {
        let contract_code = required_contract_code(contract_code)?;
        let wanted = self.resolve_fields(fields)?;
        self.with_contract(contract_code, |record| record.project(&wanted))
    }

    pub fn counter_by_phone(&self, phone: &str, counter: Counter) -> Result<CounterReading> {
        self.with_phone(phone, |record| record.counters.read(counter))
    }

    pub fn counter_by_contract(&self, contract_code: &str, counter: Counter) -> Result<CounterReading> {
        let contract_code = required_contract_code(contract_code)?;
        self.with_contract(contract_code, |record| record.counters.read(counter))
    }

    fn with_phone<T>(&self, phone: &str, f: impl FnOnce(&Record) -> T) -> Result<T> {
        let snapshot = self.store.current();
        match snapshot.find_by_phone(phone) {
            Some(record) => Ok(f(record)),
            None => {
                tracing::debug!("Phone lookup miss: {}", normalize_phone(phone));
                // Report the number as sent, not its normalized key.
                Err(LookupError::NotFound {
                    key: format!("phone number {}", phone.trim()),
                })
            }
        }
    }

    fn with_contract<T>(&self, contract_code: &str, f: impl FnOnce(&Record) -> T) -> Result<T> {
        let snapshot = self.store.current();
        snapshot.find_by_contract(contract_code).map(f).ok_or_else(|| {
            tracing::debug!("Contract lookup miss: {}", contract_code);
            LookupError::NotFound {
                key: format!("contract code {}", contract_code),
            }
        })
    }

    /// Validates the requested names before any record is touched.
    fn resolve_fields(&self, fields: Option<&str>) -> Result<Vec<Field>> {
        let requested = match fields {
            Some(raw) => Field::parse_list(raw.split(','))?,
            None => Vec::new(),
        };

        if requested.is_empty() {
            Ok(self.default_fields.clone())
        } else {
            Ok(requested)
        }
    }
}

fn required_contract_code(contract_code: &str) -> Result<&str> {
    let contract_code = contract_code.trim();
    if contract_code.is_empty() {
        return Err(LookupError::InvalidRequest {
            message: "Contract code is required".to_string(),
        });
    }
    Ok(contract_code)
}
