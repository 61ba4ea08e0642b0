use crate::core::phone::normalize_phone;
use crate::domain::model::Record;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// An immutable, indexed view of every record from one load.
///
/// When several rows share a phone number (or contract code) the earliest
/// row in file order owns the key; later rows stay in `records` but are
/// unreachable by that key.
#[derive(Debug)]
pub struct Snapshot {
    records: Vec<Record>,
    by_phone: HashMap<String, usize>,
    by_contract: HashMap<String, usize>,
    duplicate_phones: usize,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>, source: impl Into<String>) -> Self {
        let mut by_phone = HashMap::with_capacity(records.len());
        let mut by_contract = HashMap::with_capacity(records.len());
        let mut duplicate_phones = 0;

        for (index, record) in records.iter().enumerate() {
            if !record.phone_key.is_empty() {
                match by_phone.entry(record.phone_key.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(index);
                    }
                    Entry::Occupied(_) => duplicate_phones += 1,
                }
            }
            if !record.contract_code.is_empty() {
                by_contract.entry(record.contract_code.clone()).or_insert(index);
            }
        }

        Self {
            records,
            by_phone,
            by_contract,
            duplicate_phones,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(Vec::new(), source)
    }

    /// Looks up by phone number in any supported formatting.
    pub fn find_by_phone(&self, phone: &str) -> Option<&Record> {
        self.by_phone
            .get(&normalize_phone(phone))
            .map(|&index| &self.records[index])
    }

    pub fn find_by_contract(&self, contract_code: &str) -> Option<&Record> {
        self.by_contract
            .get(contract_code.trim())
            .map(|&index| &self.records[index])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn indexed_phones(&self) -> usize {
        self.by_phone.len()
    }

    pub fn duplicate_phones(&self) -> usize {
        self.duplicate_phones
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
