use crate::utils::error::{LookupError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

/// The attributes a customer record exposes, in source column order.
/// Variant order matches `Field::ALL`; `field as usize` indexes into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ContractCode,
    PhoneNumber,
    ActivationDate,
    Platform,
    Status,
    AverageArpu,
    ServiceType,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::ContractCode,
        Field::PhoneNumber,
        Field::ActivationDate,
        Field::Platform,
        Field::Status,
        Field::AverageArpu,
        Field::ServiceType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ContractCode => "contract_code",
            Field::PhoneNumber => "phone_number",
            Field::ActivationDate => "activation_date",
            Field::Platform => "platform",
            Field::Status => "status",
            Field::AverageArpu => "average_arpu",
            Field::ServiceType => "service_type",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Field::as_str).collect()
    }

    /// Parses every name, collapsing duplicates and keeping first-seen order.
    /// Blank entries are skipped. Fails with every unknown name at once.
    pub fn parse_list<'a, I>(names: I) -> Result<Vec<Field>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields = Vec::new();
        let mut invalid = Vec::new();

        for name in names.into_iter().map(str::trim).filter(|n| !n.is_empty()) {
            match name.parse::<Field>() {
                Ok(field) if !fields.contains(&field) => fields.push(field),
                Ok(_) => {}
                Err(_) => {
                    if !invalid.iter().any(|n: &String| n == name) {
                        invalid.push(name.to_string());
                    }
                }
            }
        }

        if invalid.is_empty() {
            Ok(fields)
        } else {
            Err(LookupError::InvalidField { fields: invalid })
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| LookupError::InvalidField {
                fields: vec![s.to_string()],
            })
    }
}

/// One customer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub contract_code: String,
    pub phone_number: String,
    pub activation_date: String,
    pub platform: String,
    pub status: String,
    pub average_arpu: String,
    pub service_type: String,
    /// Normalized form of `phone_number`, used as the index key.
    pub phone_key: String,
    pub counters: Counters,
}

impl Record {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ContractCode => &self.contract_code,
            Field::PhoneNumber => &self.phone_number,
            Field::ActivationDate => &self.activation_date,
            Field::Platform => &self.platform,
            Field::Status => &self.status,
            Field::AverageArpu => &self.average_arpu,
            Field::ServiceType => &self.service_type,
        }
    }

    pub fn project(&self, fields: &[Field]) -> Projection {
        Projection {
            entries: fields
                .iter()
                .map(|&f| (f, self.get(f).to_string()))
                .collect(),
        }
    }
}

/// Values from the optional counter columns. A column the file lacks reads
/// as zero, or empty for `user_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub num_contact_tec: i64,
    pub num_contact_amm: i64,
    pub bb_active: i64,
    pub user_name: String,
}

/// Single-value lookups served next to the projection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    TechnicalContacts,
    AdminContacts,
    BroadbandActive,
    UserName,
}

impl Counter {
    pub const ALL: [Counter; 4] = [
        Counter::TechnicalContacts,
        Counter::AdminContacts,
        Counter::BroadbandActive,
        Counter::UserName,
    ];

    /// Source column, also the key of the JSON response.
    pub fn column(&self) -> &'static str {
        match self {
            Counter::TechnicalContacts => "num_contact_tec",
            Counter::AdminContacts => "num_contact_amm",
            Counter::BroadbandActive => "bb_active",
            Counter::UserName => "user_name",
        }
    }

    /// Path segment of the endpoint, e.g. `/customer/numTec/:contract_code`.
    pub fn route(&self) -> &'static str {
        match self {
            Counter::TechnicalContacts => "numTec",
            Counter::AdminContacts => "numAmm",
            Counter::BroadbandActive => "wifiActive",
            Counter::UserName => "userName",
        }
    }
}

impl Counters {
    pub fn read(&self, counter: Counter) -> CounterReading {
        let value = match counter {
            Counter::TechnicalContacts => CounterValue::Count(self.num_contact_tec),
            Counter::AdminContacts => CounterValue::Count(self.num_contact_amm),
            Counter::BroadbandActive => CounterValue::Count(self.bb_active),
            Counter::UserName => CounterValue::Text(self.user_name.clone()),
        };
        CounterReading { counter, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterValue {
    Count(i64),
    Text(String),
}

/// Serializes as a one-entry object keyed by the column name,
/// e.g. `{"num_contact_tec": 3}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterReading {
    pub counter: Counter,
    pub value: CounterValue,
}

impl Serialize for CounterReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match &self.value {
            CounterValue::Count(n) => map.serialize_entry(self.counter.column(), n)?,
            CounterValue::Text(text) => map.serialize_entry(self.counter.column(), text)?,
        }
        map.end()
    }
}

/// A record reduced to the requested attributes, serialized as a JSON object
/// in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    entries: Vec<(Field, String)>,
}

impl Projection {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}
