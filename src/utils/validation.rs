use crate::domain::model::Field;
use crate::utils::error::{LookupError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Delimiters are handed to the csv reader as a single byte.
pub fn validate_delimiter(field_name: &str, delimiter: &str) -> Result<u8> {
    let mut chars = delimiter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: delimiter.to_string(),
            reason: "Delimiter must be a single ASCII character other than quote or newline"
                .to_string(),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Resolves a configured field list against the closed set of attributes.
pub fn validate_field_names(field_name: &str, names: &[String]) -> Result<Vec<Field>> {
    if names.iter().all(|n| n.trim().is_empty()) {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one field must be listed".to_string(),
        });
    }

    Field::parse_list(names.iter().map(String::as_str)).map_err(|e| match e {
        LookupError::InvalidField { fields } => LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: fields.join(","),
            reason: format!("Unknown field(s). Valid fields: {}", Field::names().join(", ")),
        },
        other => other,
    })
}
