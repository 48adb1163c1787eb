// CLI parsing utilities for record commands

use serde_json::{Map, Number, Value};

use crate::cli::error::validate_field_key;

/// Parsed record arguments from command line
#[derive(Debug, Default)]
pub struct ParsedRecordArgs {
    pub name: Vec<String>,
    pub fields: Map<String, Value>,
}

impl ParsedRecordArgs {
    /// Name words joined with spaces
    pub fn name(&self) -> String {
        self.name.join(" ")
    }
}

#[derive(Debug)]
pub enum FieldParseError {
    InvalidFieldName {
        token: String,
        reason: String,
    },
    DuplicateField {
        field: String,
    },
    MissingName,
}

impl std::fmt::Display for FieldParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldParseError::InvalidFieldName { token, reason } => {
                write!(f, "Unrecognized field token '{}'\n  {}", token, reason)
            }
            FieldParseError::DuplicateField { field } => {
                write!(f, "Field '{}' given more than once", field)
            }
            FieldParseError::MissingName => {
                write!(f, "Record name cannot be empty")
            }
        }
    }
}

/// JSON value for a `field=value` token
///
/// Numbers stay numeric so card values format as currency; an empty value
/// clears the field.
fn parse_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

/// Parse `add` arguments: `field=value` tokens are fields, the rest is the name
pub fn parse_record_args(args: Vec<String>) -> Result<ParsedRecordArgs, FieldParseError> {
    let mut parsed = ParsedRecordArgs::default();

    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) => {
                validate_field_key(key).map_err(|reason| FieldParseError::InvalidFieldName {
                    token: arg.clone(),
                    reason,
                })?;
                if parsed.fields.contains_key(key) {
                    return Err(FieldParseError::DuplicateField { field: key.to_string() });
                }
                parsed.fields.insert(key.to_string(), parse_value(value));
            }
            None => parsed.name.push(arg),
        }
    }

    if parsed.name().trim().is_empty() {
        return Err(FieldParseError::MissingName);
    }
    Ok(parsed)
}
