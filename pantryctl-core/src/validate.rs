//! Request-shape validation helpers.
//!
//! Clients are loose about types: barcodes arrive as a string, a list, or not
//! at all; stock counts arrive as JSON numbers or numeric strings. The
//! helpers here normalize those shapes before anything touches storage.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

/// Validation failure surfaced to clients as a 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required keys absent from the request body.
    MissingFields,

    /// Barcode payload absent or blank.
    MissingBarcode,

    /// Field could not be coerced to an integer.
    NotAnInteger { field: &'static str },

    /// Field must be a positive integer.
    NotPositive { field: &'static str },

    /// Date field not in YYYY-MM-DD form.
    BadDate { field: &'static str },

    /// Item category not in the known category set.
    UnknownCategory,

    /// Transaction type other than restock/usage.
    BadTransactionKind,

    /// Project status other than the known variants.
    BadProjectStatus,

    /// Request body was not decodable JSON of the expected shape.
    MalformedBody { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Missing required fields"),
            Self::MissingBarcode => write!(f, "Barcode is required"),
            Self::NotAnInteger { field } => write!(f, "{} must be an integer", field),
            Self::NotPositive { field } => write!(f, "{} must be a positive integer", field),
            Self::BadDate { field } => write!(f, "{} must be a YYYY-MM-DD date", field),
            Self::UnknownCategory => write!(f, "Invalid category"),
            Self::BadTransactionKind => write!(f, "Invalid transaction type"),
            Self::BadProjectStatus => write!(f, "Invalid project status"),
            Self::MalformedBody { reason } => write!(f, "Invalid request body: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Normalize a barcode payload to a deduplicated, sorted set of trimmed,
/// non-empty strings.
///
/// Accepts a single string, a list of strings, or nothing. Any other shape
/// (and any non-string list entry) normalizes to nothing.
pub fn normalize_barcodes(value: Option<&Value>) -> Vec<String> {
    let mut set = BTreeSet::new();
    match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            if !s.is_empty() {
                set.insert(s.to_owned());
            }
        }
        Some(Value::Array(entries)) => {
            for entry in entries {
                if let Value::String(s) = entry {
                    let s = s.trim();
                    if !s.is_empty() {
                        set.insert(s.to_owned());
                    }
                }
            }
        }
        _ => {}
    }
    set.into_iter().collect()
}

/// Coerce a JSON value to an integer the way the clients expect: a JSON
/// number (fractions truncate) or a string holding one.
pub fn coerce_int(value: &Value, field: &'static str) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                Ok(f.trunc() as i64)
            } else {
                Err(ValidationError::NotAnInteger { field })
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotAnInteger { field }),
        _ => Err(ValidationError::NotAnInteger { field }),
    }
}

/// Coerce like [`coerce_int`] and additionally require a strictly positive
/// result. Used for transaction quantities.
pub fn coerce_positive_int(value: &Value, field: &'static str) -> Result<i64, ValidationError> {
    let n = coerce_int(value, field)?;
    if n <= 0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(n)
}

/// Parse a YYYY-MM-DD date field.
pub fn parse_date(s: &str, field: &'static str) -> Result<chrono::NaiveDate, ValidationError> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::BadDate { field })
}
