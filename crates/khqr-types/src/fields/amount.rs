//! Transaction amount (tag `54`).
//!
//! Callers hand in an integer, a float or a numeric string. All three are
//! normalized to one canonical decimal string first, then left-padded to
//! [`AMOUNT_MIN_WIDTH`] characters and wrapped under the amount tag.
//!
//! ```
//! use khqr_types::catalog::FieldCatalog;
//! use khqr_types::fields::{Amount, AmountPadding, TransactionAmount};
//!
//! let encoder = TransactionAmount::new(&FieldCatalog::khqr(), AmountPadding::Zero);
//! let element = encoder.encode(&Amount::from(10000.0)).unwrap();
//! assert_eq!(element.to_string(), "541100000010000");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use super::element;
use crate::catalog::{AMOUNT_MIN_WIDTH, Field, FieldCatalog, FieldDefinition};
use crate::error::{EncodeError, ValidationError};
use crate::tlv::TlvElement;

/// Plain non-negative decimal: `123`, `12.`, `12.5` or `.5`.
static DECIMAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+\.?[0-9]*|\.[0-9]+)$").expect("valid regex"));

/// A transaction amount in one of the accepted input shapes.
///
/// Deserializes from a JSON integer, float or string, in that order of
/// preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Integer(i64),
    Float(f64),
    /// A plain non-negative decimal: ASCII digits with at most one `.`, such as
    /// `10000`, `12.`, `12.50` or `.5`. Used verbatim apart from trailing-zero
    /// stripping.
    ///
    /// Signs (`+5`, `-5`), exponents (`1e3`), whitespace and digit grouping
    /// (`1,000`) are rejected.
    Text(String),
}

impl Amount {
    /// Normalizes the amount to its canonical decimal string.
    ///
    /// Floats are rounded to two decimals. Whenever the result contains a
    /// decimal point, trailing zeros and a dangling point are stripped, so
    /// `10000.00` becomes `10000` and `10.50` becomes `10.5`.
    pub fn to_canonical(&self) -> Result<String, ValidationError> {
        let digits = match self {
            Amount::Integer(value) if *value >= 0 => value.to_string(),
            Amount::Float(value) if value.is_finite() && *value >= 0.0 => {
                format!("{:.2}", value.abs())
            }
            Amount::Text(value) if DECIMAL_PATTERN.is_match(value) => value.clone(),
            _ => {
                return Err(ValidationError::InvalidAmount {
                    value: self.to_string(),
                });
            }
        };
        if !digits.contains('.') {
            return Ok(digits);
        }
        let stripped = digits.trim_end_matches('0').trim_end_matches('.');
        if stripped.is_empty() {
            Ok("0".to_string())
        } else {
            Ok(stripped.to_string())
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Amount::Integer(value) => write!(f, "{value}"),
            Amount::Float(value) => write!(f, "{value}"),
            Amount::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Integer(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::Integer(value.into())
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount::Integer(value.into())
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Float(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Text(value)
    }
}

/// Character used to left-pad the amount to its minimum width.
///
/// [`AmountPadding::Space`] is what deployed Bakong encoders emit today.
/// [`AmountPadding::Zero`] is what the EMV numeric convention suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountPadding {
    #[default]
    Space,
    Zero,
}

impl AmountPadding {
    /// Left-pads `digits` to [`AMOUNT_MIN_WIDTH`]. Longer inputs are returned as is.
    pub fn pad(&self, digits: &str) -> String {
        match self {
            AmountPadding::Space => format!("{digits:>AMOUNT_MIN_WIDTH$}"),
            AmountPadding::Zero => format!("{digits:0>AMOUNT_MIN_WIDTH$}"),
        }
    }
}

/// Encodes the transaction amount. Only used for dynamic QRs.
#[derive(Debug, Clone, Copy)]
pub struct TransactionAmount {
    definition: FieldDefinition,
    padding: AmountPadding,
}

impl TransactionAmount {
    pub fn new(catalog: &FieldCatalog, padding: AmountPadding) -> Self {
        Self {
            definition: *catalog.definition(Field::TransactionAmount),
            padding,
        }
    }

    pub fn encode(&self, amount: &Amount) -> Result<TlvElement, EncodeError> {
        let digits = amount.to_canonical()?;
        // The field budget covers the tag as well as the digits.
        let length = self.definition.tag.len() + digits.len();
        if length > self.definition.max_length {
            return Err(ValidationError::TooLong {
                field: self.definition.field,
                max: self.definition.max_length,
                actual: length,
            }
            .into());
        }
        Ok(element(&self.definition, self.padding.pad(&digits))?)
    }
}
