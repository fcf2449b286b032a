//! Field encoders.
//!
//! One encoder per semantic field of the payload. Each encoder is built from a
//! [`FieldCatalog`](crate::catalog::FieldCatalog), validates its raw input and
//! renders exactly one [`TlvElement`]. Composite encoders
//! ([`MerchantAccount`], [`AdditionalData`], [`Timestamp`]) build their
//! sub-elements the same way and wrap them with [`TlvElement::nested`].
//!
//! | Encoder | Tag | Input |
//! |---------|-----|-------|
//! | [`PayloadFormatIndicator`] | 00 | none |
//! | [`PointOfInitiation`] | 01 | [`QrMode`] |
//! | [`MerchantAccount`] | 29 | bank account reference |
//! | [`CategoryCode`] | 52 | MCC, default `5999` |
//! | [`TransactionCurrency`] | 53 | `USD` / `KHR` |
//! | [`TransactionAmount`] | 54 | [`Amount`] |
//! | [`CountryCode`] | 58 | ISO 3166 alpha-2, default `KH` |
//! | [`MerchantName`] | 59 | mandatory text |
//! | [`MerchantCity`] | 60 | mandatory text |
//! | [`AdditionalData`] | 62 | bill, mobile, store, terminal |
//! | [`Timestamp`] | 99 | [`Clock`] |

pub mod account;
pub mod additional_data;
pub mod amount;
pub mod category;
pub mod country;
pub mod currency;
pub mod initiation;
pub mod merchant;
pub mod timestamp;

pub use account::*;
pub use additional_data::*;
pub use amount::*;
pub use category::*;
pub use country::*;
pub use currency::*;
pub use initiation::*;
pub use merchant::*;
pub use timestamp::*;

use crate::catalog::FieldDefinition;
use crate::error::ValidationError;
use crate::tlv::TlvElement;

/// Rejects `value` if it is longer than the field allows.
fn check_length(definition: &FieldDefinition, value: &str) -> Result<(), ValidationError> {
    if value.len() > definition.max_length {
        return Err(ValidationError::TooLong {
            field: definition.field,
            max: definition.max_length,
            actual: value.len(),
        });
    }
    Ok(())
}

/// Returns the field default when `value` is empty.
fn or_default<'a>(definition: &FieldDefinition, value: &'a str) -> &'a str {
    match definition.default {
        Some(default) if value.is_empty() => default,
        _ => value,
    }
}

/// Rejects an empty `value`.
fn require(definition: &FieldDefinition, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty {
            field: definition.field,
        });
    }
    Ok(())
}

/// Wraps `value` under the field's tag.
fn element(
    definition: &FieldDefinition,
    value: impl Into<String>,
) -> Result<TlvElement, ValidationError> {
    TlvElement::new(definition.tag, value)
}
