//! Merchant name (tag `59`) and merchant city (tag `60`).
//!
//! Both are mandatory: an empty input is an error, never replaced by a default.

use super::{check_length, element, require};
use crate::catalog::{Field, FieldCatalog, FieldDefinition};
use crate::error::EncodeError;
use crate::tlv::TlvElement;

fn encode_mandatory(definition: &FieldDefinition, value: &str) -> Result<TlvElement, EncodeError> {
    require(definition, value)?;
    check_length(definition, value)?;
    Ok(element(definition, value)?)
}

/// Encodes the merchant name, at most 25 bytes.
#[derive(Debug, Clone, Copy)]
pub struct MerchantName {
    definition: FieldDefinition,
}

impl MerchantName {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            definition: *catalog.definition(Field::MerchantName),
        }
    }

    pub fn encode(&self, merchant_name: &str) -> Result<TlvElement, EncodeError> {
        encode_mandatory(&self.definition, merchant_name)
    }
}

/// Encodes the merchant city, at most 15 bytes.
#[derive(Debug, Clone, Copy)]
pub struct MerchantCity {
    definition: FieldDefinition,
}

impl MerchantCity {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            definition: *catalog.definition(Field::MerchantCity),
        }
    }

    pub fn encode(&self, merchant_city: &str) -> Result<TlvElement, EncodeError> {
        encode_mandatory(&self.definition, merchant_city)
    }
}
