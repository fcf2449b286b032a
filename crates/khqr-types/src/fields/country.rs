//! Country code (tag `58`).

use super::{check_length, element, or_default};
use crate::catalog::{Field, FieldCatalog, FieldDefinition};
use crate::error::EncodeError;
use crate::tlv::TlvElement;

/// Encodes the merchant country; empty input falls back to `KH`.
#[derive(Debug, Clone, Copy)]
pub struct CountryCode {
    definition: FieldDefinition,
}

impl CountryCode {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            definition: *catalog.definition(Field::CountryCode),
        }
    }

    pub fn encode(&self, country_code: &str) -> Result<TlvElement, EncodeError> {
        let country_code = or_default(&self.definition, country_code);
        check_length(&self.definition, country_code)?;
        Ok(element(&self.definition, country_code)?)
    }
}
