//! Merchant category code (tag `52`).

use super::{check_length, element, or_default};
use crate::catalog::{Field, FieldCatalog, FieldDefinition};
use crate::error::{EncodeError, ValidationError};
use crate::tlv::TlvElement;

/// Minimum number of digits in a category code.
const MIN_DIGITS: usize = 4;

/// Encodes the ISO 18245 merchant category code.
///
/// Empty input falls back to `5999` (miscellaneous retail). Anything else must
/// be purely numeric and at least four digits long.
#[derive(Debug, Clone, Copy)]
pub struct CategoryCode {
    definition: FieldDefinition,
}

impl CategoryCode {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            definition: *catalog.definition(Field::CategoryCode),
        }
    }

    pub fn encode(&self, category_code: &str) -> Result<TlvElement, EncodeError> {
        let category_code = or_default(&self.definition, category_code);
        if category_code.len() < MIN_DIGITS || !category_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidCategoryCode {
                value: category_code.to_string(),
            }
            .into());
        }
        check_length(&self.definition, category_code)?;
        Ok(element(&self.definition, category_code)?)
    }
}
