//! Additional data template (tag `62`).

use super::{check_length, element};
use crate::catalog::{Field, FieldCatalog, FieldDefinition};
use crate::error::EncodeError;
use crate::tlv::TlvElement;

/// Encodes bill number, mobile number, store label and terminal label.
///
/// Every input is validated against its own 25-byte limit before anything is
/// rendered. All four sub-elements are always present, empty ones as
/// zero-length values, in wire order `01`, `02`, `03`, `07`.
#[derive(Debug, Clone, Copy)]
pub struct AdditionalData {
    template: FieldDefinition,
    bill_number: FieldDefinition,
    mobile_number: FieldDefinition,
    store_label: FieldDefinition,
    terminal_label: FieldDefinition,
}

impl AdditionalData {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            template: *catalog.definition(Field::AdditionalData),
            bill_number: *catalog.definition(Field::BillNumber),
            mobile_number: *catalog.definition(Field::MobileNumber),
            store_label: *catalog.definition(Field::StoreLabel),
            terminal_label: *catalog.definition(Field::TerminalLabel),
        }
    }

    pub fn encode(
        &self,
        store_label: &str,
        mobile_number: &str,
        bill_number: &str,
        terminal_label: &str,
    ) -> Result<TlvElement, EncodeError> {
        check_length(&self.store_label, store_label)?;
        check_length(&self.mobile_number, mobile_number)?;
        check_length(&self.bill_number, bill_number)?;
        check_length(&self.terminal_label, terminal_label)?;

        let children = [
            element(&self.bill_number, bill_number)?,
            element(&self.mobile_number, mobile_number)?,
            element(&self.store_label, store_label)?,
            element(&self.terminal_label, terminal_label)?,
        ];
        Ok(TlvElement::nested(self.template.tag, &children)?)
    }
}
