//! Merchant account information (tag `29`).

use super::{check_length, element};
use crate::catalog::{Field, FieldCatalog, FieldDefinition};
use crate::error::EncodeError;
use crate::tlv::TlvElement;

/// Encodes the merchant's Bakong account reference.
///
/// The account (e.g. `your_name@wing`) is wrapped as sub-element `00` inside
/// template `29`. An empty account is accepted and yields `29040000`.
#[derive(Debug, Clone, Copy)]
pub struct MerchantAccount {
    template: FieldDefinition,
    bank_account: FieldDefinition,
}

impl MerchantAccount {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            template: *catalog.definition(Field::MerchantAccount),
            bank_account: *catalog.definition(Field::BankAccount),
        }
    }

    pub fn encode(&self, bank_account: &str) -> Result<TlvElement, EncodeError> {
        check_length(&self.bank_account, bank_account)?;
        let account = element(&self.bank_account, bank_account)?;
        Ok(TlvElement::nested(self.template.tag, &[account])?)
    }
}
