//! Payload format indicator (tag `00`) and point of initiation method (tag `01`).

use serde::{Deserialize, Serialize};

use super::{element, require};
use crate::catalog::{DYNAMIC_QR, Field, FieldCatalog, FieldDefinition, STATIC_QR};
use crate::error::EncodeError;
use crate::tlv::TlvElement;

/// Whether the QR carries a fixed amount.
///
/// A static QR is reusable for any amount and never contains tag `54`.
/// A dynamic QR embeds one amount and is meant to be paid once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrMode {
    Static,
    #[default]
    Dynamic,
}

impl QrMode {
    pub fn from_static_flag(is_static: bool) -> Self {
        if is_static {
            QrMode::Static
        } else {
            QrMode::Dynamic
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, QrMode::Static)
    }
}

/// Encodes the fixed payload format indicator, `000201`.
#[derive(Debug, Clone, Copy)]
pub struct PayloadFormatIndicator {
    definition: FieldDefinition,
}

impl PayloadFormatIndicator {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            definition: *catalog.definition(Field::PayloadFormatIndicator),
        }
    }

    pub fn encode(&self) -> Result<TlvElement, EncodeError> {
        let value = self.definition.default.unwrap_or_default();
        require(&self.definition, value)?;
        Ok(element(&self.definition, value)?)
    }
}

/// Encodes the point of initiation method: `010211` for static QRs,
/// `010212` for dynamic ones.
#[derive(Debug, Clone, Copy)]
pub struct PointOfInitiation {
    definition: FieldDefinition,
}

impl PointOfInitiation {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            definition: *catalog.definition(Field::PointOfInitiation),
        }
    }

    pub fn encode(&self, mode: QrMode) -> Result<TlvElement, EncodeError> {
        let value = match mode {
            QrMode::Static => STATIC_QR,
            QrMode::Dynamic => DYNAMIC_QR,
        };
        Ok(element(&self.definition, value)?)
    }
}
