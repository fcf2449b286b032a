//! Errors produced while encoding a KHQR payload.
//!
//! Every encoder validates its input before rendering anything, so an error
//! always means that no element (and no partial payload) was produced.

use crate::catalog::Field;

/// An input violates a field's length, emptiness, format or range constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A mandatory field without a default was left empty.
    #[error("{field} cannot be empty")]
    Empty { field: Field },
    /// The input is longer than the field allows.
    #[error("{field} cannot exceed {max} characters, your input length: {actual} characters")]
    TooLong {
        field: Field,
        max: usize,
        actual: usize,
    },
    /// The merchant category code is not a numeric string of at least four digits.
    #[error("category code must be a numeric string with at least 4 digits, got '{value}'")]
    InvalidCategoryCode { value: String },
    /// The amount is not a non-negative finite number.
    #[error("invalid amount value '{value}', amount must be a number or a string representing a number")]
    InvalidAmount { value: String },
    /// A value does not fit in a two-digit length prefix.
    #[error("value of tag {tag} is {length} bytes long, a TLV value cannot exceed 99 bytes")]
    ValueTooLong { tag: String, length: usize },
    /// A tag is not exactly two ASCII digits.
    #[error("invalid tag '{tag}', a tag must be two ASCII digits")]
    InvalidTag { tag: String },
}

/// A well-formed input outside the encoder's fixed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnsupportedValueError {
    #[error("unsupported currency code '{code}', supported codes are 'USD' and 'KHR'")]
    Currency { code: String },
}

/// Any failure of a field encoder or of the payload assembler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedValueError),
}

impl EncodeError {
    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            EncodeError::Validation(e) => Some(e),
            EncodeError::Unsupported(_) => None,
        }
    }
}
