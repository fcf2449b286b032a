//! Tag-length-value elements.
//!
//! [`TlvElement`] is the only place where a length prefix is computed. Every
//! element, nested or not, is rendered as `tag + two-digit length + value`,
//! and construction fails if the value does not fit in two decimal digits.
//!
//! ```
//! use khqr_types::tlv::TlvElement;
//!
//! let account = TlvElement::new("00", "your_name@wing").unwrap();
//! let outer = TlvElement::nested("29", &[account]).unwrap();
//! assert_eq!(outer.to_string(), "29180014your_name@wing");
//! ```

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use crate::catalog::MAX_TLV_VALUE_LENGTH;
use crate::error::ValidationError;

/// A single `tag + length + value` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvElement {
    tag: Cow<'static, str>,
    value: String,
}

impl TlvElement {
    /// Creates an element, rejecting malformed tags and values longer than 99 bytes.
    pub fn new(
        tag: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let tag = tag.into();
        let value = value.into();
        if !is_tag(tag.as_bytes()) {
            return Err(ValidationError::InvalidTag {
                tag: tag.into_owned(),
            });
        }
        if value.len() > MAX_TLV_VALUE_LENGTH {
            return Err(ValidationError::ValueTooLong {
                tag: tag.into_owned(),
                length: value.len(),
            });
        }
        Ok(Self { tag, value })
    }

    /// Creates an element whose value is the concatenation of `children`.
    pub fn nested(
        tag: impl Into<Cow<'static, str>>,
        children: &[TlvElement],
    ) -> Result<Self, ValidationError> {
        let value = children.iter().fold(String::new(), |mut acc, child| {
            acc.push_str(&child.to_string());
            acc
        });
        Self::new(tag, value)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Length of the value in bytes, i.e. the number written in the length prefix.
    pub fn value_len(&self) -> usize {
        self.value.len()
    }

    /// Length of the fully rendered element.
    pub fn encoded_len(&self) -> usize {
        self.tag.len() + 2 + self.value.len()
    }

    /// Decodes the value of a template element into its sub-elements.
    pub fn children(&self) -> Result<Vec<TlvElement>, DecodeError> {
        decode(&self.value)
    }
}

fn is_tag(tag: &[u8]) -> bool {
    tag.len() == 2 && tag.iter().all(u8::is_ascii_digit)
}

impl Display for TlvElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:02}{}", self.tag, self.value.len(), self.value)
    }
}

/// Errors while splitting a string into TLV elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid tag '{tag}' at offset {offset}")]
    InvalidTag { offset: usize, tag: String },
    #[error("invalid length '{length}' at offset {offset}")]
    InvalidLength { offset: usize, length: String },
    #[error("element at offset {offset} is truncated")]
    Truncated { offset: usize },
}

/// Splits `input` into consecutive top-level elements.
///
/// Template values are not descended into; use [`TlvElement::children`] for that.
pub fn decode(input: &str) -> Result<Vec<TlvElement>, DecodeError> {
    let mut elements = Vec::new();
    let mut offset = 0;
    let bytes = input.as_bytes();
    while offset < bytes.len() {
        let header = bytes
            .get(offset..offset + 4)
            .ok_or(DecodeError::Truncated { offset })?;
        let (tag, length) = header.split_at(2);
        if !is_tag(tag) {
            return Err(DecodeError::InvalidTag {
                offset,
                tag: String::from_utf8_lossy(tag).into_owned(),
            });
        }
        let invalid_length = || DecodeError::InvalidLength {
            offset,
            length: String::from_utf8_lossy(length).into_owned(),
        };
        if !length.iter().all(u8::is_ascii_digit) {
            return Err(invalid_length());
        }
        let value_len = usize::from(length[0] - b'0') * 10 + usize::from(length[1] - b'0');
        let start = offset + 4;
        let end = start + value_len;
        if end > bytes.len() {
            return Err(DecodeError::Truncated { offset });
        }
        // Declared length ends inside a multi-byte character.
        let value = input.get(start..end).ok_or_else(invalid_length)?;
        elements.push(TlvElement {
            tag: Cow::Owned(String::from_utf8_lossy(tag).into_owned()),
            value: value.to_string(),
        });
        offset = start + value_len;
    }
    Ok(elements)
}
