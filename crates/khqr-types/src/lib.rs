#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core encoder for Bakong KHQR payment payloads.
//!
//! A KHQR payload is the text behind a Cambodian payment QR code: a flat
//! sequence of EMV tag-length-value elements, some of which nest further
//! elements, terminated by a CRC-16 checksum element. This crate turns a
//! [`PayloadRequest`](payload::PayloadRequest) into that string.
//!
//! # Modules
//!
//! - [`catalog`] - Field table: tags, length ceilings, defaults and fixed literals
//! - [`checksum`] - CRC-16/CCITT-FALSE
//! - [`tlv`] - Tag-length-value element construction and decoding
//! - [`fields`] - One encoder per semantic field
//! - [`payload`] - Payload assembly and checksum verification
//! - [`digest`] - MD5 digest used to look up transactions
//! - [`config`] - Gateway configuration and environment variable resolution
//! - [`error`] - Encoding errors
//!
//! # Example
//!
//! ```
//! use khqr_types::payload::{PayloadRequest, assemble};
//! use khqr_types::digest::md5_hex;
//!
//! let request = PayloadRequest::new("your_name@wing", "Your Name", "Phnom Penh", "USD")
//!     .with_amount(1.5);
//! let payload = assemble(&request).unwrap();
//! let digest = md5_hex(&payload);
//! assert_eq!(digest.len(), 32);
//! ```

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod digest;
pub mod error;
pub mod fields;
pub mod payload;
pub mod tlv;

pub use error::{EncodeError, UnsupportedValueError, ValidationError};
pub use payload::{KhqrEncoder, PayloadRequest, assemble};
