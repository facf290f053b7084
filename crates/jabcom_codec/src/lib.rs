//! # Jabcom Codec
//!
//! Keys, field values and records for Jabcom, plus their canonical encodings.
//!
//! This crate provides:
//! - [`Key`]: hierarchical record keys (ancestor path + leaf `kind:id`)
//! - [`encode_key`] / [`decode_key`]: the canonical, bijective string form of keys
//! - [`Value`] and [`FieldValue`]: dynamic field values and typed conversions
//! - [`Record`]: the backend-neutral key + fields representation
//! - Deterministic CBOR encoding of values and records for persistent backends
//!
//! ## Canonical CBOR Rules
//!
//! - Maps have text keys sorted length-first, then bytewise
//! - Integers use shortest encoding
//! - No floats
//! - No indefinite-length items
//! - Keys are tagged text holding their canonical string form
//!
//! ## Usage
//!
//! ```
//! use jabcom_codec::{decode_record, encode_record, Key, Record};
//!
//! let record = Record::new(Key::from_id("parent", 1).unwrap()).with("name", "first");
//! let bytes = encode_record(&record).unwrap();
//! assert_eq!(decode_record(&bytes).unwrap(), record);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod key;
mod key_codec;
mod record;
mod value;

pub use decoder::{decode_record, from_cbor, CanonicalDecoder};
pub use encoder::{encode_record, to_canonical_cbor, CanonicalEncoder, KEY_TAG};
pub use error::{CodecError, CodecResult, KeyError, KeyResult};
pub use key::{Key, KeyId, PathElement};
pub use key_codec::{decode_key, encode_key};
pub use record::Record;
pub use value::{FieldValue, Value};
