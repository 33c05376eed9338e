//! Canonical Bencodex encoding and decoding.
//!
//! Every value has exactly one valid encoding. The encoder always produces
//! it, and the decoder rejects anything else, so encoded bytes (or a digest
//! of them) can serve as a content identifier.
//!
//! # Grammar
//!
//! | Kind       | Format                    | Example            |
//! |------------|---------------------------|--------------------|
//! | Null       | `n`                       | `n`                |
//! | Boolean    | `t` / `f`                 | `t`                |
//! | Integer    | `i<digits>e`              | `i-42e`            |
//! | Binary     | `<length>:<bytes>`        | `4:spam`           |
//! | Text       | `u<length>:<utf-8>`       | `u4:spam`          |
//! | List       | `l<members>e`             | `li1eu1:ae`        |
//! | Dictionary | `d<key><member>...e`      | `d1:ai1eu1:bi2ee`  |
//! | Reference  | `*<length>:<fingerprint>` | (offloaded member) |
//!
//! Dictionary keys are binary or text strings and appear in strictly
//! ascending order: all binary keys first, then all text keys, each group
//! ordered by raw bytes. References only stand in for list elements and
//! dictionary values, and only when the decoder is configured to accept
//! them (see [`ReferenceMode`]).
//!
//! # Examples
//!
//! ```
//! use bencodex::{decode, encode, Dictionary, Key, List, Value};
//!
//! let value = Value::Dictionary(
//!     Dictionary::from_entries([
//!         (Key::from("list"), Value::List(List::from(vec![
//!             Value::from(0i64),
//!             Value::from(-1i64),
//!             Value::from(b"ab".as_slice()),
//!         ]))),
//!         (Key::from("null"), Value::Null),
//!     ])
//!     .unwrap(),
//! );
//!
//! let bytes = encode(&value).unwrap();
//! assert_eq!(bytes, b"du4:listli0ei-1e2:abeu4:nullne");
//! assert_eq!(decode(&bytes).unwrap(), value);
//! ```
//!
//! # Error Handling
//!
//! - [`DecodeError::UnexpectedEof`] - Input ended inside a value
//! - [`DecodeError::InvalidInteger`] - Leading zeros, `-0`, missing digits
//! - [`DecodeError::LengthExceedsInput`] - A length prefix larger than the input
//! - [`DecodeError::UnsortedKeys`] / [`DecodeError::DuplicateKey`] - Non-canonical dictionaries
//! - [`DecodeError::TrailingData`] - Extra bytes after the value

mod decode;
mod encode;
mod error;
mod source;

pub use decode::{decode, decode_from, Decoder, ReferenceMode};
pub use encode::{encode, encode_to, encode_to_with, encode_with};
pub use error::{DecodeError, EncodeError};
