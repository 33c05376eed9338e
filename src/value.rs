//! The Bencodex value model.
//!
//! A [`Value`] is one of seven kinds. Containers hold their members as
//! [`IndirectValue`]s, which lets any member be replaced by a
//! [`Fingerprint`] reference and materialized later.
//!
//! | Kind       | Rust type                  |
//! |------------|----------------------------|
//! | Null       | `Value::Null`              |
//! | Boolean    | `Value::Boolean(bool)`     |
//! | Integer    | `Value::Integer(BigInt)`   |
//! | Binary     | `Value::Binary(Bytes)`     |
//! | Text       | `Value::Text(String)`      |
//! | List       | `Value::List(List)`        |
//! | Dictionary | `Value::Dictionary(Dictionary)` |
//!
//! Values are never mutated after construction and are safe to share across
//! threads.

mod collections;
mod fingerprint;
mod indirect;
mod key;
mod kind;

pub use collections::{Dictionary, DuplicateKeyError, List};
pub use fingerprint::Fingerprint;
pub use indirect::IndirectValue;
pub use key::Key;
pub use kind::ValueKind;

use bytes::Bytes;
use num_bigint::BigInt;

use crate::codec::{encode, EncodeError};
use crate::offload::LoadError;


/// A Bencodex value.
///
/// # Examples
///
/// ```
/// use bencodex::{List, Value, ValueKind};
///
/// let int: Value = 42i64.into();
/// let text: Value = "hello".into();
/// let list = Value::List(List::from(vec![int.clone(), text]));
///
/// assert_eq!(list.kind(), ValueKind::List);
/// assert_eq!(int.as_i64(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Boolean(bool),
    /// An arbitrary-precision signed integer.
    Integer(BigInt),
    /// Raw bytes with no text encoding.
    Binary(Bytes),
    /// A Unicode string, encoded as UTF-8 on the wire.
    Text(String),
    List(List),
    Dictionary(Dictionary),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Binary(_) => ValueKind::Binary,
            Value::Text(_) => ValueKind::Text,
            Value::List(_) => ValueKind::List,
            Value::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the integer if it fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|i| i64::try_from(i).ok())
    }

    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    pub fn get(&self, key: impl Into<Key>) -> Option<&IndirectValue> {
        self.as_dictionary()?.get(&key.into())
    }

    /// Computes the canonical [`Fingerprint`] of this value.
    pub fn fingerprint(&self) -> Result<Fingerprint, LoadError> {
        Fingerprint::of(self)
    }

    /// Length of the fully embedded canonical encoding, measured without
    /// encoding or hashing.
    ///
    /// Members contribute their cached lengths; unresolved members answer
    /// from their fingerprint and are not loaded.
    pub fn encoding_length(&self) -> Result<u64, LoadError> {
        Ok(match self {
            Value::Null | Value::Boolean(_) => 1,
            Value::Integer(i) => 2 + i.to_string().len() as u64,
            Value::Binary(b) => length_prefixed(b.len()),
            Value::Text(s) => 1 + length_prefixed(s.len()),
            Value::List(list) => {
                2 + list
                    .iter()
                    .map(IndirectValue::encoding_length)
                    .sum::<Result<u64, _>>()?
            }
            Value::Dictionary(dict) => {
                let mut len = 2;
                for (key, member) in dict.iter() {
                    len += match key {
                        Key::Binary(b) => length_prefixed(b.len()),
                        Key::Text(s) => 1 + length_prefixed(s.len()),
                    };
                    len += member.encoding_length()?;
                }
                len
            }
        })
    }

    /// Returns the fully embedded canonical encoding of this value.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        encode(self)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(BigInt::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Integer(BigInt::from(i))
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Binary(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Binary(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(Bytes::from(b))
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Binary(b) => Value::Binary(b),
            Key::Text(s) => Value::Text(s),
        }
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Value::Dictionary(d)
    }
}

/// Length of a `<len>:<payload>` string.
fn length_prefixed(len: usize) -> u64 {
    len.to_string().len() as u64 + 1 + len as u64
}
