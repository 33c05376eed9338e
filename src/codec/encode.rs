use std::io::Write;

use super::error::EncodeError;
use crate::constants::{
    DICTIONARY, END, FALSE, INTEGER, LENGTH_SEPARATOR, LIST, NULL, REFERENCE, TEXT, TRUE,
};
use crate::offload::OffloadPolicy;
use crate::value::{Fingerprint, IndirectValue, Key, Value};

/// Encodes a value to its canonical bytes, embedding every member.
///
/// Unresolved members are materialized through their own loaders.
///
/// # Errors
///
/// Returns [`EncodeError::Load`] if an unresolved member cannot be loaded.
///
/// # Examples
///
/// ```
/// use bencodex::{encode, Dictionary, Key, List, Value};
///
/// assert_eq!(encode(&Value::Null).unwrap(), b"n");
/// assert_eq!(encode(&Value::from(-42i64)).unwrap(), b"i-42e");
/// assert_eq!(encode(&Value::from("hi")).unwrap(), b"u2:hi");
/// assert_eq!(encode(&Value::from(b"hi".as_slice())).unwrap(), b"2:hi");
///
/// let list = Value::List(List::from(vec![Value::from(true), Value::Null]));
/// assert_eq!(encode(&list).unwrap(), b"ltne");
///
/// let dict = Dictionary::from_entries([
///     (Key::from("b"), Value::from(2i64)),
///     (Key::from(b"a".as_slice()), Value::from(1i64)),
/// ])
/// .unwrap();
/// assert_eq!(encode(&Value::Dictionary(dict)).unwrap(), b"d1:ai1eu1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    encode_to(value, &mut buf)?;
    Ok(buf)
}

/// Encodes a value into `writer`, embedding every member.
pub fn encode_to<W: Write>(value: &Value, writer: W) -> Result<(), EncodeError> {
    Encoder {
        writer,
        policy: None,
    }
    .value(value)
}

/// Encodes a value, letting `policy` offload container members.
///
/// Each list element and dictionary value is offered to
/// [`OffloadPolicy::embeds`]; rejected members are handed to
/// [`OffloadPolicy::offload`] and written as a reference to their
/// fingerprint.
pub fn encode_with(value: &Value, policy: &dyn OffloadPolicy) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    encode_to_with(value, &mut buf, policy)?;
    Ok(buf)
}

/// Encodes a value into `writer`, letting `policy` offload container members.
pub fn encode_to_with<W: Write>(
    value: &Value,
    writer: W,
    policy: &dyn OffloadPolicy,
) -> Result<(), EncodeError> {
    Encoder {
        writer,
        policy: Some(policy),
    }
    .value(value)
}

struct Encoder<'p, W> {
    writer: W,
    policy: Option<&'p dyn OffloadPolicy>,
}

impl<W: Write> Encoder<'_, W> {
    fn value(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.writer.write_all(&[NULL])?,
            Value::Boolean(true) => self.writer.write_all(&[TRUE])?,
            Value::Boolean(false) => self.writer.write_all(&[FALSE])?,
            Value::Integer(i) => {
                self.writer.write_all(&[INTEGER])?;
                write!(self.writer, "{}", i)?;
                self.writer.write_all(&[END])?;
            }
            Value::Binary(b) => self.length_prefixed(b)?,
            Value::Text(s) => {
                self.writer.write_all(&[TEXT])?;
                self.length_prefixed(s.as_bytes())?;
            }
            Value::List(l) => {
                self.writer.write_all(&[LIST])?;
                for member in l {
                    self.member(member)?;
                }
                self.writer.write_all(&[END])?;
            }
            Value::Dictionary(d) => {
                self.writer.write_all(&[DICTIONARY])?;
                for (key, member) in d {
                    self.key(key)?;
                    self.member(member)?;
                }
                self.writer.write_all(&[END])?;
            }
        }
        Ok(())
    }

    fn member(&mut self, node: &IndirectValue) -> Result<(), EncodeError> {
        if let Some(policy) = self.policy {
            if !policy.embeds(node) {
                tracing::trace!(kind = %node.kind(), "offloading member");
                policy.offload(node, node.loader())?;
                return self.reference(&node.fingerprint()?);
            }
        }
        let value = node.resolve()?;
        self.value(value)
    }

    fn key(&mut self, key: &Key) -> Result<(), EncodeError> {
        if key.is_text() {
            self.writer.write_all(&[TEXT])?;
        }
        self.length_prefixed(key.as_bytes())
    }

    fn reference(&mut self, fingerprint: &Fingerprint) -> Result<(), EncodeError> {
        self.writer.write_all(&[REFERENCE])?;
        self.length_prefixed(&fingerprint.to_bytes())
    }

    fn length_prefixed(&mut self, payload: &[u8]) -> Result<(), EncodeError> {
        write!(self.writer, "{}", payload.len())?;
        self.writer.write_all(&[LENGTH_SEPARATOR])?;
        self.writer.write_all(payload)?;
        Ok(())
    }
}
