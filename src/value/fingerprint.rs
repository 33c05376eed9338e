use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::fmt;
use std::io::{self, Write};

use super::kind::ValueKind;
use super::Value;
use crate::codec::{encode_to, EncodeError};
use crate::constants::FINGERPRINT_HEADER_LEN;
use crate::offload::LoadError;

/// Identifies an offloaded value.
///
/// A fingerprint carries the kind of the value and the length of its
/// canonical encoding next to a digest, so offload policies can make size
/// decisions about unresolved nodes without loading them.
///
/// Serialized as one kind byte, the encoding length as a big-endian `u64`,
/// then the digest bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    kind: ValueKind,
    encoding_length: u64,
    digest: Bytes,
}

impl Fingerprint {
    pub fn new(kind: ValueKind, encoding_length: u64, digest: impl Into<Bytes>) -> Self {
        Self {
            kind,
            encoding_length,
            digest: digest.into(),
        }
    }

    /// Computes the canonical fingerprint of a value.
    ///
    /// The digest is SHA-1 over the fully embedded canonical encoding, so it
    /// depends on logical content only. Unresolved nodes inside `value` are
    /// materialized through their own loaders.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if a nested unresolved node cannot be loaded.
    ///
    /// # Examples
    ///
    /// ```
    /// use bencodex::{Fingerprint, Value, ValueKind};
    ///
    /// let fp = Fingerprint::of(&Value::from("hello")).unwrap();
    /// assert_eq!(fp.kind(), ValueKind::Text);
    /// assert_eq!(fp.encoding_length(), 8); // u5:hello
    /// assert_eq!(fp.digest().len(), 20);
    /// ```
    pub fn of(value: &Value) -> Result<Self, LoadError> {
        let mut writer = DigestWriter::default();
        encode_to(value, &mut writer).map_err(|e| match e {
            EncodeError::Load(e) => e,
            other => LoadError::Encode(Box::new(other)),
        })?;
        Ok(Self {
            kind: value.kind(),
            encoding_length: writer.written,
            digest: Bytes::copy_from_slice(&writer.hasher.finalize()),
        })
    }

    /// Parses a serialized fingerprint.
    ///
    /// Returns `None` if the header is truncated or names an unknown kind.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < FINGERPRINT_HEADER_LEN {
            return None;
        }
        let kind = ValueKind::from_code(bytes[0])?;
        let mut length = [0u8; 8];
        length.copy_from_slice(&bytes[1..FINGERPRINT_HEADER_LEN]);
        Some(Self {
            kind,
            encoding_length: u64::from_be_bytes(length),
            digest: Bytes::copy_from_slice(&bytes[FINGERPRINT_HEADER_LEN..]),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FINGERPRINT_HEADER_LEN + self.digest.len());
        out.push(self.kind.code());
        out.extend_from_slice(&self.encoding_length.to_be_bytes());
        out.extend_from_slice(&self.digest);
        out
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Length in bytes of the fingerprinted value's fully embedded encoding.
    pub fn encoding_length(&self) -> u64 {
        self.encoding_length
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.to_bytes())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fingerprint({}, {}, {})",
            self.kind,
            self.encoding_length,
            hex_encode(&self.digest)
        )
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[derive(Default)]
struct DigestWriter {
    hasher: Sha1,
    written: u64,
}

impl Write for DigestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
        s
    })
}
