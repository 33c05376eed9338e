use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use bytes::Bytes;
use num_bigint::BigInt;

use super::error::DecodeError;
use super::source::{ReaderSource, SliceSource, Source};
use crate::constants::{
    DEFAULT_MAX_DEPTH, DICTIONARY, END, FALSE, INTEGER, LENGTH_SEPARATOR, LIST, NULL, REFERENCE,
    TEXT, TRUE,
};
use crate::offload::Loader;
use crate::value::{Dictionary, Fingerprint, IndirectValue, Key, List, Value};

/// How the decoder treats reference tokens.
#[derive(Clone, Default)]
pub enum ReferenceMode {
    /// References are a decode error.
    #[default]
    Reject,
    /// References become unresolved nodes with no loader attached.
    Keep,
    /// References are loaded while decoding; load failures fail the decode.
    Eager(Arc<dyn Loader>),
    /// References become unresolved nodes that load themselves on demand.
    Lazy(Arc<dyn Loader>),
}

impl fmt::Debug for ReferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceMode::Reject => f.write_str("Reject"),
            ReferenceMode::Keep => f.write_str("Keep"),
            ReferenceMode::Eager(_) => f.write_str("Eager(..)"),
            ReferenceMode::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A configurable decoder.
///
/// [`decode`] and [`decode_from`] use the default configuration: references
/// and trailing data are rejected.
///
/// # Examples
///
/// ```
/// use bencodex::{Decoder, DecodeError};
///
/// let decoder = Decoder::new().allow_trailing(true);
/// assert_eq!(decoder.decode(b"i1eextra").unwrap().as_i64(), Some(1));
///
/// let strict = Decoder::new();
/// assert!(matches!(
///     strict.decode(b"i1eextra"),
///     Err(DecodeError::TrailingData { offset: 3 })
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    references: ReferenceMode,
    allow_trailing: bool,
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            references: ReferenceMode::Reject,
            allow_trailing: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn references(mut self, mode: ReferenceMode) -> Self {
        self.references = mode;
        self
    }

    /// Accept input that continues after the top-level value.
    pub fn allow_trailing(mut self, allow: bool) -> Self {
        self.allow_trailing = allow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Decodes a single value from a byte slice.
    pub fn decode(&self, data: &[u8]) -> Result<Value, DecodeError> {
        let mut parser = Parser {
            source: SliceSource::new(data),
            decoder: self,
        };
        let value = parser.value(0)?;
        let offset = parser.source.offset();
        if !self.allow_trailing && offset != data.len() {
            return Err(DecodeError::TrailingData { offset });
        }
        Ok(value)
    }

    /// Decodes a single value from a reader.
    ///
    /// Unless trailing data is allowed, the reader must be exhausted after
    /// the value.
    pub fn decode_from<R: Read>(&self, reader: R) -> Result<Value, DecodeError> {
        let mut reader = BufReader::new(reader);
        let mut parser = Parser {
            source: ReaderSource::new(&mut reader),
            decoder: self,
        };
        let value = parser.value(0)?;
        if !self.allow_trailing && parser.source.peek()?.is_some() {
            return Err(DecodeError::TrailingData {
                offset: parser.source.offset(),
            });
        }
        Ok(value)
    }

    /// Decodes the next value from a buffered stream and leaves the rest of
    /// the stream unread.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use bencodex::Decoder;
    ///
    /// let mut stream = Cursor::new(b"i1eu2:hi".to_vec());
    /// let decoder = Decoder::new();
    /// assert_eq!(decoder.decode_next(&mut stream).unwrap().as_i64(), Some(1));
    /// assert_eq!(decoder.decode_next(&mut stream).unwrap().as_text(), Some("hi"));
    /// ```
    pub fn decode_next<R: BufRead>(&self, reader: &mut R) -> Result<Value, DecodeError> {
        Parser {
            source: ReaderSource::new(reader),
            decoder: self,
        }
        .value(0)
    }
}

/// Decodes a canonical value from a byte slice.
///
/// # Errors
///
/// Fails on any grammar or canonical-form violation, on trailing data, and
/// on reference tokens.
///
/// # Examples
///
/// ```
/// use bencodex::decode;
///
/// let value = decode(b"du1:ai1ee").unwrap();
/// assert_eq!(value.get("a").and_then(|v| v.value()).and_then(|v| v.as_i64()), Some(1));
///
/// // Leading zeros are not canonical.
/// assert!(decode(b"i01e").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    Decoder::new().decode(data)
}

/// Decodes a canonical value from a reader.
pub fn decode_from<R: Read>(reader: R) -> Result<Value, DecodeError> {
    Decoder::new().decode_from(reader)
}

struct Parser<'d, S> {
    source: S,
    decoder: &'d Decoder,
}

impl<S: Source> Parser<'_, S> {
    fn value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth > self.decoder.max_depth {
            return Err(DecodeError::NestingTooDeep);
        }

        let offset = self.source.offset();
        match self.source.peek()?.ok_or(DecodeError::UnexpectedEof)? {
            NULL => {
                self.source.bump();
                Ok(Value::Null)
            }
            TRUE => {
                self.source.bump();
                Ok(Value::Boolean(true))
            }
            FALSE => {
                self.source.bump();
                Ok(Value::Boolean(false))
            }
            INTEGER => self.integer(),
            TEXT => Ok(Value::Text(self.text()?)),
            b'0'..=b'9' => Ok(Value::Binary(self.binary()?)),
            LIST => self.list(depth),
            DICTIONARY => self.dictionary(depth),
            REFERENCE => Err(DecodeError::UnexpectedReference { offset }),
            byte => Err(DecodeError::UnexpectedByte { byte, offset }),
        }
    }

    /// Parses a container member, which may be a reference.
    fn member(&mut self, depth: usize) -> Result<IndirectValue, DecodeError> {
        if self.source.peek()? == Some(REFERENCE) {
            self.reference()
        } else {
            Ok(IndirectValue::new(self.value(depth)?))
        }
    }

    fn reference(&mut self) -> Result<IndirectValue, DecodeError> {
        let offset = self.source.offset();
        if matches!(self.decoder.references, ReferenceMode::Reject) {
            return Err(DecodeError::UnexpectedReference { offset });
        }
        self.source.bump();

        let len = self.length()?;
        let bytes = self.payload(len)?;
        let fingerprint =
            Fingerprint::from_bytes(&bytes).ok_or(DecodeError::InvalidFingerprint { offset })?;

        Ok(match &self.decoder.references {
            ReferenceMode::Reject => return Err(DecodeError::UnexpectedReference { offset }),
            ReferenceMode::Keep => IndirectValue::unresolved(fingerprint),
            ReferenceMode::Lazy(loader) => IndirectValue::lazy(fingerprint, Arc::clone(loader)),
            ReferenceMode::Eager(loader) => {
                let node = IndirectValue::unresolved(fingerprint);
                node.resolve_with(loader.as_ref())?;
                node
            }
        })
    }

    fn integer(&mut self) -> Result<Value, DecodeError> {
        let offset = self.source.offset();
        self.source.bump();

        let mut digits = Vec::new();
        loop {
            match self.source.peek()? {
                None => return Err(DecodeError::UnexpectedEof),
                Some(END) => {
                    self.source.bump();
                    break;
                }
                Some(byte) if byte == b'-' || byte.is_ascii_digit() => {
                    digits.push(byte);
                    self.source.bump();
                }
                Some(_) => {
                    return Err(DecodeError::InvalidInteger {
                        offset,
                        reason: "unexpected byte",
                    })
                }
            }
        }

        let invalid = |reason: &'static str| DecodeError::InvalidInteger { offset, reason };
        let (negative, magnitude) = match digits.split_first() {
            None => return Err(invalid("empty")),
            Some((&b'-', rest)) => (true, rest),
            Some(_) => (false, digits.as_slice()),
        };
        match magnitude {
            [] => return Err(invalid("missing digits")),
            [b'0'] if negative => return Err(invalid("negative zero")),
            [b'0', _, ..] => return Err(invalid("leading zero")),
            _ if magnitude.contains(&b'-') => return Err(invalid("misplaced sign")),
            _ => {}
        }

        BigInt::parse_bytes(&digits, 10)
            .map(Value::Integer)
            .ok_or_else(|| invalid("not a number"))
    }

    /// Parses a canonical decimal length and its separator.
    fn length(&mut self) -> Result<usize, DecodeError> {
        let offset = self.source.offset();
        let invalid = || DecodeError::InvalidLength { offset };

        let first = self.source.next_byte()?;
        if !first.is_ascii_digit() {
            return Err(invalid());
        }
        let mut len = usize::from(first - b'0');
        loop {
            match self.source.next_byte()? {
                LENGTH_SEPARATOR => return Ok(len),
                _ if first == b'0' => return Err(invalid()),
                byte if byte.is_ascii_digit() => {
                    len = len
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(byte - b'0')))
                        .ok_or_else(invalid)?;
                }
                _ => return Err(invalid()),
            }
        }
    }

    fn payload(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        if let Some(remaining) = self.source.remaining() {
            if len > remaining {
                return Err(DecodeError::LengthExceedsInput {
                    declared: len,
                    remaining,
                });
            }
        }
        self.source.read_payload(len)
    }

    fn binary(&mut self) -> Result<Bytes, DecodeError> {
        let len = self.length()?;
        Ok(Bytes::from(self.payload(len)?))
    }

    fn text(&mut self) -> Result<String, DecodeError> {
        let offset = self.source.offset();
        self.source.bump();
        let len = self.length()?;
        String::from_utf8(self.payload(len)?).map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    fn key(&mut self) -> Result<Key, DecodeError> {
        let offset = self.source.offset();
        match self.source.peek()?.ok_or(DecodeError::UnexpectedEof)? {
            b'0'..=b'9' => Ok(Key::Binary(self.binary()?)),
            TEXT => Ok(Key::Text(self.text()?)),
            _ => Err(DecodeError::InvalidKey { offset }),
        }
    }

    fn list(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.source.bump();
        let mut items = Vec::new();

        loop {
            match self.source.peek()? {
                None => return Err(DecodeError::UnexpectedEof),
                Some(END) => {
                    self.source.bump();
                    return Ok(Value::List(List::from(items)));
                }
                Some(_) => items.push(self.member(depth + 1)?),
            }
        }
    }

    fn dictionary(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.source.bump();
        let mut entries = BTreeMap::new();

        loop {
            let offset = self.source.offset();
            match self.source.peek()? {
                None => return Err(DecodeError::UnexpectedEof),
                Some(END) => {
                    self.source.bump();
                    return Ok(Value::Dictionary(Dictionary::from_map(entries)));
                }
                Some(_) => {
                    let key = self.key()?;
                    // Keys arrive strictly ascending, so the last entry is the previous key.
                    if let Some((previous, _)) = entries.last_key_value() {
                        match key.cmp(previous) {
                            std::cmp::Ordering::Less => {
                                return Err(DecodeError::UnsortedKeys { offset })
                            }
                            std::cmp::Ordering::Equal => {
                                return Err(DecodeError::DuplicateKey { offset })
                            }
                            std::cmp::Ordering::Greater => {}
                        }
                    }
                    let value = self.member(depth + 1)?;
                    entries.insert(key, value);
                }
            }
        }
    }
}
