use bytes::Bytes;
use std::fmt;

/// A dictionary key: either a binary or a text string.
///
/// The derived ordering is the canonical key order: every binary key sorts
/// before every text key, and keys of the same kind compare by their raw
/// bytes (UTF-8 bytes for text).
///
/// # Examples
///
/// ```
/// use bencodex::Key;
///
/// assert!(Key::from(b"zz".as_slice()) < Key::from("a"));
/// assert!(Key::from("a") < Key::from("b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// A binary key.
    Binary(Bytes),
    /// A text key.
    Text(String),
}

impl Key {
    /// Returns the raw bytes of the key, without its kind.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Key::Binary(b) => b,
            Key::Text(s) => s.as_bytes(),
        }
    }

    /// Returns the key as a string slice, if it is a text key.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Key::Text(s) => Some(s),
            Key::Binary(_) => None,
        }
    }

    /// Returns `true` for text keys.
    pub fn is_text(&self) -> bool {
        matches!(self, Key::Text(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Text(s) => write!(f, "{:?}", s),
            Key::Binary(b) => {
                f.write_str("b\"")?;
                for byte in b.iter() {
                    write!(f, "{}", std::ascii::escape_default(*byte))?;
                }
                f.write_str("\"")
            }
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<&[u8]> for Key {
    fn from(b: &[u8]) -> Self {
        Key::Binary(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for Key {
    fn from(b: Bytes) -> Self {
        Key::Binary(b)
    }
}

impl From<Vec<u8>> for Key {
    fn from(b: Vec<u8>) -> Self {
        Key::Binary(Bytes::from(b))
    }
}
