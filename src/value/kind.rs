use std::fmt;

/// The kind of a [`Value`](super::Value), without its payload.
///
/// Fingerprints record the kind of the value they stand for, so an
/// unresolved node can report its kind without touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Binary,
    Text,
    List,
    Dictionary,
}

impl ValueKind {
    /// Returns the stable one-byte code used in serialized fingerprints.
    pub fn code(self) -> u8 {
        match self {
            ValueKind::Null => 0,
            ValueKind::Boolean => 1,
            ValueKind::Integer => 2,
            ValueKind::Binary => 3,
            ValueKind::Text => 4,
            ValueKind::List => 5,
            ValueKind::Dictionary => 6,
        }
    }

    /// Parses a fingerprint kind code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ValueKind::Null),
            1 => Some(ValueKind::Boolean),
            2 => Some(ValueKind::Integer),
            3 => Some(ValueKind::Binary),
            4 => Some(ValueKind::Text),
            5 => Some(ValueKind::List),
            6 => Some(ValueKind::Dictionary),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Binary => "binary",
            ValueKind::Text => "text",
            ValueKind::List => "list",
            ValueKind::Dictionary => "dictionary",
        };
        f.write_str(name)
    }
}
