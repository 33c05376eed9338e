use thiserror::Error;

use crate::offload::{LoadError, OffloadError};

/// Errors that can occur while decoding Bencodex bytes.
///
/// Every violation of the grammar or of canonical form is an error; the
/// decoder never corrects its input.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input ended before the value was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A byte that cannot start a value at this position.
    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    /// A malformed or non-canonical integer.
    #[error("invalid integer at offset {offset}: {reason}")]
    InvalidInteger { offset: usize, reason: &'static str },

    /// A malformed or non-canonical length prefix.
    #[error("invalid length at offset {offset}")]
    InvalidLength { offset: usize },

    /// A declared length larger than the input that is left.
    #[error("declared length {declared} exceeds remaining input of {remaining} bytes")]
    LengthExceedsInput { declared: usize, remaining: usize },

    /// A text payload that is not valid UTF-8.
    #[error("invalid utf-8 in text at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A dictionary key that is neither binary nor text.
    #[error("invalid dictionary key at offset {offset}")]
    InvalidKey { offset: usize },

    /// A dictionary key smaller than the key before it.
    #[error("dictionary keys out of order at offset {offset}")]
    UnsortedKeys { offset: usize },

    /// A dictionary key equal to the key before it.
    #[error("duplicate dictionary key at offset {offset}")]
    DuplicateKey { offset: usize },

    /// A reference where the decoder does not accept one.
    #[error("unexpected reference at offset {offset}")]
    UnexpectedReference { offset: usize },

    /// A reference whose fingerprint cannot be parsed.
    #[error("invalid fingerprint at offset {offset}")]
    InvalidFingerprint { offset: usize },

    /// Extra bytes after a complete top-level value.
    #[error("trailing data at offset {offset}")]
    TrailingData { offset: usize },

    /// Containers nested deeper than the configured limit.
    #[error("nesting too deep")]
    NestingTooDeep,

    /// An eagerly resolved reference could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while encoding a value.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Writing to the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An unresolved member had to be embedded but could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// The offload policy failed to externalize a member.
    #[error("offload error: {0}")]
    Offload(#[from] OffloadError),
}
