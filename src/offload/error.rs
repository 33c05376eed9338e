use thiserror::Error;

use crate::codec::EncodeError;
use crate::value::{Fingerprint, ValueKind};

/// Errors that can occur while materializing an offloaded value.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The node is unresolved and no loader is available.
    #[error("no loader to resolve {0}")]
    NoLoader(Fingerprint),

    /// The backing store has nothing under this fingerprint.
    #[error("no value stored for {0}")]
    NotFound(Fingerprint),

    /// The loaded value is not of the kind the fingerprint records.
    #[error("expected {expected} value, loaded {found}")]
    KindMismatch { expected: ValueKind, found: ValueKind },

    /// The stored bytes do not decode to a value with this fingerprint.
    #[error("corrupt stored value {fingerprint}: {reason}")]
    Corrupt {
        fingerprint: Fingerprint,
        reason: String,
    },

    /// A value could not be encoded for fingerprinting.
    #[error("encode error: {0}")]
    Encode(Box<EncodeError>),
}

/// Errors that can occur while offloading a value.
#[derive(Debug, Error)]
pub enum OffloadError {
    /// The value to offload could not be materialized.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// The value to offload could not be encoded.
    #[error("encode error: {0}")]
    Encode(Box<EncodeError>),

    /// The backing store rejected the write.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<EncodeError> for OffloadError {
    fn from(e: EncodeError) -> Self {
        OffloadError::Encode(Box::new(e))
    }
}
