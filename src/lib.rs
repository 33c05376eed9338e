//! bencodex - canonical Bencodex serialization
//!
//! Bencodex extends Bencode with null, booleans, unicode text and
//! arbitrary-precision integers, and requires every value to have exactly one
//! encoding. Two encoders given the same value produce the same bytes, so the
//! bytes (or a digest of them) can identify the value.
//!
//! # Modules
//!
//! - [`value`] - The value model, dictionary keys, fingerprints and indirect members
//! - [`codec`] - Canonical encoder and validating streaming decoder
//! - [`offload`] - Offload policies, loaders and an in-memory store
//! - [`constants`] - Wire markers and decoder defaults

pub mod codec;
pub mod constants;
pub mod offload;
pub mod value;

pub use codec::{
    decode, decode_from, encode, encode_to, encode_to_with, encode_with, DecodeError, Decoder,
    EncodeError, ReferenceMode,
};
pub use offload::{
    EmbedAll, LoadError, Loader, MemoryStore, OffloadError, OffloadPolicy, ThresholdPolicy,
};
pub use value::{
    Dictionary, DuplicateKeyError, Fingerprint, IndirectValue, Key, List, Value, ValueKind,
};
