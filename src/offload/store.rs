use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use super::error::{LoadError, OffloadError};
use super::loader::Loader;
use super::policy::OffloadPolicy;
use crate::codec::{encode, encode_with, DecodeError, Decoder, EncodeError, ReferenceMode};
use crate::value::{Fingerprint, IndirectValue, Value};

/// A content-addressed, in-memory store of encoded values.
///
/// Clones share the same storage. The store is a [`Loader`]: stored bytes
/// are decoded with nested references resolved eagerly against the store
/// itself.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<Fingerprint, Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the fully embedded encoding of `value` and returns its
    /// fingerprint.
    pub fn insert(&self, value: &Value) -> Result<Fingerprint, EncodeError> {
        let fingerprint = Fingerprint::of(value)?;
        let encoded = encode(value)?;
        self.put(fingerprint.clone(), Bytes::from(encoded));
        Ok(fingerprint)
    }

    /// Stores encoded bytes under `fingerprint`.
    ///
    /// Returns `false` and keeps the existing bytes if the fingerprint is
    /// already present.
    pub fn put(&self, fingerprint: Fingerprint, encoded: Bytes) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(&fingerprint) {
            return false;
        }
        tracing::debug!(%fingerprint, len = encoded.len(), "storing offloaded value");
        entries.insert(fingerprint, encoded);
        true
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Bytes> {
        self.entries.read().get(fingerprint).cloned()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.read().contains_key(fingerprint)
    }

    pub fn remove(&self, fingerprint: &Fingerprint) -> Option<Bytes> {
        self.entries.write().remove(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Loader for MemoryStore {
    /// Decodes and verifies the entry stored under `fingerprint`.
    ///
    /// Every reference inside an entry must name a strictly shorter encoding
    /// than the entry itself, and the decoded value must hash back to
    /// `fingerprint`. Entries failing either check are [`LoadError::Corrupt`].
    fn load(&self, fingerprint: &Fingerprint) -> Result<Value, LoadError> {
        // The read guard is dropped here; decoding below re-enters the store.
        let encoded = self.get(fingerprint).ok_or_else(|| {
            tracing::debug!(%fingerprint, "offloaded value not found");
            LoadError::NotFound(fingerprint.clone())
        })?;

        let members = MemberLoader {
            store: self.clone(),
            parent_length: fingerprint.encoding_length(),
        };
        let value = Decoder::new()
            .references(ReferenceMode::Eager(Arc::new(members)))
            .decode(&encoded)
            .map_err(|e| match e {
                DecodeError::Load(e) => e,
                other => corrupt(fingerprint, other.to_string()),
            })?;

        let actual = Fingerprint::of(&value)?;
        if actual != *fingerprint {
            tracing::debug!(%fingerprint, %actual, "stored value does not match its fingerprint");
            return Err(corrupt(fingerprint, format!("content has fingerprint {actual}")));
        }
        Ok(value)
    }
}

/// Resolves the references found inside one stored entry.
struct MemberLoader {
    store: MemoryStore,
    parent_length: u64,
}

impl Loader for MemberLoader {
    fn load(&self, fingerprint: &Fingerprint) -> Result<Value, LoadError> {
        // A member's embedded encoding is a strict part of its parent's, so
        // lengths shrink along every chain and no entry can reach itself.
        if fingerprint.encoding_length() >= self.parent_length {
            return Err(corrupt(
                fingerprint,
                format!(
                    "reference inside a {}-byte value is not shorter than it",
                    self.parent_length
                ),
            ));
        }
        self.store.load(fingerprint)
    }
}

fn corrupt(fingerprint: &Fingerprint, reason: String) -> LoadError {
    LoadError::Corrupt {
        fingerprint: fingerprint.clone(),
        reason,
    }
}

/// Offloads every member whose canonical encoding is longer than a
/// threshold into a [`MemoryStore`].
///
/// The decision only looks at the encoding length, which unresolved nodes
/// report from their fingerprint, so it is content-deterministic and never
/// loads anything. Members of an offloaded value are themselves subject to
/// the policy when the value is written to the store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use bencodex::{
///     decode, encode_with, Decoder, List, MemoryStore, ReferenceMode, ThresholdPolicy, Value,
/// };
///
/// let store = MemoryStore::new();
/// let policy = ThresholdPolicy::new(16, store.clone());
///
/// let value = Value::List(List::from(vec![
///     Value::from(vec![0u8; 1024]),
///     Value::from(7i64),
/// ]));
/// let bytes = encode_with(&value, &policy).unwrap();
/// assert!(bytes.len() < 100);
/// assert_eq!(store.len(), 1);
///
/// // References are rejected unless the decoder is told how to handle them.
/// assert!(decode(&bytes).is_err());
///
/// let decoded = Decoder::new()
///     .references(ReferenceMode::Eager(Arc::new(store)))
///     .decode(&bytes)
///     .unwrap();
/// assert_eq!(decoded, value);
/// ```
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    threshold: u64,
    store: MemoryStore,
}

impl ThresholdPolicy {
    pub fn new(threshold: u64, store: MemoryStore) -> Self {
        Self { threshold, store }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl OffloadPolicy for ThresholdPolicy {
    /// Reads the embedded length cached on the node, so a deep tree is sized
    /// once rather than once per level.
    fn embeds(&self, node: &IndirectValue) -> bool {
        // A length that cannot be computed means an unloadable nested node;
        // embedding surfaces that as the encode error.
        node.encoding_length()
            .map(|len| len <= self.threshold)
            .unwrap_or(true)
    }

    fn offload(
        &self,
        node: &IndirectValue,
        loader: Option<&dyn Loader>,
    ) -> Result<(), OffloadError> {
        let fingerprint = node.fingerprint()?;
        if self.store.contains(&fingerprint) {
            tracing::trace!(%fingerprint, "already stored");
            return Ok(());
        }

        let value = match loader {
            Some(loader) => node.resolve_with(loader)?,
            None => node.resolve()?,
        };
        let encoded = encode_with(value, self)?;
        self.store.put(fingerprint, Bytes::from(encoded));
        Ok(())
    }
}
