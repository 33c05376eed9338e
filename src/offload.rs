//! Value offloading.
//!
//! Large container members can be written elsewhere and replaced in the main
//! encoding by a reference to their [`Fingerprint`](crate::Fingerprint).
//! Two seams connect the codec to the storage that holds them:
//!
//! - [`OffloadPolicy`] on the encoding side decides, member by member, what
//!   to embed and externalizes the rest.
//! - [`Loader`] on the decoding side turns a fingerprint back into a value,
//!   either while decoding or later on demand.
//!
//! [`MemoryStore`] and [`ThresholdPolicy`] are complete in-memory
//! implementations of both seams.
//!
//! # Examples
//!
//! Lazy resolution leaves references untouched until a member is needed:
//!
//! ```
//! use std::sync::Arc;
//! use bencodex::{encode_with, Decoder, List, MemoryStore, ReferenceMode, ThresholdPolicy, Value};
//!
//! let store = MemoryStore::new();
//! let value = Value::List(List::from(vec![
//!     Value::from("a fairly long text member"),
//!     Value::from("another fairly long member"),
//! ]));
//! let bytes = encode_with(&value, &ThresholdPolicy::new(8, store.clone())).unwrap();
//!
//! let decoded = Decoder::new()
//!     .references(ReferenceMode::Lazy(Arc::new(store)))
//!     .decode(&bytes)
//!     .unwrap();
//! let list = decoded.as_list().unwrap();
//! assert!(!list.get(0).unwrap().is_resolved());
//!
//! let first = list.get(0).unwrap().resolve().unwrap();
//! assert_eq!(first.as_text(), Some("a fairly long text member"));
//! assert!(!list.get(1).unwrap().is_resolved());
//! ```

mod error;
mod loader;
mod policy;
mod store;

pub use error::{LoadError, OffloadError};
pub use loader::Loader;
pub use policy::{EmbedAll, OffloadPolicy};
pub use store::{MemoryStore, ThresholdPolicy};

#[cfg(test)]
mod tests;
