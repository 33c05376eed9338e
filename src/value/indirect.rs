use std::fmt;
use std::sync::{Arc, OnceLock};

use super::fingerprint::Fingerprint;
use super::kind::ValueKind;
use super::Value;
use crate::offload::{LoadError, Loader};

/// A container member that is either inline or stored elsewhere.
///
/// Every element of a [`List`](super::List) and every value of a
/// [`Dictionary`](super::Dictionary) is an `IndirectValue`. An offloaded node
/// starts out unresolved and holds only its [`Fingerprint`]; resolving it
/// loads the value once and caches it for the node's lifetime.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use bencodex::{Fingerprint, IndirectValue, LoadError, Value};
///
/// let original = Value::from("offloaded");
/// let fp = Fingerprint::of(&original).unwrap();
///
/// let stored = original.clone();
/// let node = IndirectValue::lazy(fp, Arc::new(move |_: &Fingerprint| -> Result<Value, LoadError> {
///     Ok(stored.clone())
/// }));
///
/// assert!(!node.is_resolved());
/// assert_eq!(node.resolve().unwrap(), &original);
/// assert!(node.is_resolved());
/// ```
#[derive(Clone)]
pub struct IndirectValue {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Inline {
        value: Value,
        fingerprint: OnceLock<Fingerprint>,
        length: OnceLock<u64>,
    },
    Offloaded {
        fingerprint: Fingerprint,
        loader: Option<Arc<dyn Loader>>,
        loaded: OnceLock<Value>,
    },
}

impl IndirectValue {
    /// Wraps a materialized value.
    pub fn new(value: Value) -> Self {
        Self {
            repr: Repr::Inline {
                value,
                fingerprint: OnceLock::new(),
                length: OnceLock::new(),
            },
        }
    }

    /// Creates an unresolved node with no loader attached.
    ///
    /// It can only be materialized with [`resolve_with`](Self::resolve_with).
    pub fn unresolved(fingerprint: Fingerprint) -> Self {
        Self {
            repr: Repr::Offloaded {
                fingerprint,
                loader: None,
                loaded: OnceLock::new(),
            },
        }
    }

    /// Creates an unresolved node that loads itself on demand.
    pub fn lazy(fingerprint: Fingerprint, loader: Arc<dyn Loader>) -> Self {
        Self {
            repr: Repr::Offloaded {
                fingerprint,
                loader: Some(loader),
                loaded: OnceLock::new(),
            },
        }
    }

    /// Returns the value if it is available without I/O.
    pub fn value(&self) -> Option<&Value> {
        match &self.repr {
            Repr::Inline { value, .. } => Some(value),
            Repr::Offloaded { loaded, .. } => loaded.get(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.value().is_some()
    }

    /// Returns `true` if this node was decoded from a reference.
    pub fn is_offloaded(&self) -> bool {
        matches!(self.repr, Repr::Offloaded { .. })
    }

    /// Returns the loader held by a lazily decoded node.
    pub fn loader(&self) -> Option<&dyn Loader> {
        match &self.repr {
            Repr::Offloaded {
                loader: Some(loader),
                ..
            } => Some(loader.as_ref()),
            _ => None,
        }
    }

    /// Materializes the value through the node's own loader.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NoLoader`] for an unresolved node without a
    /// loader, or whatever the loader fails with.
    pub fn resolve(&self) -> Result<&Value, LoadError> {
        match &self.repr {
            Repr::Inline { value, .. } => Ok(value),
            Repr::Offloaded {
                fingerprint,
                loader,
                loaded,
            } => {
                if let Some(value) = loaded.get() {
                    return Ok(value);
                }
                let loader = loader
                    .as_deref()
                    .ok_or_else(|| LoadError::NoLoader(fingerprint.clone()))?;
                load_into(fingerprint, loader, loaded)
            }
        }
    }

    /// Materializes the value through `loader`.
    ///
    /// Resolution is idempotent: once a value has been loaded it is returned
    /// from the cache and `loader` is not called again.
    pub fn resolve_with(&self, loader: &dyn Loader) -> Result<&Value, LoadError> {
        match &self.repr {
            Repr::Inline { value, .. } => Ok(value),
            Repr::Offloaded {
                fingerprint,
                loaded,
                ..
            } => match loaded.get() {
                Some(value) => Ok(value),
                None => load_into(fingerprint, loader, loaded),
            },
        }
    }

    /// Consumes the node and returns its materialized value.
    pub fn into_value(self) -> Result<Value, LoadError> {
        if let Repr::Offloaded { loaded, .. } = &self.repr {
            if loaded.get().is_none() {
                self.resolve()?;
            }
        }
        match self.repr {
            Repr::Inline { value, .. } => Ok(value),
            Repr::Offloaded {
                fingerprint,
                loaded,
                ..
            } => loaded
                .into_inner()
                .ok_or(LoadError::NoLoader(fingerprint)),
        }
    }

    /// Returns the node's fingerprint, computing and caching it for inline
    /// values.
    pub fn fingerprint(&self) -> Result<Fingerprint, LoadError> {
        match &self.repr {
            Repr::Offloaded { fingerprint, .. } => Ok(fingerprint.clone()),
            Repr::Inline {
                value, fingerprint, ..
            } => {
                if let Some(fp) = fingerprint.get() {
                    return Ok(fp.clone());
                }
                let computed = Fingerprint::of(value)?;
                Ok(fingerprint.get_or_init(|| computed).clone())
            }
        }
    }

    pub fn kind(&self) -> ValueKind {
        match &self.repr {
            Repr::Inline { value, .. } => value.kind(),
            Repr::Offloaded { fingerprint, .. } => fingerprint.kind(),
        }
    }

    /// Length of the node's fully embedded canonical encoding.
    ///
    /// Answered from the fingerprint when one is known. Inline values are
    /// measured with [`Value::encoding_length`] and the result is cached, so
    /// sizing every member of a deep tree touches each node once.
    pub fn encoding_length(&self) -> Result<u64, LoadError> {
        match &self.repr {
            Repr::Offloaded { fingerprint, .. } => Ok(fingerprint.encoding_length()),
            Repr::Inline {
                value,
                fingerprint,
                length,
            } => {
                if let Some(fp) = fingerprint.get() {
                    return Ok(fp.encoding_length());
                }
                if let Some(len) = length.get() {
                    return Ok(*len);
                }
                let computed = value.encoding_length()?;
                Ok(*length.get_or_init(|| computed))
            }
        }
    }
}

fn load_into<'a>(
    fingerprint: &Fingerprint,
    loader: &dyn Loader,
    slot: &'a OnceLock<Value>,
) -> Result<&'a Value, LoadError> {
    tracing::trace!(%fingerprint, "resolving offloaded value");
    let value = loader.load(fingerprint)?;
    if value.kind() != fingerprint.kind() {
        return Err(LoadError::KindMismatch {
            expected: fingerprint.kind(),
            found: value.kind(),
        });
    }
    Ok(slot.get_or_init(|| value))
}

impl PartialEq for IndirectValue {
    fn eq(&self, other: &Self) -> bool {
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self.fingerprint(), other.fingerprint()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for IndirectValue {}

impl fmt::Debug for IndirectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Inline { value, .. } => value.fmt(f),
            Repr::Offloaded {
                fingerprint,
                loaded,
                ..
            } => f
                .debug_struct("Offloaded")
                .field("fingerprint", fingerprint)
                .field("value", &loaded.get())
                .finish(),
        }
    }
}

impl From<Value> for IndirectValue {
    fn from(value: Value) -> Self {
        IndirectValue::new(value)
    }
}
