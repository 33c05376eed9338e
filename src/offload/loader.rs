use super::error::LoadError;
use crate::value::{Fingerprint, Value};

/// Materializes offloaded values from their fingerprints.
///
/// Loaders may be called recursively (loading one value can trigger loads of
/// its members) and from several threads at once, so implementations must
/// not hold locks across calls back into the codec.
pub trait Loader: Send + Sync {
    /// Loads the value identified by `fingerprint`.
    ///
    /// # Errors
    ///
    /// Implementations must report a missing or corrupt value as an error
    /// rather than returning a placeholder.
    fn load(&self, fingerprint: &Fingerprint) -> Result<Value, LoadError>;
}

impl<F> Loader for F
where
    F: Fn(&Fingerprint) -> Result<Value, LoadError> + Send + Sync,
{
    fn load(&self, fingerprint: &Fingerprint) -> Result<Value, LoadError> {
        self(fingerprint)
    }
}
