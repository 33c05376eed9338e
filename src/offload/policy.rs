use super::error::OffloadError;
use super::loader::Loader;
use crate::value::IndirectValue;

/// Decides which container members are written inline and externalizes the
/// rest.
///
/// `embeds` must be a deterministic function of the node's logical content.
/// If it depends on position, identity or process state, independent
/// encoders stop agreeing on the bytes of the same value. This is a
/// precondition; the encoder does not check it.
pub trait OffloadPolicy {
    /// Returns `true` to write `node` inline.
    fn embeds(&self, node: &IndirectValue) -> bool;

    /// Externalizes a node that [`embeds`](Self::embeds) rejected.
    ///
    /// Called once per rejected node, before its reference is written.
    /// `loader` is the node's own loader when it was decoded lazily, for
    /// implementations that need to materialize it.
    fn offload(&self, node: &IndirectValue, loader: Option<&dyn Loader>)
        -> Result<(), OffloadError>;
}

/// A policy that embeds every member.
///
/// Encoding with it is identical to encoding without a policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedAll;

impl OffloadPolicy for EmbedAll {
    fn embeds(&self, _node: &IndirectValue) -> bool {
        true
    }

    fn offload(
        &self,
        _node: &IndirectValue,
        _loader: Option<&dyn Loader>,
    ) -> Result<(), OffloadError> {
        Ok(())
    }
}
