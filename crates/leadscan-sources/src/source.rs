use async_trait::async_trait;
use leadscan_core::Platform;

use crate::error::SourceError;
use crate::item::PlatformItem;

/// Capability that yields raw platform items for a list of targets
/// (hashtags, groups or video ids).
///
/// Implementations must be reentrant: the orchestrator shares one instance
/// across ticks behind an `Arc`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Platform this source collects from.
    fn platform(&self) -> Platform;

    /// Fetch items for the given targets, in collector order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source as a whole cannot be read.
    /// Individual malformed items are dropped rather than failing the call.
    async fn fetch(&self, targets: &[String]) -> Result<Vec<PlatformItem>, SourceError>;
}
