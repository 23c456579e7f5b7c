use async_trait::async_trait;
use bytes::Bytes;

use super::types::ProbeInfo;
use crate::utils::Result;

/// Remote source of cacheable resources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Origin: Send + Sync {
    /// Metadata-only round trip. Failure means the origin is unavailable.
    async fn probe(&self, uri: &str) -> Result<ProbeInfo>;

    /// Full-content round trip. `None` means nothing was obtained.
    async fn retrieve(&self, uri: &str) -> Option<Bytes>;
}
