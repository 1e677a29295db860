//! Playlist source abstractions

use async_trait::async_trait;

use crate::errors::SourceResult;

/// Retrieves raw playlist text for a source address
///
/// Implementations must bound their own waiting time. A failure is reported
/// as a [`SourceError`](crate::errors::SourceError) and never aborts an
/// aggregation run.
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch(&self, address: &str) -> SourceResult<String>;
}

#[async_trait]
impl<T: PlaylistFetcher + ?Sized> PlaylistFetcher for std::sync::Arc<T> {
    async fn fetch(&self, address: &str) -> SourceResult<String> {
        (**self).fetch(address).await
    }
}
