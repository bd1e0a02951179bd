use async_trait::async_trait;

use super::domain::{Property, PropertyFields, PropertyFilter, PropertyId};
use crate::storage::RepositoryError;

/// Listing storage. Implementations assign identifiers and timestamps and keep a stable
/// natural order (insertion order) so pagination is repeatable.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn insert(&self, fields: PropertyFields) -> Result<Property, RepositoryError>;
    async fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    /// Replaces the content of an existing listing. `None` when the listing no longer exists.
    async fn replace(
        &self,
        id: &PropertyId,
        fields: PropertyFields,
    ) -> Result<Option<Property>, RepositoryError>;
    /// Hard delete. `false` when nothing was removed.
    async fn remove(&self, id: &PropertyId) -> Result<bool, RepositoryError>;
    async fn count(&self, filter: &PropertyFilter) -> Result<u64, RepositoryError>;
    async fn page(
        &self,
        filter: &PropertyFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Property>, RepositoryError>;
}
