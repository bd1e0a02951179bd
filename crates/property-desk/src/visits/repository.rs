use async_trait::async_trait;

use super::domain::{PageKey, VisitCounter};
use crate::storage::RepositoryError;

/// Counter storage.
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Adds one to the counter for `page`, creating it at 1 when absent, and returns the new
    /// value. Must be atomic: concurrent calls never lose an increment.
    async fn increment(&self, page: &PageKey) -> Result<u64, RepositoryError>;
    async fn fetch(&self, page: &PageKey) -> Result<Option<VisitCounter>, RepositoryError>;
}
