use std::sync::Arc;

use tracing::debug;

use super::domain::PageKey;
use super::repository::VisitRepository;
use crate::storage::RepositoryError;

/// Page visit counting. Atomicity is delegated to the repository's increment primitive.
pub struct VisitService<R> {
    repository: Arc<R>,
}

impl<R> VisitService<R>
where
    R: VisitRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn increment(&self, page: &PageKey) -> Result<u64, VisitError> {
        let count = self.repository.increment(page).await?;
        debug!(%page, count, "visit recorded");
        Ok(count)
    }

    /// Zero when the page has never been visited.
    pub async fn count(&self, page: &PageKey) -> Result<u64, VisitError> {
        let counter = self.repository.fetch(page).await?;
        Ok(counter.map_or(0, |counter| counter.count))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VisitError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
