use async_trait::async_trait;

use super::domain::{Inquiry, NewInquiry};
use crate::storage::RepositoryError;

/// Lead storage. Leads are append-only: there is no update or delete path.
#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn insert(&self, inquiry: NewInquiry) -> Result<Inquiry, RepositoryError>;
    /// Every stored lead in insertion order.
    async fn all(&self) -> Result<Vec<Inquiry>, RepositoryError>;
}
