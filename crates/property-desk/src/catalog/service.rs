use std::sync::Arc;

use tracing::info;

use super::domain::{
    total_pages, Property, PropertyFilter, PropertyId, PropertyInput, PropertyPage, PAGE_SIZE,
};
use super::repository::PropertyRepository;
use crate::storage::RepositoryError;
use crate::validation::ValidationError;

/// Listing lifecycle: paginated search, lookup, and admin writes.
///
/// Concurrent updates to the same listing are last-write-wins; there is no version check.
pub struct CatalogService<R> {
    repository: Arc<R>,
}

impl<R> CatalogService<R>
where
    R: PropertyRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Page numbers start at 1; a page past the end is empty rather than an error.
    pub async fn list(
        &self,
        keyword: Option<&str>,
        page: u32,
    ) -> Result<PropertyPage, CatalogError> {
        let page = page.max(1);
        let filter = PropertyFilter::new(keyword);
        let matching = self.repository.count(&filter).await?;
        let offset = u64::from(page - 1) * u64::from(PAGE_SIZE);

        let properties = if offset >= matching {
            Vec::new()
        } else {
            self.repository.page(&filter, offset, PAGE_SIZE).await?
        };

        Ok(PropertyPage {
            properties,
            page,
            pages: total_pages(matching),
        })
    }

    pub async fn get(&self, raw_id: &str) -> Result<Property, CatalogError> {
        let id = PropertyId::parse(raw_id).ok_or(CatalogError::NotFound)?;
        self.repository
            .fetch(&id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    pub async fn create(&self, input: PropertyInput) -> Result<Property, CatalogError> {
        let fields = input.into_fields()?;
        let property = self.repository.insert(fields).await?;
        info!(property_id = %property.id, title = %property.fields.title, "listing created");
        Ok(property)
    }

    pub async fn update(
        &self,
        raw_id: &str,
        input: PropertyInput,
    ) -> Result<Property, CatalogError> {
        let current = self.get(raw_id).await?;
        let merged = input.merge_into(&current.fields)?;
        let updated = self
            .repository
            .replace(&current.id, merged)
            .await?
            .ok_or(CatalogError::NotFound)?;
        info!(property_id = %updated.id, "listing updated");
        Ok(updated)
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), CatalogError> {
        let id = PropertyId::parse(raw_id).ok_or(CatalogError::NotFound)?;
        if self.repository.remove(&id).await? {
            info!(property_id = %id, "listing removed");
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("property not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
