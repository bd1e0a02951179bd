use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{touch, RepositoryError};
use crate::catalog::{Property, PropertyFields, PropertyFilter, PropertyId, PropertyRepository};
use crate::leads::{Inquiry, InquiryId, InquiryRepository, NewInquiry};
use crate::visits::{PageKey, VisitCounter, VisitRepository};

/// Process-local store. Every operation runs under one lock per record kind, which makes each
/// call (the counter increment included) atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    properties: Mutex<Vec<Property>>,
    inquiries: Mutex<Vec<Inquiry>>,
    visits: Mutex<HashMap<PageKey, VisitCounter>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PropertyRepository for MemoryStore {
    async fn insert(&self, fields: PropertyFields) -> Result<Property, RepositoryError> {
        let now = Utc::now();
        let property = Property {
            id: PropertyId::generate(),
            fields,
            created_at: now,
            updated_at: now,
        };
        lock(&self.properties).push(property.clone());
        Ok(property)
    }

    async fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        let properties = lock(&self.properties);
        Ok(properties.iter().find(|property| property.id == *id).cloned())
    }

    async fn replace(
        &self,
        id: &PropertyId,
        fields: PropertyFields,
    ) -> Result<Option<Property>, RepositoryError> {
        let mut properties = lock(&self.properties);
        let Some(property) = properties.iter_mut().find(|property| property.id == *id) else {
            return Ok(None);
        };
        property.fields = fields;
        property.updated_at = touch(property.updated_at);
        Ok(Some(property.clone()))
    }

    async fn remove(&self, id: &PropertyId) -> Result<bool, RepositoryError> {
        let mut properties = lock(&self.properties);
        let before = properties.len();
        properties.retain(|property| property.id != *id);
        Ok(properties.len() != before)
    }

    async fn count(&self, filter: &PropertyFilter) -> Result<u64, RepositoryError> {
        let properties = lock(&self.properties);
        let matching = properties
            .iter()
            .filter(|property| filter.matches(property))
            .count();
        Ok(matching as u64)
    }

    async fn page(
        &self,
        filter: &PropertyFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Property>, RepositoryError> {
        let properties = lock(&self.properties);
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(properties
            .iter()
            .filter(|property| filter.matches(property))
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InquiryRepository for MemoryStore {
    async fn insert(&self, inquiry: NewInquiry) -> Result<Inquiry, RepositoryError> {
        let NewInquiry {
            property_id,
            name,
            email,
            phone,
            message,
        } = inquiry;
        let inquiry = Inquiry {
            id: InquiryId::generate(),
            property_id,
            name,
            email,
            phone,
            message,
            created_at: Utc::now(),
        };
        lock(&self.inquiries).push(inquiry.clone());
        Ok(inquiry)
    }

    async fn all(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        Ok(lock(&self.inquiries).clone())
    }
}

#[async_trait]
impl VisitRepository for MemoryStore {
    async fn increment(&self, page: &PageKey) -> Result<u64, RepositoryError> {
        let mut visits = lock(&self.visits);
        let now = Utc::now();
        let counter = visits.entry(page.clone()).or_insert_with(|| VisitCounter {
            page: page.clone(),
            count: 0,
            created_at: now,
            updated_at: now,
        });
        counter.count += 1;
        counter.updated_at = touch(counter.updated_at);
        Ok(counter.count)
    }

    async fn fetch(&self, page: &PageKey) -> Result<Option<VisitCounter>, RepositoryError> {
        Ok(lock(&self.visits).get(page).cloned())
    }
}
