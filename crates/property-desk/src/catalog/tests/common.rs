use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::access::AccessGate;
use crate::catalog::{
    catalog_router, CatalogService, Property, PropertyFields, PropertyFilter, PropertyId,
    PropertyInput, PropertyRepository,
};
use crate::storage::{MemoryStore, RepositoryError};

pub(super) const ADMIN_TOKEN: &str = "catalog-admin";

pub(super) fn gate() -> AccessGate {
    AccessGate::static_token(Some(ADMIN_TOKEN))
}

pub(super) fn listing_input(title: &str) -> PropertyInput {
    PropertyInput {
        title: Some(title.to_string()),
        price: Some(7_250_000.0),
        location: Some("Aundh, Pune".to_string()),
        property_type: Some("Flat".to_string()),
        area: Some("1100 sq ft".to_string()),
        description: Some("Two bedroom flat near the park".to_string()),
        bedrooms: Some(2),
        bathrooms: Some(2),
        ..PropertyInput::default()
    }
}

pub(super) fn build_service() -> (Arc<CatalogService<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(CatalogService::new(Arc::clone(&store)));
    (service, store)
}

pub(super) fn router_with_service(service: Arc<CatalogService<MemoryStore>>) -> Router {
    catalog_router(service, gate())
}

pub(super) async fn seed(service: &CatalogService<MemoryStore>, titles: &[&str]) -> Vec<Property> {
    let mut created = Vec::with_capacity(titles.len());
    for title in titles {
        created.push(service.create(listing_input(title)).await.expect("seeded"));
    }
    created
}

pub(super) fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("serialize body"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Repository that fails every call, for the 500 path.
pub(super) struct UnavailableRepository;

#[async_trait]
impl PropertyRepository for UnavailableRepository {
    async fn insert(&self, _fields: PropertyFields) -> Result<Property, RepositoryError> {
        Err(unavailable())
    }

    async fn fetch(&self, _id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        Err(unavailable())
    }

    async fn replace(
        &self,
        _id: &PropertyId,
        _fields: PropertyFields,
    ) -> Result<Option<Property>, RepositoryError> {
        Err(unavailable())
    }

    async fn remove(&self, _id: &PropertyId) -> Result<bool, RepositoryError> {
        Err(unavailable())
    }

    async fn count(&self, _filter: &PropertyFilter) -> Result<u64, RepositoryError> {
        Err(unavailable())
    }

    async fn page(
        &self,
        _filter: &PropertyFilter,
        _offset: u64,
        _limit: u32,
    ) -> Result<Vec<Property>, RepositoryError> {
        Err(unavailable())
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("listing table offline".to_string())
}
