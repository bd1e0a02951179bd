use std::num::IntErrorKind;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Property, PropertyInput, PropertyPage};
use super::repository::PropertyRepository;
use super::service::CatalogService;
use crate::access::{AccessGate, AdminAccess, GuardedState};
use crate::error::ApiError;

type CatalogState<R> = GuardedState<CatalogService<R>>;

/// Router builder exposing the catalog endpoints.
pub fn catalog_router<R>(service: Arc<CatalogService<R>>, gate: AccessGate) -> Router
where
    R: PropertyRepository + 'static,
{
    Router::new()
        .route(
            "/api/properties",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/properties/:id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(GuardedState::new(service, gate))
}

/// Query string of the listing endpoint. `pageNumber` is lenient: anything that is not a
/// positive integer means the first page.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListQuery {
    pub(crate) keyword: Option<String>,
    pub(crate) page_number: Option<String>,
}

impl ListQuery {
    /// Numbers past `u32::MAX` saturate rather than wrapping back to the first page.
    fn page(&self) -> u32 {
        let parsed = match self.page_number.as_deref().map(|raw| raw.trim().parse::<u32>()) {
            Some(Ok(page)) => Some(page),
            Some(Err(err)) if *err.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
            _ => None,
        };
        parsed.filter(|page| *page >= 1).unwrap_or(1)
    }
}

pub(crate) async fn list_handler<R>(
    State(state): State<CatalogState<R>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PropertyPage>, ApiError>
where
    R: PropertyRepository + 'static,
{
    let page = state
        .service
        .list(query.keyword.as_deref(), query.page())
        .await?;
    Ok(Json(page))
}

pub(crate) async fn get_handler<R>(
    State(state): State<CatalogState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Property>, ApiError>
where
    R: PropertyRepository + 'static,
{
    let property = state.service.get(&id).await?;
    Ok(Json(property))
}

pub(crate) async fn create_handler<R>(
    State(state): State<CatalogState<R>>,
    _admin: AdminAccess,
    payload: Result<Json<PropertyInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PropertyRepository + 'static,
{
    let Json(input) = payload?;
    let property = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

pub(crate) async fn update_handler<R>(
    State(state): State<CatalogState<R>>,
    _admin: AdminAccess,
    Path(id): Path<String>,
    payload: Result<Json<PropertyInput>, JsonRejection>,
) -> Result<Json<Property>, ApiError>
where
    R: PropertyRepository + 'static,
{
    let Json(input) = payload?;
    let property = state.service.update(&id, input).await?;
    Ok(Json(property))
}

pub(crate) async fn delete_handler<R>(
    State(state): State<CatalogState<R>>,
    _admin: AdminAccess,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    R: PropertyRepository + 'static,
{
    state.service.delete(&id).await?;
    Ok(Json(json!({ "message": "Property removed" })))
}
