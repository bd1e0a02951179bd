use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::domain::{PageKey, VisitCount};
use super::repository::VisitRepository;
use super::service::VisitService;
use crate::access::{AccessGate, AdminAccess, GuardedState};
use crate::error::ApiError;

type VisitState<R> = GuardedState<VisitService<R>>;

/// Router builder exposing the public increment and the admin read.
pub fn visit_router<R>(service: Arc<VisitService<R>>, gate: AccessGate) -> Router
where
    R: VisitRepository + 'static,
{
    Router::new()
        .route(
            "/api/visits",
            post(increment_handler::<R>).get(count_handler::<R>),
        )
        .with_state(GuardedState::new(service, gate))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<String>,
}

pub(crate) async fn increment_handler<R>(
    State(state): State<VisitState<R>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<VisitCount>, ApiError>
where
    R: VisitRepository + 'static,
{
    let page = PageKey::new(query.page.as_deref());
    let count = state.service.increment(&page).await?;
    Ok(Json(VisitCount { count }))
}

pub(crate) async fn count_handler<R>(
    State(state): State<VisitState<R>>,
    _admin: AdminAccess,
    Query(query): Query<PageQuery>,
) -> Result<Json<VisitCount>, ApiError>
where
    R: VisitRepository + 'static,
{
    let page = PageKey::new(query.page.as_deref());
    let count = state.service.count(&page).await?;
    Ok(Json(VisitCount { count }))
}
