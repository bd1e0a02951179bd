use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::domain::{InquirySubmission, InquiryView};
use super::repository::InquiryRepository;
use super::service::LeadService;
use crate::access::{AccessGate, AdminAccess, GuardedState};
use crate::catalog::PropertyRepository;
use crate::error::ApiError;

type LeadState<I, P> = GuardedState<LeadService<I, P>>;

/// Router builder exposing public lead capture and the admin lead listing.
pub fn lead_router<I, P>(service: Arc<LeadService<I, P>>, gate: AccessGate) -> Router
where
    I: InquiryRepository + 'static,
    P: PropertyRepository + 'static,
{
    Router::new()
        .route(
            "/api/inquiries",
            get(list_handler::<I, P>).post(create_handler::<I, P>),
        )
        .with_state(GuardedState::new(service, gate))
}

pub(crate) async fn create_handler<I, P>(
    State(state): State<LeadState<I, P>>,
    payload: Result<Json<InquirySubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    I: InquiryRepository + 'static,
    P: PropertyRepository + 'static,
{
    let Json(submission) = payload?;
    let inquiry = state.service.create(submission).await?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

pub(crate) async fn list_handler<I, P>(
    State(state): State<LeadState<I, P>>,
    _admin: AdminAccess,
) -> Result<Json<Vec<InquiryView>>, ApiError>
where
    I: InquiryRepository + 'static,
    P: PropertyRepository + 'static,
{
    let inquiries = state.service.list().await?;
    Ok(Json(inquiries))
}
