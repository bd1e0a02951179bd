use crate::infra::{AppState, SiteStore};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use property_desk::access::AccessGate;
use property_desk::catalog::{catalog_router, CatalogService};
use property_desk::leads::{lead_router, LeadService, NotificationDispatcher};
use property_desk::media::{media_router, ObjectStore};
use property_desk::visits::{visit_router, VisitService};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Every site route on one router, sharing one store and one access gate.
///
/// The public site and admin panel are served from other origins, so every route answers CORS
/// preflights for any origin. Admin routes still require the bearer token.
pub(crate) fn build_app<S, O>(
    store: Arc<S>,
    dispatcher: NotificationDispatcher,
    gate: AccessGate,
    media: Arc<O>,
    upload_dir: PathBuf,
    state: AppState,
) -> Router
where
    S: SiteStore + 'static,
    O: ObjectStore + 'static,
{
    let catalog = Arc::new(CatalogService::new(Arc::clone(&store)));
    let leads = Arc::new(LeadService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        dispatcher,
    ));
    let visits = Arc::new(VisitService::new(store));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    catalog_router(catalog, gate.clone())
        .merge(lead_router(leads, gate.clone()))
        .merge(visit_router(visits, gate.clone()))
        .merge(media_router(media, upload_dir, gate))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(state))
        .layer(cors)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
