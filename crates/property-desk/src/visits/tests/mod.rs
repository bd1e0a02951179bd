use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::access::AccessGate;
use crate::storage::MemoryStore;
use crate::visits::{visit_router, PageKey, VisitService};

const ADMIN_TOKEN: &str = "visits-admin";

fn router(service: Arc<VisitService<MemoryStore>>) -> Router {
    visit_router(service, AccessGate::static_token(Some(ADMIN_TOKEN)))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn concurrent_visits_are_all_counted() {
    let service = Arc::new(VisitService::new(Arc::new(MemoryStore::new())));
    let page = PageKey::new(Some("listing-detail"));

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..100 {
        let service = Arc::clone(&service);
        let page = page.clone();
        tasks.spawn(async move { service.increment(&page).await.unwrap() });
    }
    let mut returned = Vec::new();
    while let Some(count) = tasks.join_next().await {
        returned.push(count.unwrap());
    }

    returned.sort_unstable();
    returned.dedup();
    assert_eq!(returned.len(), 100);
    assert_eq!(service.count(&page).await.unwrap(), 100);
    assert_eq!(service.count(&PageKey::new(Some("about"))).await.unwrap(), 0);
}

#[tokio::test]
async fn increment_is_public_and_defaults_to_home() {
    let service = Arc::new(VisitService::new(Arc::new(MemoryStore::new())));
    let router = router(Arc::clone(&service));

    for expected in 1..=2 {
        let (status, body) = send(
            &router,
            Request::post("/api/visits").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "count": expected }));
    }

    let (_, body) = send(
        &router,
        Request::post("/api/visits?page=contact").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body, json!({ "count": 1 }));
    assert_eq!(service.count(&PageKey::default()).await.unwrap(), 2);
}

#[tokio::test]
async fn reading_counts_requires_admin() {
    let service = Arc::new(VisitService::new(Arc::new(MemoryStore::new())));
    service.increment(&PageKey::default()).await.unwrap();
    let router = router(service);

    let (status, body) = send(
        &router,
        Request::get("/api/visits").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized");

    let authorized = |uri: &str| {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, body) = send(&router, authorized("/api/visits")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "count": 1 }));

    let (_, body) = send(&router, authorized("/api/visits?page=never-seen")).await;
    assert_eq!(body, json!({ "count": 0 }));
}
