use crate::cli::ServeArgs;
use crate::infra::{AppState, SiteStore};
use crate::routes::build_app;
use crate::shutdown;
use axum_prometheus::PrometheusMetricLayer;
use property_desk::access::AccessGate;
use property_desk::config::{AppConfig, StorageConfig};
use property_desk::error::AppError;
use property_desk::leads::{LeadNotifier, NotificationDispatcher, TracingNotifier, WebhookNotifier};
use property_desk::media::LocalObjectStore;
use property_desk::storage::{MemoryStore, RepositoryError, SqliteStore};
use property_desk::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    match config.storage.database_url.as_deref() {
        Some(url) => {
            let store = open_database(url, &config.storage).await?;
            info!("using sqlite storage");
            serve(config, Arc::new(store)).await
        }
        None => {
            warn!("DATABASE_URL is not set; records are kept in memory and lost on restart");
            serve(config, Arc::new(MemoryStore::new())).await
        }
    }
}

pub(crate) async fn migrate() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let url = config.storage.database_url.as_deref().ok_or_else(|| {
        RepositoryError::Unavailable("DATABASE_URL must be set to run migrations".to_string())
    })?;
    open_database(url, &config.storage).await?;
    info!("database schema is up to date");
    Ok(())
}

async fn open_database(url: &str, storage: &StorageConfig) -> Result<SqliteStore, AppError> {
    let store = SqliteStore::connect(url, storage.max_connections).await?;
    store.migrate().await?;
    Ok(store)
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: SiteStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let notifier: Arc<dyn LeadNotifier> = match WebhookNotifier::from_config(&config.notifier)? {
        Some(webhook) => Arc::new(webhook),
        None => {
            warn!("NOTIFY_WEBHOOK_URL is not set; lead alerts are only logged");
            Arc::new(TracingNotifier)
        }
    };
    let dispatcher = NotificationDispatcher::new(notifier, config.notifier.timeout);

    if config.access.admin_token.is_none() {
        warn!("ADMIN_TOKEN is not set; every admin request will be rejected");
    }
    let gate = AccessGate::static_token(config.access.admin_token.as_deref());
    let media = Arc::new(LocalObjectStore::from_config(&config.media));

    let app = build_app(
        store,
        dispatcher.clone(),
        gate,
        media,
        config.media.upload_dir.clone(),
        app_state,
    )
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "property desk ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;

    readiness_flag.store(false, Ordering::Release);
    info!(pending = dispatcher.in_flight(), "waiting for lead notifications");
    dispatcher.drain().await;
    Ok(())
}
