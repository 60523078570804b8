use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionStore};
use crate::routes::with_scaled_score_routes;
use assessment_scoring::config::AppConfig;
use assessment_scoring::error::AppError;
use assessment_scoring::telemetry;
use assessment_scoring::workflows::scaled_score::ScaledScoreService;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(config.catalog.load_catalog()?);
    info!(
        sections = catalog.sections().len(),
        source = ?config.catalog.section_catalog,
        "section catalog loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sessions = Arc::new(InMemorySessionStore::new(
        config.sessions.idle_timeout_secs,
    ));
    spawn_idle_sweep(sessions.clone());
    let scaled_score_service = Arc::new(ScaledScoreService::new(catalog, sessions));

    let app = with_scaled_score_routes(scaled_score_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scaled score configurator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

const IDLE_SWEEP_PERIOD: Duration = Duration::from_secs(60);

fn spawn_idle_sweep(sessions: Arc<InMemorySessionStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(IDLE_SWEEP_PERIOD);
        loop {
            ticker.tick().await;
            sessions.evict_idle(Utc::now());
        }
    });
}
