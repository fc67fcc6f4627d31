use crate::cli::ServeArgs;
use crate::infra::{blob_store, build_gate, build_service, AppState};
use crate::routes::with_portal_routes;
use audition_portal::config::AppConfig;
use audition_portal::error::AppError;
use audition_portal::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let uploads = Arc::new(blob_store(&config));
    tokio::fs::create_dir_all(uploads.root()).await?;

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        uploads: uploads.clone(),
    };

    let service = Arc::new(build_service(&config, uploads));
    let gate = Arc::new(build_gate(&config.review));

    let app = with_portal_routes(service, gate)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        storage = %config.storage.root.display(),
        mail_enabled = config.mail.is_configured(),
        "audition portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
