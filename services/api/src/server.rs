use crate::cli::ServeArgs;
use crate::infra::{build_services, seed_development_data, AppState};
use crate::routes::with_care_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use carewatch::config::{AppConfig, AppEnvironment};
use carewatch::error::AppError;
use carewatch::telemetry;
use std::sync::atomic::Ordering;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (care_service, directory) = build_services();

    if config.environment == AppEnvironment::Development {
        match seed_development_data(&directory) {
            Ok(()) => info!("seeded development directory for agency-1"),
            Err(err) => warn!(%err, "development seed failed"),
        }
    }

    let app = with_care_routes(care_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "care monitoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
