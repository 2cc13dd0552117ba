use crate::cli::ServeArgs;
use crate::infra::{
    engine_from_settings, AppState, InMemoryCreditLedger, InMemoryVerificationRepository,
};
use crate::routes::with_verification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use h2_verify::config::AppConfig;
use h2_verify::error::AppError;
use h2_verify::telemetry;
use h2_verify::verification::VerificationService;
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

    let engine = engine_from_settings(&config.verification)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryVerificationRepository::default());
    let ledger = Arc::new(InMemoryCreditLedger::default());
    let verification_service = Arc::new(VerificationService::new(
        repository,
        ledger,
        engine,
        config.verification.credit_price_per_kg,
    ));

    let app = with_verification_routes(verification_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        credit_price_per_kg = config.verification.credit_price_per_kg,
        "hydrogen verification service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
