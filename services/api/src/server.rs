use crate::cli::ServeArgs;
use crate::infra::{availability_source, booking_service, AppState, InMemorySessionRepository};
use crate::routes::with_booking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use holiday_booking::config::AppConfig;
use holiday_booking::error::AppError;
use holiday_booking::telemetry;
use holiday_booking::workflows::booking::WebhookGateway;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let booking = &config.booking;
    let client = booking.http_client()?;
    let gateway = Arc::new(WebhookGateway::new(
        client.clone(),
        booking.webhook_url.clone(),
    ));
    let service = Arc::new(booking_service(
        booking,
        Arc::new(InMemorySessionRepository::from_config(booking)),
        availability_source(booking, &client, None),
        gateway,
    ));

    let app = with_booking_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        season_start = %booking.season.start(),
        season_end = %booking.season.end(),
        max_sessions = booking.max_sessions,
        "holiday booking service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
