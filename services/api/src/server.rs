use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredAssistant, InMemorySurveyRepository, StaticCredentialAuth};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use energy_audit::auth::{AuthProvider, Session};
use energy_audit::config::AppConfig;
use energy_audit::error::AppError;
use energy_audit::survey::SurveyService;
use energy_audit::telemetry;
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

    if config.audit.admin.is_none() {
        warn!("no administrator configured; admin endpoints will refuse sign-in");
    }
    let auth = Arc::new(StaticCredentialAuth::new(config.audit.admin.clone()));
    let _session_log = auth.subscribe(Box::new(|session: Option<&Session>| match session {
        Some(session) => info!(admin = %session.identifier, "administrator signed in"),
        None => info!("no administrator signed in"),
    }));

    let repository = Arc::new(InMemorySurveyRepository::default());
    let assistant = Arc::new(ConfiguredAssistant::from_mode(config.audit.assistant_mode));
    let survey_service = Arc::new(SurveyService::new(
        repository,
        assistant,
        config.audit.policy.clone(),
    ));

    let app = with_survey_routes(survey_service, auth)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        assistant = ?config.audit.assistant_mode,
        "energy audit service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
