use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use finback_core::auth::AuthService;
use finback_core::domain::finance::{Forecast, Report, SaveForecastRequest};
use finback_core::error::Error;
use finback_core::finance::FinanceService;
use finback_core::storage::{PgForecastStore, PgReportStore, PgSentimentStore, PgUserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finback_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match finback_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let state = AppState {
        services: pool.map(|pool| Services::new(pool, settings.bcrypt_cost())),
    };

    let app = Router::new()
        .route("/", get(health_check))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/finance/save_report", post(save_report))
        .route("/api/finance/get_reports/:email", get(get_reports))
        .route(
            "/api/finance/get_report/:email/:report_name",
            get(get_report),
        )
        .route("/api/finance/save_forecast", post(save_forecast))
        .route("/api/finance/get_forecasts/:email", get(get_forecasts))
        .route("/api/finance/save_sentiment", post(save_sentiment))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // The browser frontend is served from another origin.
        .layer(CorsLayer::permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

#[derive(Clone)]
struct AppState {
    services: Option<Services>,
}

impl AppState {
    fn services(&self) -> Result<&Services, AppError> {
        self.services.as_ref().ok_or(AppError::Unavailable)
    }
}

#[derive(Clone)]
struct Services {
    auth: AuthService,
    finance: FinanceService,
}

impl Services {
    fn new(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self {
            auth: AuthService::new(Arc::new(PgUserStore::new(pool.clone())), bcrypt_cost),
            finance: FinanceService::new(
                Arc::new(PgReportStore::new(pool.clone())),
                Arc::new(PgForecastStore::new(pool.clone())),
                Arc::new(PgSentimentStore::new(pool)),
            ),
        }
    }
}

/// `axum::Json` with its rejection routed through the error taxonomy, so a
/// malformed or wrong-shaped body answers with the same `{"detail": ...}`
/// envelope as every other client error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
struct ApiJson<T>(T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Service(Error::Validation(rejection.body_text()))
    }
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SaveReportRequest {
    email: String,
    report_name: String,
    summary: String,
}

#[derive(Debug, Deserialize)]
struct SaveSentimentRequest {
    email: String,
    text: String,
    sentiment: String,
    confidence: f64,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    message: &'static str,
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct ReportsResponse {
    reports: Vec<Report>,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    report: Report,
}

#[derive(Debug, Serialize)]
struct SaveForecastResponse {
    message: &'static str,
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct ForecastsResponse {
    forecasts: Vec<Forecast>,
}

async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    require_well_formed_email(&req.email)?;
    state
        .services()?
        .auth
        .signup(&req.name, &req.email, &req.password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Signup successful!",
    }))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    require_well_formed_email(&req.email)?;
    let user = state
        .services()?
        .auth
        .login(&req.email, &req.password)
        .await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        name: user.name,
        email: user.email,
    }))
}

async fn save_report(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SaveReportRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services()?
        .finance
        .save_report(&req.email, &req.report_name, &req.summary)
        .await?;
    Ok(Json(MessageResponse {
        message: "Report saved successfully",
    }))
}

async fn get_reports(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ReportsResponse>, AppError> {
    let reports = state.services()?.finance.get_reports(&email).await?;
    Ok(Json(ReportsResponse { reports }))
}

async fn get_report(
    State(state): State<AppState>,
    Path((email, report_name)): Path<(String, String)>,
) -> Result<Json<ReportResponse>, AppError> {
    let report = state
        .services()?
        .finance
        .get_report(&email, &report_name)
        .await?;
    Ok(Json(ReportResponse { report }))
}

async fn save_forecast(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SaveForecastRequest>,
) -> Result<Json<SaveForecastResponse>, AppError> {
    let id = state.services()?.finance.save_forecast(req).await?;
    Ok(Json(SaveForecastResponse {
        message: "Forecast saved successfully!",
        id,
    }))
}

async fn get_forecasts(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ForecastsResponse>, AppError> {
    let forecasts = state.services()?.finance.get_forecasts(&email).await?;
    Ok(Json(ForecastsResponse { forecasts }))
}

async fn save_sentiment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SaveSentimentRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services()?
        .finance
        .save_sentiment(&req.email, &req.text, &req.sentiment, req.confidence)
        .await?;
    Ok(Json(MessageResponse {
        message: "Sentiment data saved successfully",
    }))
}

#[derive(Debug)]
enum AppError {
    Unavailable,
    Service(Error),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Service(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "database unavailable".to_string(),
            ),
            AppError::Service(err) => (status_for(err), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(%status, %detail, "request failed");
        }

        (status, Json(json!({"detail": detail}))).into_response()
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::DuplicateUser | Error::DuplicateReport => StatusCode::BAD_REQUEST,
        Error::UserNotFound | Error::ReportNotFound => StatusCode::NOT_FOUND,
        Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
        Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn require_well_formed_email(email: &str) -> Result<(), AppError> {
    let well_formed = matches!(
        email.split_once('@'),
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    );
    if !well_formed {
        return Err(AppError::Service(Error::Validation(format!(
            "value is not a valid email address: {email}"
        ))));
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &finback_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
