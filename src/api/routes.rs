//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::agents::AgentContext;
use crate::config::Config;
use crate::data::DataError;
use crate::goals::{GoalError, GoalExplorer, GoalReport, PersonaExplorer};
use crate::profile::profile_table;
use crate::summarize::{DataSummary, SummaryError, SummaryMethod, Summarizer};
use crate::tools::ToolRegistry;

use super::types::*;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub ctx: AgentContext,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let ctx = AgentContext::from_config(&config);
        Self { config, ctx }
    }
}

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn data_error(e: DataError) -> ApiError {
    error(StatusCode::BAD_REQUEST, e.to_string())
}

fn summary_error(e: SummaryError) -> ApiError {
    error(StatusCode::BAD_GATEWAY, e.to_string())
}

fn goal_error(e: GoalError) -> ApiError {
    match e {
        GoalError::ZeroRequested => error(StatusCode::BAD_REQUEST, e.to_string()),
        other => error(StatusCode::BAD_GATEWAY, other.to_string()),
    }
}

fn sample_count(requested: Option<usize>, config: &Config) -> Result<usize, ApiError> {
    match requested {
        Some(n) if n > MAX_SAMPLES => Err(error(
            StatusCode::BAD_REQUEST,
            format!("n_samples must be at most {}", MAX_SAMPLES),
        )),
        Some(n) => Ok(n),
        None => Ok(config.n_samples),
    }
}

/// Reject `n` before any model call is made.
fn check_requested(n: usize) -> Result<(), ApiError> {
    if n == 0 || n > MAX_REQUESTED {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("n must be between 1 and {}", MAX_REQUESTED),
        ));
    }
    Ok(())
}

/// Build the router. Split from [`serve`] so tests can drive it without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/profile", post(profile))
        .route("/api/summarize", post(summarize))
        .route("/api/goals", post(goals))
        .route("/api/personas", post(personas))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config));
    let app = router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.ctx.model.clone(),
        tools_enabled: !state.ctx.tools.is_empty(),
    })
}

async fn profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let n_samples = sample_count(req.n_samples, &state.config)?;
    let table = req.data.to_table().map_err(data_error)?;
    tracing::debug!(rows = table.num_rows(), columns = table.num_columns(), "Profiling dataset");

    Ok(Json(ProfileResponse {
        rows: table.num_rows(),
        fields: profile_table(&table, n_samples),
    }))
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<DataSummary>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("summarize", %request_id);
    let n_samples = sample_count(req.n_samples, &state.config)?;

    let summary = summarize_input(&state.ctx, &req.data, req.method, n_samples)
        .instrument(span)
        .await?;
    Ok(Json(summary))
}

async fn goals(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoalsRequest>,
) -> Result<Json<GoalReport>, ApiError> {
    check_requested(req.n)?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("goals", %request_id);

    async move {
        let summary = resolve_summary(&state, req.summary, req.data.as_ref(), req.method).await?;
        let ctx = match req.use_tools {
            Some(false) => state.ctx.without_tools(),
            Some(true) if state.ctx.tools.is_empty() => state.ctx.clone().with_tools(ToolRegistry::new()),
            _ => state.ctx.clone(),
        };
        let report = GoalExplorer::new(&ctx)
            .generate(&summary, req.n, req.persona)
            .await
            .map_err(|e| {
                tracing::warn!("Goal generation failed: {}", e);
                goal_error(e)
            })?;
        Ok::<_, ApiError>(Json(report))
    }
    .instrument(span)
    .await
}

async fn personas(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PersonasRequest>,
) -> Result<Json<PersonasResponse>, ApiError> {
    check_requested(req.n)?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("personas", %request_id);

    async move {
        let summary =
            resolve_summary(&state, req.summary, req.data.as_ref(), SummaryMethod::Default).await?;
        let personas = PersonaExplorer::new(&state.ctx)
            .generate(&summary, req.n)
            .await
            .map_err(goal_error)?;
        Ok::<_, ApiError>(Json(PersonasResponse { personas }))
    }
    .instrument(span)
    .await
}

async fn summarize_input(
    ctx: &AgentContext,
    data: &DatasetInput,
    method: SummaryMethod,
    n_samples: usize,
) -> Result<DataSummary, ApiError> {
    let table = data.to_table().map_err(data_error)?;
    Summarizer::new(ctx)
        .summarize(&table, &data.name(), &data.file_name(), method, n_samples)
        .await
        .map_err(|e| {
            tracing::warn!("Summarization failed: {}", e);
            summary_error(e)
        })
}

/// A supplied summary wins over raw data.
async fn resolve_summary(
    state: &AppState,
    summary: Option<DataSummary>,
    data: Option<&DatasetInput>,
    method: SummaryMethod,
) -> Result<DataSummary, ApiError> {
    match (summary, data) {
        (Some(summary), _) => Ok(summary),
        (None, Some(data)) => summarize_input(&state.ctx, data, method, state.config.n_samples).await,
        (None, None) => Err(error(
            StatusCode::BAD_REQUEST,
            "request needs either 'summary' or 'data'",
        )),
    }
}
