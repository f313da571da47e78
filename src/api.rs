use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::VisibilityConfig;
use crate::embedding::build_embedder;
use crate::engine::{self, anon_hash, Engine, Evaluation, EvaluationInput};
use crate::error::EngineError;
use crate::generator::{DynGenerator, MockGenerator};
use crate::history::{BrandAggregate, HistoryEntry, HistoryStore, InMemoryHistory};
use crate::jobs::{self, JobRecord, JobRegistry, JobStatus};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub history: Arc<dyn HistoryStore>,
    pub jobs: Arc<JobRegistry>,
    pub generator: DynGenerator,
}

impl AppState {
    pub fn new(engine: Engine, history: Arc<dyn HistoryStore>, generator: DynGenerator) -> Self {
        Self {
            engine: Arc::new(engine),
            history,
            jobs: Arc::new(JobRegistry::default()),
            generator,
        }
    }

    /// Wire engine, in-memory history and the mock generator from config.
    pub fn from_config(cfg: &VisibilityConfig) -> anyhow::Result<Self> {
        let embedder = build_embedder(&cfg.embedding)?;
        let engine = Engine::from_config(cfg, embedder);
        info!(
            target: "visibility",
            embedder = engine.embedder_name().unwrap_or("none"),
            semantic_required = engine.is_semantic_required(),
            history_capacity = cfg.history.capacity,
            "engine ready"
        );
        Ok(Self::new(
            engine,
            Arc::new(InMemoryHistory::with_capacity(cfg.history.capacity)),
            Arc::new(MockGenerator),
        ))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/v1/evaluate", post(evaluate))
        .route("/api/v1/query", post(submit_query))
        .route("/api/v1/query/{id}", get(get_query))
        .route("/api/v1/metrics/{brand}", get(brand_metrics))
        .route("/api/v1/history/{brand}", get(brand_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Error body `{ "error": "..." }` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} not found"),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match e {
            EngineError::EmptyBrandName => StatusCode::BAD_REQUEST,
            EngineError::UninitializedModel => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::Embedding(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Deserialize)]
struct EvaluateReq {
    brand_name: String,
    raw_text: String,
    /// Append the resulting score to the brand's history.
    #[serde(default)]
    record: bool,
}

async fn evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateReq>,
) -> Result<Json<Evaluation>, ApiError> {
    let input = EvaluationInput::new(req.brand_name, req.raw_text)?;
    let snapshot = state.history.snapshot(input.brand_name());
    let eval = state.engine.evaluate(&input, &snapshot).await?;
    if req.record {
        engine::record(state.history.as_ref(), &eval.brand_name, eval.visibility_score);
    }
    Ok(Json(eval))
}

#[derive(Deserialize)]
struct QueryReq {
    brand_name: String,
    /// When absent the response generator supplies the text.
    #[serde(default)]
    raw_text: Option<String>,
}

#[derive(Serialize)]
struct QueryAccepted {
    response_id: Uuid,
    status: JobStatus,
}

async fn submit_query(
    State(state): State<AppState>,
    Json(req): Json<QueryReq>,
) -> Result<(StatusCode, Json<QueryAccepted>), ApiError> {
    let brand = req.brand_name.trim().to_string();
    if brand.is_empty() {
        return Err(EngineError::EmptyBrandName.into());
    }

    let id = state.jobs.create(&brand, req.raw_text.as_deref());
    counter!("visibility_jobs_submitted_total").increment(1);
    info!(target: "visibility", %id, brand = %anon_hash(&brand), "query accepted");

    let raw_text = req.raw_text;
    tokio::spawn(async move {
        jobs::run_job(
            &state.jobs,
            &state.engine,
            state.history.as_ref(),
            state.generator.as_ref(),
            id,
            &brand,
            raw_text,
        )
        .await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(QueryAccepted {
            response_id: id,
            status: JobStatus::Processing,
        }),
    ))
}

async fn get_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, ApiError> {
    // A malformed id cannot name a job, so it is reported the same as an unknown one.
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::not_found("query"))?;
    state
        .jobs
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("query"))
}

async fn brand_metrics(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> Json<BrandAggregate> {
    Json(state.history.aggregate(brand.trim()))
}

#[derive(Serialize)]
struct HistoryOut {
    brand_name: String,
    entries: Vec<HistoryEntry>,
}

async fn brand_history(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> Json<HistoryOut> {
    let brand = brand.trim().to_string();
    let snap = state.history.snapshot(&brand);
    Json(HistoryOut {
        brand_name: brand,
        entries: snap.entries,
    })
}
