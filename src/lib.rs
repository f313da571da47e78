// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generator;
pub mod history;
pub mod jobs;
pub mod metrics;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::VisibilityConfig;
pub use crate::engine::{Engine, Evaluation, EvaluationInput};
pub use crate::error::{EmbeddingError, EngineError};

use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "visibility=info,warn";

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
/// `RUST_LOG` overrides the filter. Returns false when a subscriber was
/// already installed (e.g. by the runtime), which is then kept.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    match res {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(target: "visibility", "keeping existing tracing subscriber: {e}");
            false
        }
    }
}

/// Full in-process app: config from disk/env, API routes and `/metrics`.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = VisibilityConfig::load()?;
    app_with_config(&cfg)
}

/// Same as [`app`] with an already resolved config.
pub fn app_with_config(cfg: &VisibilityConfig) -> anyhow::Result<Router> {
    let metrics = crate::metrics::Metrics::init()?;
    let state = AppState::from_config(cfg)?;
    Ok(create_router(state).merge(metrics.router()))
}
