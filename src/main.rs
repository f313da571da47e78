//! Brand Visibility Service: binary entrypoint.
//! Boots the Axum HTTP server: config, tracing, shared state and routes.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    brand_visibility::init_tracing();

    let router = brand_visibility::app().await?;
    Ok(router.into())
}
