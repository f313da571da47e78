// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /health
// - POST /api/v1/evaluate      (scores, validation, required semantic policy)
// - POST /api/v1/query + GET /api/v1/query/{id}  (submit/poll lifecycle)
// - GET  /api/v1/metrics/{brand}, /api/v1/history/{brand}

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use brand_visibility::api::{create_router, AppState};
use brand_visibility::engine::Engine;
use brand_visibility::generator::MockGenerator;
use brand_visibility::history::InMemoryHistory;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests
const ACME: &str = "Acme is a great tool, Acme helps everyone.";

fn router_with(engine: Engine) -> Router {
    let state = AppState::new(
        engine,
        Arc::new(InMemoryHistory::default()),
        Arc::new(MockGenerator),
    );
    create_router(state)
}

fn test_router() -> Router {
    router_with(Engine::default())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

fn post_json(uri: &str, payload: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

/// Poll until the job leaves `Processing` (or give up after ~2s).
async fn wait_for_job(app: &Router, id: &str) -> Json {
    for _ in 0..200 {
        let (status, v) = send(app, get(&format!("/api/v1/query/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        if v["status"] != "Processing" {
            return v;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} still processing");
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_router();
    let resp = app.oneshot(get("/health")).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "OK");
}

#[tokio::test]
async fn evaluate_returns_scores_for_acme() {
    let app = test_router();
    let (status, v) = send(
        &app,
        post_json("/api/v1/evaluate", json!({ "brand_name": "Acme", "raw_text": ACME })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {v}");

    assert_eq!(v["brand_name"], "Acme");
    assert_eq!(v["keywords"], json!(["acme", "great", "helps"]));
    assert_eq!(v["semantic_degraded"], true);

    let s = &v["sub_scores"];
    assert_eq!(s["semantic_similarity"], 0.0);
    assert_eq!(s["keyword_match"], 1.0);
    assert_eq!(s["brand_frequency"], 1.0);
    assert_eq!(s["correctness"], 1.0);
    assert_eq!(s["consistency"], 1.0);
    // lexicon valence 4 -> compound 0.718 -> sentiment 0.859
    assert_eq!(s["sentiment"], 0.859);

    let score = v["visibility_score"].as_f64().unwrap();
    assert!((score - 72.18).abs() < 1e-9, "score {score}");
}

#[tokio::test]
async fn evaluate_rejects_blank_brand_with_400() {
    let app = test_router();
    let (status, v) = send(
        &app,
        post_json("/api/v1/evaluate", json!({ "brand_name": "  ", "raw_text": ACME })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap().contains("brand name"));
}

#[tokio::test]
async fn evaluate_without_model_in_required_mode_is_503() {
    let app = router_with(Engine::default().semantic_required(true));
    let (status, v) = send(
        &app,
        post_json("/api/v1/evaluate", json!({ "brand_name": "Acme", "raw_text": ACME })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(v.get("error").is_some());
}

#[tokio::test]
async fn evaluate_records_only_when_asked() {
    let app = test_router();

    let payload = json!({ "brand_name": "Acme", "raw_text": ACME });
    let (status, _) = send(&app, post_json("/api/v1/evaluate", payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, agg) = send(&app, get("/api/v1/metrics/Acme")).await;
    assert_eq!(agg["total_queries"], 0);
    assert_eq!(agg["average_visibility_score"], 0.0);

    let payload = json!({ "brand_name": "Acme", "raw_text": ACME, "record": true });
    let (_, eval) = send(&app, post_json("/api/v1/evaluate", payload)).await;

    let (_, hist) = send(&app, get("/api/v1/history/acme")).await;
    let entries = hist["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["score"], eval["visibility_score"]);
}

#[tokio::test]
async fn query_lifecycle_completes_and_feeds_aggregate() {
    let app = test_router();

    let req = post_json("/api/v1/query", json!({ "brand_name": "Acme", "raw_text": ACME }));
    let (status, accepted) = send(&app, req).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(accepted["status"], "Processing");
    let id = accepted["response_id"].as_str().unwrap().to_string();

    let done = wait_for_job(&app, &id).await;
    assert_eq!(done["status"], "Complete", "job: {done}");
    assert_eq!(done["response_id"], id.as_str());
    assert_eq!(done["raw_llm_response"], ACME);
    assert!(done["processed_at"].is_string());
    let score = done["visibility_score"].as_f64().unwrap();

    let (status, agg) = send(&app, get("/api/v1/metrics/Acme")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agg["brand_name"], "Acme");
    assert_eq!(agg["total_queries"], 1);
    assert_eq!(agg["average_visibility_score"].as_f64().unwrap(), score);
}

#[tokio::test]
async fn query_without_text_uses_generator() {
    let app = test_router();

    let (status, accepted) =
        send(&app, post_json("/api/v1/query", json!({ "brand_name": "Pathao" }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let id = accepted["response_id"].as_str().unwrap().to_string();

    let done = wait_for_job(&app, &id).await;
    assert_eq!(done["status"], "Complete");
    assert!(done["raw_llm_response"]
        .as_str()
        .unwrap()
        .starts_with("Pathao is a popular"));
    assert_eq!(done["sub_scores"]["correctness"], 1.0);
}

#[tokio::test]
async fn query_rejects_blank_brand_with_400() {
    let app = test_router();
    let (status, v) = send(&app, post_json("/api/v1/query", json!({ "brand_name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v.get("error").is_some());
}

#[tokio::test]
async fn unknown_or_malformed_query_id_is_404() {
    let app = test_router();

    let (status, v) = send(
        &app,
        get("/api/v1/query/4b1f0d6e-2c1a-4d7e-9f00-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(v.get("error").is_some());

    let (status, _) = send(&app, get("/api/v1/query/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_identical_queries_stay_fully_consistent() {
    let app = test_router();

    let mut scores = Vec::new();
    for _ in 0..3 {
        let req = post_json("/api/v1/query", json!({ "brand_name": "Acme", "raw_text": ACME }));
        let (_, accepted) = send(&app, req).await;
        let id = accepted["response_id"].as_str().unwrap().to_string();
        let done = wait_for_job(&app, &id).await;
        assert_eq!(done["status"], "Complete");
        assert_eq!(done["sub_scores"]["consistency"], 1.0, "job: {done}");
        scores.push(done["visibility_score"].as_f64().unwrap());
    }
    assert!(scores.iter().all(|s| *s == scores[0]), "{scores:?}");

    let (_, agg) = send(&app, get("/api/v1/metrics/acme")).await;
    assert_eq!(agg["total_queries"], 3);
    assert_eq!(agg["average_visibility_score"].as_f64().unwrap(), scores[0]);
}
