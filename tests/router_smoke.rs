use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cv_matcher::matching::{MatchEngine, MatchTaxonomy};
use cv_matcher::server;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;

// The prometheus recorder may only be installed once per process, so every
// test clones the same router.
fn app() -> Router {
    static ROUTER: OnceLock<Router> = OnceLock::new();
    ROUTER
        .get_or_init(|| {
            let engine = Arc::new(MatchEngine::categorical(MatchTaxonomy::dutch_technical()));
            let (router, readiness) = server::build(engine);
            readiness.store(true, Ordering::Release);
            router
        })
        .clone()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}

fn sample_cv() -> &'static str {
    "Jan Jansen\nElektromonteur met 8 jaar ervaring\nWoonachtig in Arnhem\nKennis van laagspanning en kabel"
}

#[tokio::test]
async fn health_and_ready_respond_ok() {
    let health = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .expect("health responds");
    assert_eq!(health.status(), StatusCode::OK);

    let ready = app()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .expect("ready responds");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn parse_endpoint_returns_profile() {
    let response = app()
        .oneshot(json_request(
            "/api/v1/candidates/parse",
            json!({ "cv_text": sample_cv() }),
        ))
        .await
        .expect("parse responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Jan Jansen");
    assert_eq!(body["target_function"], "Elektromonteur");
    assert_eq!(body["location"]["city"], "Arnhem");
}

#[tokio::test]
async fn parse_endpoint_rejects_short_text() {
    let response = app()
        .oneshot(json_request(
            "/api/v1/candidates/parse",
            json!({ "cv_text": "te kort" }),
        ))
        .await
        .expect("parse responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"].as_str().expect("error string").contains("too short"));
}

#[tokio::test]
async fn match_endpoint_ranks_vacancies() {
    let response = app()
        .oneshot(json_request(
            "/api/v1/matches",
            json!({
                "cv_text": sample_cv(),
                "vacancies": [
                    { "vacature": "Lasser", "plaats": "Rotterdam" },
                    { "Vacature": "Elektromonteur", "Plaats": "Arnhem" }
                ],
                "limit": 5
            }),
        ))
        .await
        .expect("match responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["scoring_path"], "categorical");
    let matches = body["matches"].as_array().expect("matches array");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["vacancy"]["title"], "Elektromonteur");
    assert_eq!(matches[0]["total_score"], 100);
    assert_eq!(matches[0]["tier"], "TIER1");
    assert_eq!(matches[1]["tier"], "TIER3");
    assert_eq!(body["tier_counts"]["tier1"], 1);
    assert_eq!(body["tier_counts"]["tier3"], 1);
}
