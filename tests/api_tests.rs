use axum::{
    body::Body,
    http::{HeaderValue, Method, Request, StatusCode, header},
};
use tower::ServiceExt; // for oneshot

use tubeid::api::{AppState, create_router};
use tubeid::batch::BatchCoordinator;
use tubeid::fetcher::{Fetch, FetchError};

const ORIGIN: &str = "http://localhost:3000";

/// Answers `id-<query>` for every query except ones starting with "miss".
struct EchoFetcher;

impl Fetch for EchoFetcher {
    async fn fetch(&self, query: &str) -> Result<String, FetchError> {
        if query.starts_with("miss") {
            return Err(FetchError::NotFound);
        }
        Ok(format!("id-{}", query.replace(' ', "_")))
    }
}

fn test_app() -> axum::Router {
    let coordinator = BatchCoordinator::new(EchoFetcher);
    create_router(AppState::new(coordinator, HeaderValue::from_static(ORIGIN)))
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let response = test_app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_search_returns_ids_in_query_order() {
    let (status, json) = get_json("/search?q=first&q=miss+me&q=third+one").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({ "video_ids": ["id-first", "", "id-third_one"] })
    );
}

#[tokio::test]
async fn test_search_single_query() {
    let (status, json) = get_json("/search?q=hello").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["video_ids"], serde_json::json!(["id-hello"]));
    assert_eq!(json.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_all_misses_is_still_ok() {
    let (status, json) = get_json("/search?q=miss1&q=miss2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["video_ids"], serde_json::json!(["", ""]));
}

#[tokio::test]
async fn test_search_ignores_other_params_and_keeps_empty_q() {
    let (status, json) = get_json("/search?page=2&q=&q=a%26b").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["video_ids"], serde_json::json!(["id-", "id-a&b"]));
}

#[tokio::test]
async fn test_search_with_diagnostics() {
    let (status, json) = get_json("/search?q=ok&q=miss&diagnostics=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "video_ids": ["id-ok", ""],
            "statuses": ["found", "not_found"],
        })
    );
}

#[tokio::test]
async fn test_search_without_q_is_bad_request() {
    for uri in ["/search", "/search?", "/search?query=abc"] {
        let response = test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Missing query parameters");
    }
}

#[tokio::test]
async fn test_search_rejects_post() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/search?q=a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health() {
    let (status, json) = get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/search?q=a")
                .header(header::ORIGIN, ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ORIGIN
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/search")
                .header(header::ORIGIN, ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    assert!(methods.contains("GET"));
    assert!(methods.contains("OPTIONS"));
    assert!(!methods.contains("POST"));

    let allowed_headers = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap();
    assert!(allowed_headers.contains("content-type"));
}

#[tokio::test]
async fn test_cors_never_echoes_other_origins() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/search?q=a")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // the fixed origin is always advertised, the browser does the rejecting
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ORIGIN
    );
}
