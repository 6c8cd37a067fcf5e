use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use rstest::*;
use sibyl_net::{Headers, HttpClient, Method, Net, NetError, NetExt, NetOptions, RetryPolicy};
use sibyl_test_utils::TestHttpServer;

#[derive(Clone, Default)]
struct Counter(Arc<AtomicU32>);

impl Counter {
    fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

fn retry_after_zero() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::RETRY_AFTER, "0".parse().unwrap());
    headers
}

async fn flaky_endpoint(State(counter): State<Counter>) -> impl IntoResponse {
    match counter.next() {
        0 => (
            StatusCode::TOO_MANY_REQUESTS,
            retry_after_zero(),
            r#"{"title":"Too many requests","status":429}"#,
        ),
        1 => (
            StatusCode::INTERNAL_SERVER_ERROR,
            retry_after_zero(),
            r#"{"title":"Internal error","status":500}"#,
        ),
        _ => (StatusCode::OK, HeaderMap::new(), r#"{"ok":true}"#),
    }
}

fn client() -> impl Net {
    HttpClient::new(NetOptions::default())
        .expect("build client")
        .with_retry(RetryPolicy::default())
}

#[rstest]
#[tokio::test]
async fn get_survives_429_then_500() {
    let counter = Counter::default();
    let router = Router::new()
        .route("/job", get(flaky_endpoint))
        .with_state(counter.clone());
    let server = TestHttpServer::new(router).await;

    let resp = client()
        .send(Method::GET, server.url("/job"), Headers::new(), None)
        .await
        .expect("GET retries through 429 and 500");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body.as_ref(), br#"{"ok":true}"#);
    assert_eq!(counter.0.load(Ordering::SeqCst), 3);
}

#[rstest]
#[tokio::test]
async fn post_stops_at_first_5xx() {
    let counter = Counter::default();
    let router = Router::new()
        .route("/job", post(flaky_endpoint))
        .with_state(counter.clone());
    let server = TestHttpServer::new(router).await;

    let err = client()
        .send(
            Method::POST,
            server.url("/job"),
            Headers::new(),
            Some(Bytes::from_static(b"{}")),
        )
        .await
        .expect_err("POST must not retry a 500");

    assert_eq!(err.status_code(), Some(500));
    // one retry for the 429, then the 500 surfaced
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn non_retryable_status_surfaces_api_payload() {
    let router = Router::new().route(
        "/missing",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                r#"{"title":"Not found","status":404,"detail":"no such prediction"}"#,
            )
        }),
    );
    let server = TestHttpServer::new(router).await;

    let err = client()
        .send(Method::GET, server.url("/missing"), Headers::new(), None)
        .await
        .expect_err("404 is not retryable");

    match err {
        NetError::Api(api) => {
            assert_eq!(api.status, 404);
            assert_eq!(api.title, "Not found");
            assert_eq!(api.detail, "no such prediction");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn request_headers_are_forwarded() {
    let router = Router::new().route(
        "/echo",
        get(|headers: HeaderMap| async move {
            headers
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
                .unwrap_or_default()
        }),
    );
    let server = TestHttpServer::new(router).await;

    let mut headers = Headers::new();
    headers.insert("Authorization", "Bearer sk-test");

    let resp = client()
        .send(Method::GET, server.url("/echo"), headers, None)
        .await
        .expect("echo request");

    assert_eq!(resp.body.as_ref(), b"Bearer sk-test");
}
