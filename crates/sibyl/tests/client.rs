use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::TryStreamExt;
use rstest::*;
use serde_json::{json, Value};
use sibyl::{Client, Error, Status};
use sibyl_test_utils::TestHttpServer;

type SeenAuth = Arc<Mutex<Vec<String>>>;

async fn prediction_endpoint(State(seen): State<SeenAuth>, headers: HeaderMap) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    seen.lock().unwrap().push(auth);

    Json(json!({
        "id": "p1",
        "status": "processing",
        "urls": {"get": "https://api.example/v1/predictions/p1"},
    }))
    .into_response()
}

fn client_for(server: &TestHttpServer) -> Client {
    Client::builder()
        .token("tok-123")
        .base_url(server.base_url().to_string())
        .build()
        .unwrap()
}

#[rstest]
#[tokio::test]
async fn predictions_get_decodes_and_authenticates() {
    let seen: SeenAuth = Arc::default();
    let router = Router::new()
        .route("/predictions/{id}", get(prediction_endpoint))
        .with_state(seen.clone());
    let server = TestHttpServer::new(router).await;

    let prediction = client_for(&server).predictions_get("p1").await.unwrap();

    assert_eq!(prediction.id, "p1");
    assert_eq!(prediction.status, Status::Processing);
    assert_eq!(seen.lock().unwrap().as_slice(), ["Bearer tok-123"]);
}

#[rstest]
#[tokio::test]
async fn get_surfaces_api_errors() {
    let router = Router::new().route(
        "/predictions/{id}",
        get(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"title":"Invalid prediction","status":422}"#,
            )
        }),
    );
    let server = TestHttpServer::new(router).await;

    let err = client_for(&server).predictions_get("bad").await.unwrap_err();
    match err {
        Error::Net(net) => assert_eq!(net.status_code(), Some(422)),
        other => panic!("expected net error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn post_json_sends_content_type_and_body() {
    async fn create(headers: HeaderMap, Json(body): Json<Value>) -> Response {
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        Json(json!({
            "id": "p2",
            "status": "starting",
            "input": body["input"],
        }))
        .into_response()
    }

    let router = Router::new().route("/predictions", post(create));
    let server = TestHttpServer::new(router).await;

    let prediction: sibyl::Prediction = client_for(&server)
        .post_json("predictions", &json!({"input": {"prompt": "hi"}}))
        .await
        .unwrap();

    assert_eq!(prediction.id, "p2");
    assert_eq!(prediction.input, Some(json!({"prompt": "hi"})));
}

#[rstest]
#[tokio::test]
async fn stream_text_end_to_end() {
    let stream_body = "event: output\ndata: foo\n\nevent: done\n\n";
    let router = Router::new().route(
        "/stream",
        get(move || async move {
            (
                [(header::CONTENT_TYPE, "text/event-stream")],
                stream_body,
            )
        }),
    );
    let server = TestHttpServer::new(router).await;

    let client = client_for(&server);
    let prediction: sibyl::Prediction = serde_json::from_value(json!({
        "id": "p1",
        "status": "processing",
        "urls": {"stream": server.url("/stream").to_string()},
    }))
    .unwrap();

    let chunks: Vec<_> = client
        .stream_text(&prediction)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(chunks, vec!["foo"]);
}
