//! Request builders and response readers for `oneshot` calls against the router.

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use serde_json::Value;

pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn test_request_json(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn parse_json_response(response: Response<Body>) -> Value {
    let body_bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body_bytes).expect("Failed to parse JSON response")
}

pub async fn read_text_response(response: Response<Body>) -> String {
    let body_bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(body_bytes.to_vec()).expect("Response body is not UTF-8")
}
