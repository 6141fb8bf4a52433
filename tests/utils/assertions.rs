use axum::{http::header, response::Response};
use serde_json::Value;

// ============================================================================
// Response Assertions
// ============================================================================

#[allow(dead_code)]
pub fn assert_redirect(response: &Response, location: &str) {
    assert_eq!(response.status(), 307, "expected a temporary redirect");
    assert_eq!(
        response.headers()[header::LOCATION].to_str().unwrap(),
        location
    );
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
