use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Request Actions
// ============================================================================

#[allow(dead_code)]
impl TestSetup {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> Response {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut request =
            Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Response {
        self.post_json(
            "/api/auth/sign-up",
            json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Signs in and returns the `name=value` pair from the session cookie
    pub async fn sign_in(&self, email: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api/auth/sign-in",
                json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(response.status(), 200, "sign-in should succeed");
        session_cookie_pair(&response)
    }

    /// Creates a user and returns the session cookie sign-up issued for them
    pub async fn signed_in_user(&self, email: &str) -> String {
        let response = self.sign_up(email, "correct horse battery").await;
        assert_eq!(response.status(), 201, "sign-up should succeed");
        session_cookie_pair(&response)
    }

    pub async fn rpc_query(&self, procedure: &str, cookie: Option<&str>) -> Response {
        self.get(&format!("/api/trpc/{}", procedure), cookie).await
    }
}

/// The `name=value` part of the response's `Set-Cookie` header
pub fn session_cookie_pair(response: &Response) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}
