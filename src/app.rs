use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::pages;
use crate::rpc;
use crate::session;
use crate::shared::AppState;

/// Builds the full HTTP surface over the given state
pub fn build_router(app_state: AppState) -> Router {
    let protected_auth_routes = Router::new()
        .route("/api/auth/sign-out", post(session::sign_out))
        .route("/api/auth/list-sessions", get(session::list_sessions))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            session::session_auth,
        ));

    Router::new()
        .route("/", get(pages::home))
        .route("/dashboard", get(pages::dashboard))
        .route(
            "/auth/sign-in",
            get(pages::sign_in).post(pages::sign_in_submit),
        )
        .route("/api/auth/sign-up", post(session::sign_up))
        .route("/api/auth/sign-in", post(session::sign_in))
        .route("/api/auth/get-session", get(session::get_session))
        .merge(protected_auth_routes)
        .route(
            "/api/trpc/:procedure",
            get(rpc::rpc_query).post(rpc::rpc_mutation),
        )
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
