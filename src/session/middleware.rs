use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{info, instrument, warn};

use crate::shared::{AppError, AppState};

/// Session middleware - resolves the caller's session and adds it to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::session_auth))
/// Handlers can then extract Extension(auth): Extension<AuthSession>.
#[instrument(skip(state, req, next))]
pub async fn session_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = match state.session_resolver.get_session(req.headers()).await {
        Some(auth) => auth,
        None => {
            warn!(uri = %req.uri(), "Rejecting request without a valid session");
            return Err(AppError::Unauthenticated(
                "A valid session is required".to_string(),
            ));
        }
    };

    info!(
        user_id = %auth.user.id,
        session_id = %auth.session.id,
        "Authentication successful, adding session to request"
    );

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
