use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{info, instrument, warn};

use crate::session::{session_cookie, types::SignInRequest};
use crate::shared::{AppError, AppState};

/// GET / - every user, pretty-printed
#[instrument(name = "home_page", skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let users = state.user_repository.find_many().await?;
    let pretty = serde_json::to_string_pretty(&users).map_err(|_| AppError::Internal)?;

    Ok(Html(layout(
        "Home",
        &format!("<pre>{}</pre>", escape_html(&pretty)),
    )))
}

/// GET /dashboard - signed-in users only
#[instrument(name = "dashboard_page", skip(state, headers))]
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let auth = match state
        .auth_gate
        .require_auth(&headers)
        .await
        .into_response_result()
    {
        Ok(auth) => auth,
        Err(redirect) => return redirect,
    };

    info!(user_id = %auth.user.id, "Rendering dashboard");

    Html(layout(
        "Dashboard",
        &format!(
            "<h1>dashboard</h1><p>Signed in as {}</p>",
            escape_html(&auth.user.name)
        ),
    ))
    .into_response()
}

/// GET /auth/sign-in - signed-out users only
#[instrument(name = "sign_in_page", skip(state, headers))]
pub async fn sign_in(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(redirect) = state
        .auth_gate
        .require_no_auth(&headers)
        .await
        .into_response_result()
    {
        return redirect;
    }

    Html(layout("Log in", &sign_in_form(None))).into_response()
}

/// POST /auth/sign-in - form submission from the sign-in page
///
/// Success sets the session cookie and sends the browser home with a 303;
/// bad credentials re-render the form with a 401.
#[instrument(name = "sign_in_submit", skip_all)]
pub async fn sign_in_submit(
    State(state): State<AppState>,
    Form(form): Form<SignInRequest>,
) -> Response {
    let response = match state.session_service.sign_in(form).await {
        Ok(response) => response,
        Err(e @ (AppError::InvalidCredentials | AppError::BadRequest(_))) => {
            warn!(error = %e, "Sign-in form rejected");
            let message = match e {
                AppError::BadRequest(msg) => msg,
                other => other.to_string(),
            };
            return (
                StatusCode::UNAUTHORIZED,
                Html(layout("Log in", &sign_in_form(Some(&message)))),
            )
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    let cookie = match session_cookie(&state.config, &response.token) {
        Ok(cookie) => cookie,
        Err(e) => return e.into_response(),
    };

    info!(user_id = %response.user.id, "Signed in through form");

    (
        [(header::SET_COOKIE, cookie)],
        Redirect::to(&state.config.redirects.home_path),
    )
        .into_response()
}

fn sign_in_form(error: Option<&str>) -> String {
    let error = error
        .map(|msg| format!("<p class=\"error\">{}</p>", escape_html(msg)))
        .unwrap_or_default();
    format!(
        r#"<h1>Log in</h1>
<p>Use your email and password to log in.</p>
{error}<form id="sign-in" action="/auth/sign-in" method="post">
  <input name="email" type="email" placeholder="your-email@example.com" required>
  <input name="password" type="password" placeholder="Secret password" required>
  <button type="submit">Log in</button>
</form>"#
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape_html(title),
        body
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
