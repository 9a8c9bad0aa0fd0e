use askama::Template;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use super::AuthError;
use crate::error::AppResult;
use crate::routes::home::Html;
use crate::state::AppState;

// -- Templates --

#[derive(Template, Default)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// -- Cookie helpers --

pub fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

pub fn get_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let (key, val) = cookie.split_once('=')?;
            if key.trim() == name {
                Some(val.trim())
            } else {
                None
            }
        })
}

// -- Handlers --

/// POST /admin/login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    match state
        .auth
        .sign_in_with_password(&form.email, &form.password)
        .await
    {
        Ok(session) => {
            let cookie = session_cookie(
                &state.config.auth.cookie_name,
                &session.token,
                state.auth.session_hours(),
            );
            Ok((
                StatusCode::SEE_OTHER,
                [
                    (header::LOCATION, "/admin".to_string()),
                    (header::SET_COOKIE, cookie),
                ],
                "",
            )
                .into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let page = LoginTemplate {
                email: form.email.trim().to_string(),
                error: Some(AuthError::InvalidCredentials.to_string()),
            };
            Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = get_cookie_value(&headers, cookie_name) {
        if let Err(e) = state.auth.sign_out(token).await {
            tracing::warn!("Could not delete session on logout: {}", e);
        }
    }

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/admin".to_string()),
            (header::SET_COOKIE, clear_session_cookie(cookie_name)),
        ],
        "",
    )
        .into_response())
}
