use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::handlers::get_cookie_value;
use crate::auth::AdminSession;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a signed-in admin.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = get_cookie_value(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        state
            .auth
            .get_session(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional admin extractor: None instead of 401 when not signed in.
pub struct MaybeAdmin(pub Option<AdminSession>);

impl FromRequestParts<AppState> for MaybeAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AdminSession::from_request_parts(parts, state).await {
            Ok(session) => Ok(MaybeAdmin(Some(session))),
            Err(AppError::Unauthorized) => Ok(MaybeAdmin(None)),
            Err(e) => Err(e),
        }
    }
}
