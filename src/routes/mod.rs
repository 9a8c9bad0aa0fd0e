pub mod admin;
pub mod contact;
pub mod files;
pub mod home;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.uploads.max_request_bytes;

    Router::new()
        .route("/", get(home::index))
        .route("/contact", post(contact::submit))
        .route("/media/{bucket}/{name}", get(files::media))
        .route("/assets/{*path}", get(files::asset))
        .merge(admin::router(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
