#![allow(dead_code)]

use atelier::auth::AuthProvider;
use atelier::config::Config;
use atelier::db;
use atelier::state::AppState;
use axum::body::Body;
use axum::http::{header, Request, Response};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "owner@studio.kg";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

/// App state on a throwaway data directory with one admin account.
pub async fn test_state() -> (TempDir, AppState) {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.database.path = Some(tmp.path().join("atelier.db"));
    config.storage.path = Some(tmp.path().join("media"));
    config.uploads.max_bytes = 1024;

    let pool = db::create_pool(&config.db_path()).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let mut state = AppState::new(pool.clone(), config);
    state.auth = AuthProvider::new(pool, 1).with_hash_cost(4);
    state
        .auth
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    state.load_collections().await.unwrap();

    (tmp, state)
}

pub fn login_request() -> Request<Body> {
    Request::post("/admin/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "email={}&password={}",
            ADMIN_EMAIL.replace('@', "%40"),
            ADMIN_PASSWORD.replace(' ', "+")
        )))
        .unwrap()
}

/// `name=value` from the first Set-Cookie header.
pub fn session_cookie<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .expect("No session cookie returned")
}

pub fn multipart_body(boundary: &str, files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, data) in files {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
