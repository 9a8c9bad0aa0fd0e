// Library exports for Atelier
// This allows integration tests and the binary to share the same modules

pub mod auth;
pub mod collection;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod store;
pub mod upload;
