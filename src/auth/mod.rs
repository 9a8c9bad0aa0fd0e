pub mod handlers;
mod provider;
pub mod session;

pub use provider::{AdminSession, AuthError, AuthProvider};
