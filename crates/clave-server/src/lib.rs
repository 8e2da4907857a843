//! HTTP surface for the Clave scheduling backend.
//!
//! The server is a thin layer over [`clave_core`]: handlers translate JSON
//! requests into repository calls and map [`clave_core::error::CoreError`]
//! values onto HTTP status codes. All routing lives in
//! [`handlers::create_router`] so integration tests can drive the full stack
//! without binding a socket.

pub mod config;
pub mod error;
pub mod handlers;

pub use config::ServerConfig;
pub use error::ApiError;
pub use handlers::{create_router, AppState};
