use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Demo-only credential check. A deployment would verify against a user
/// store and issue a real session token.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let username = payload
        .username
        .ok_or_else(|| ApiError::BadRequest("username is required".to_string()))?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::BadRequest("password is required".to_string()))?;

    if username == "admin" && password == "clave-admin" {
        Ok(Json(json!({
            "token": "demo-session-token",
            "message": "Login successful",
        })))
    } else {
        Err(ApiError::Unauthorized)
    }
}
