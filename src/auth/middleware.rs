//! Authentication middleware
//!
//! Extracts and validates JWT tokens from requests.

use crate::auth::decode_token;
use crate::error::AppError;
use axum::http::header::AUTHORIZATION;
use axum::{extract::Request, middleware::Next, response::Response};

/// Extract claims from the Authorization header and stash them in request
/// extensions for the handlers behind this layer.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

    let claims = decode_token(token)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
