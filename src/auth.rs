use crate::flow::ModelCapability;
use crate::models::ErrorResponse;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info};

const PUBLIC_PATHS: [&str; 2] = ["/", "/health"];

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelCapability>,
    pub token: Option<String>,
}

fn provided_token(request: &Request<Body>) -> Option<&str> {
    let headers = request.headers();
    headers
        .get("Authorization")
        .and_then(|hv| hv.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(|t| t.trim()))
        .or_else(|| headers.get("x-api-key").and_then(|hv| hv.to_str().ok()))
}

pub async fn require_authorization(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(expected) = app_state.token.as_deref() else {
        return Ok(next.run(request).await);
    };
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let rejection = match provided_token(&request) {
        None => {
            info!("Missing Authorization header");
            Some(ErrorResponse::new("Authorization header is required", "invalid_request_error", "missing_auth_header"))
        }
        Some(token) if token != expected => {
            info!("Invalid token provided");
            Some(ErrorResponse::new("Invalid authentication token", "invalid_request_error", "invalid_token"))
        }
        Some(_) => None,
    };

    if let Some(body) = rejection {
        return Err((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    }
    debug!("Token validation successful");
    Ok(next.run(request).await)
}
