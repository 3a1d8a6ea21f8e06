use crate::action::{ANALYSIS_FAILED_MESSAGE, ActionResult, get_image_analysis};
use crate::auth::{self, AppState};
use crate::request_id;
use crate::schema::AnalyzeImageOutput;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::Html,
    routing::{get, post},
};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

/// A 4 MiB image grows by a third as base64, plus JSON framing.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const INDEX_HTML: &str = include_str!("../assets/index.html");

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/analyze", post(analyze_image))
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_authorization,
        ))
        .layer(middleware::from_fn(request_id::inject_request_id))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Always answers 200 with an `ActionResult`; a body that isn't JSON is
/// handled like a request without image data.
#[axum_macros::debug_handler]
pub async fn analyze_image(
    State(app_state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Json<ActionResult<AnalyzeImageOutput>> {
    let request = match payload {
        Ok(Json(v)) => v,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Analyze request body too large: {}", e);
            return Json(ActionResult::Failure(ANALYSIS_FAILED_MESSAGE.to_string()));
        }
        Err(e) => {
            warn!("Unreadable analyze request body: {}", e);
            Value::Null
        }
    };

    let result = get_image_analysis(app_state.model.as_ref(), &request).await;
    debug!("Analyze request finished, success: {}", result.is_success());
    Json(result)
}
