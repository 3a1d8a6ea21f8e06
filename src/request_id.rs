use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::{Instrument, info_span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

tokio::task_local! {
    // Set for the lifetime of each HTTP request so outbound calls can reuse it
    pub static CURRENT_REQUEST_ID: RequestId;
}

/// Id of the HTTP request being served by this task, if any.
pub fn current() -> Option<RequestId> {
    CURRENT_REQUEST_ID.try_with(|id| id.clone()).ok()
}

pub async fn inject_request_id(req: Request, next: Next) -> Response {
    // Reuse the caller's id when it is usable as a header value
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!(
        "http_request",
        trace_id = %id,
        method = %req.method(),
        path = %req.uri().path()
    );

    let mut resp = CURRENT_REQUEST_ID
        .scope(RequestId(id.clone()), next.run(req).instrument(span))
        .await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    resp
}
