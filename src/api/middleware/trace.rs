use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP header name for trace ID
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

tokio::task_local! {
    static CURRENT_TRACE_ID: TraceId;
}

/// Per-request trace ID
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trace ID of the request being served, `None` outside of one
    pub fn current() -> Option<TraceId> {
        CURRENT_TRACE_ID.try_with(|id| id.clone()).ok()
    }
}

/// Tag every request with a fresh UUID: runs the rest of the stack inside an
/// `http_request` span carrying it and echoes it back as `X-Trace-Id`.
///
/// Only the path is recorded; query strings stay out of the logs.
pub async fn trace_id_middleware(request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let handled = async move {
        tracing::debug!("Request started");
        let response = next.run(request).await;
        tracing::info!(status = %response.status(), "Request completed");
        response
    }
    .instrument(span);

    let mut response = CURRENT_TRACE_ID
        .scope(TraceId(trace_id.clone()), handled)
        .await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    response
}
