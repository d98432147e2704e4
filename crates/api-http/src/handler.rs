//! Request Dispatch
//!
//! Bridges axum requests onto the shared dispatch table.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use netgate_core::application::execute_guarded_async;
use netgate_core::domain::{DispatchTable, HandlerRequest, HandlerResponse};
use std::sync::Arc;
use tracing::{debug, error};

/// Fallback handler: every request is looked up by (method, path)
pub async fn dispatch(
    State(table): State<Arc<DispatchTable>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let request = HandlerRequest {
        method: method.as_str().to_string(),
        path: uri.path().trim_start_matches('/').to_string(),
        query: uri.query().map(str::to_string),
        body: body.to_vec(),
    };
    debug!(method = %request.method, path = %request.path, "dispatch");

    let path = request.path.clone();
    let response = execute_guarded_async(table.dispatch(request))
        .await
        .into_result(|msg| msg)
        .unwrap_or_else(|msg| {
            error!(path = %path, panic_msg = %msg, "Handler panicked");
            HandlerResponse::internal_error("handler failed")
        });

    to_http(response)
}

fn to_http(response: HandlerResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "text/plain")],
        response.body,
    )
        .into_response()
}
