use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use log::{info, warn};

/// Plain-text error reply carrying the underlying message as the body.
pub fn status_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, message.into()).into_response()
}

pub fn bad_request(context: &str, message: impl std::fmt::Display) -> Response {
    let message = message.to_string();
    warn!("[web] {}: {}", context, message);
    status_response(StatusCode::BAD_REQUEST, message)
}

pub async fn handle_not_found(uri: Uri) -> Response {
    info!("[web] no route for {}", uri.path());
    status_response(
        StatusCode::NOT_FOUND,
        format!("No page exists at {}", uri.path()),
    )
}
