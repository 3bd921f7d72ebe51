pub mod index;
pub mod relay;

use super::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue},
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::mail::MailKind;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(index::page))
}

/// Mail endpoints. Every response from them, errors and rejections included,
/// carries the CORS headers and a JSON content type.
pub fn mail_routes() -> Router<AppState> {
    Router::new()
        .route("/send_mail", mail_route(MailKind::SiteContact))
        .route("/camagru_mail", mail_route(MailKind::UserNotification))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
}

fn mail_route(kind: MailKind) -> MethodRouter<AppState> {
    post(move |state: State<AppState>, body: Bytes| relay::send_mail(kind, state, body))
        .options(relay::preflight)
}
