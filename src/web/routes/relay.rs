//! Form-to-mail endpoints.
//!
//! `POST /send_mail` and `POST /camagru_mail` share one handler; the route
//! decides which [`MailKind`] it formats. A request moves through
//! body check → JSON decode → compose → relay, and any failed step answers
//! 400 with the underlying error text before the next one runs.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::info;

use crate::mail::{FormData, MailKind};
use crate::web::errors::bad_request;
use crate::web::AppState;

pub const EMPTY_BODY_MESSAGE: &str = "request body is empty";

pub async fn send_mail(kind: MailKind, State(state): State<AppState>, body: Bytes) -> Response {
    info!("[relay] {:?} request, {} bytes", kind, body.len());

    if body.is_empty() {
        return bad_request("request has no body", EMPTY_BODY_MESSAGE);
    }

    // Only the first JSON value is read; anything after it is ignored.
    let form = match serde_json::Deserializer::from_slice(&body)
        .into_iter::<FormData>()
        .next()
    {
        Some(Ok(form)) => form,
        Some(Err(e)) => return bad_request("error decoding body", e),
        None => return bad_request("request has no body", EMPTY_BODY_MESSAGE),
    };

    let mail = kind.compose(&form, &state.config);

    if let Err(e) = state.mailer.send(&mail).await {
        return bad_request("error sending email", e);
    }

    info!(
        "[relay] {:?} mail sent from={} to={}",
        kind,
        mail.envelope_from,
        mail.envelope_to.join(", ")
    );
    StatusCode::OK.into_response()
}

/// CORS preflight for the mail endpoints; headers come from the route layers.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::mail::OutboundMail;
    use crate::smtp::{MailError, Mailer};
    use crate::web::router;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutboundMail>>,
        failure: Option<String>,
    }

    impl RecordingMailer {
        fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<OutboundMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[axum::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail.clone());
            match &self.failure {
                Some(message) => Err(MailError::Transport(message.clone())),
                None => Ok(()),
            }
        }
    }

    fn state(mailer: Arc<RecordingMailer>) -> AppState {
        let config = Config {
            contact_email: "owner@site.com".to_string(),
            noreply: "noreply@camagru.io".to_string(),
            ..Config::default()
        };
        AppState::new(Arc::new(config), mailer)
    }

    async fn post(mailer: Arc<RecordingMailer>, uri: &str, body: &str) -> (Response, String) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router(state(mailer)).oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        (
            Response::from_parts(parts, Body::empty()),
            String::from_utf8(bytes.to_vec()).unwrap(),
        )
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }

    const ALICE: &str = r#"{"name":"Alice","email":"alice@example.com","message":"Hi"}"#;

    #[tokio::test]
    async fn send_mail_relays_contact_message() {
        let mailer = Arc::new(RecordingMailer::default());
        let (response, body) = post(mailer.clone(), "/send_mail", ALICE).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body.is_empty());
        assert_cors(&response);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].envelope_from, "alice@example.com");
        assert_eq!(sent[0].envelope_to, vec!["owner@site.com"]);
        assert_eq!(
            String::from_utf8(sent[0].body.clone()).unwrap(),
            "To: owner@site.com\r\nSubject: Message via Portfolio: Alice\r\n\r\nHi\r\n"
        );
    }

    #[tokio::test]
    async fn camagru_mail_relays_notification() {
        let mailer = Arc::new(RecordingMailer::default());
        let (response, _) = post(mailer.clone(), "/camagru_mail", ALICE).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].envelope_from, "noreply@camagru.io");
        assert_eq!(sent[0].envelope_to, vec!["alice@example.com"]);
        assert!(String::from_utf8(sent[0].body.clone())
            .unwrap()
            .starts_with("To: alice@example.com\r\n"));
    }

    #[tokio::test]
    async fn empty_body_rejected_before_smtp() {
        let mailer = Arc::new(RecordingMailer::default());
        let (response, body) = post(mailer.clone(), "/send_mail", "").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body, EMPTY_BODY_MESSAGE);
        assert_cors(&response);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_rejected_before_smtp() {
        let mailer = Arc::new(RecordingMailer::default());
        let (response, body) = post(mailer.clone(), "/camagru_mail", "{\"name\": ").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body.contains("EOF"), "unexpected body: {}", body);
        assert_cors(&response);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn whitespace_body_rejected_before_smtp() {
        let mailer = Arc::new(RecordingMailer::default());
        let (response, body) = post(mailer.clone(), "/send_mail", "  \n").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body, EMPTY_BODY_MESSAGE);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn data_after_first_json_value_ignored() {
        let mailer = Arc::new(RecordingMailer::default());
        let payload = format!("{} trailing", ALICE);
        let (response, _) = post(mailer.clone(), "/send_mail", &payload).await;

        assert_eq!(response.status(), StatusCode::OK);
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].envelope_from, "alice@example.com");
    }

    #[tokio::test]
    async fn smtp_failure_surfaces_error_text() {
        let mailer = Arc::new(RecordingMailer::failing("535 authentication failed"));
        let (response, body) = post(mailer.clone(), "/send_mail", ALICE).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body.contains("535 authentication failed"));
        assert_cors(&response);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn preflight_answers_with_cors_headers() {
        let mailer = Arc::new(RecordingMailer::default());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/send_mail")
            .header(header::ORIGIN, "https://portfolio.example")
            .body(Body::empty())
            .unwrap();
        let response = router(state(mailer.clone())).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_cors(&response);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn wrong_method_still_carries_cors_headers() {
        let mailer = Arc::new(RecordingMailer::default());
        let request = Request::builder()
            .method("GET")
            .uri("/camagru_mail")
            .body(Body::empty())
            .unwrap();
        let response = router(state(mailer.clone())).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn index_and_unknown_paths() {
        let mailer = Arc::new(RecordingMailer::default());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = router(state(mailer.clone())).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], super::super::index::INDEX_TEXT.as_bytes());

        let request = Request::builder().uri("/nowhere").body(Body::empty()).unwrap();
        let response = router(state(mailer)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
