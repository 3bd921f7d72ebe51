//! Turns a form submission into the bytes and envelope handed to the relay.

use serde::Deserialize;

use crate::config::Config;

pub const PORTFOLIO_SUBJECT_PREFIX: &str = "Message via Portfolio: ";
pub const CAMAGRU_SUBJECT: &str = "Camagru - User Verification/Password Reset";

/// Body of `POST /send_mail` and `POST /camagru_mail`.
///
/// Absent fields decode as empty strings. Capitalised keys (`"Name"`, ...)
/// are accepted alongside the lowercase ones.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormData {
    #[serde(alias = "Name", alias = "NAME")]
    pub name: String,
    #[serde(alias = "Email", alias = "EMAIL")]
    pub email: String,
    #[serde(alias = "Message", alias = "MESSAGE")]
    pub message: String,
}

/// Which message a route produces. Chosen once, when the route is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MailKind {
    /// Portfolio contact form: addressed to the site owner, sent as the submitter.
    SiteContact,
    /// Camagru verification/reset notice: addressed to the user, sent from no-reply.
    UserNotification,
}

/// A formatted message plus the SMTP envelope it travels under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMail {
    pub envelope_from: String,
    pub envelope_to: Vec<String>,
    pub body: Vec<u8>,
}

impl MailKind {
    pub fn compose(self, form: &FormData, config: &Config) -> OutboundMail {
        match self {
            MailKind::SiteContact => OutboundMail {
                envelope_from: form.email.clone(),
                envelope_to: vec![config.contact_email.clone()],
                body: render(
                    &config.contact_email,
                    &format!("{}{}", PORTFOLIO_SUBJECT_PREFIX, form.name),
                    &form.message,
                ),
            },
            MailKind::UserNotification => OutboundMail {
                envelope_from: config.noreply.clone(),
                envelope_to: vec![form.email.clone()],
                body: render(&form.email, CAMAGRU_SUBJECT, &form.message),
            },
        }
    }
}

fn header_value(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

/// Every line break in the body goes on the wire as CRLF.
fn crlf_lines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n").replace('\n', "\r\n")
}

fn render(to: &str, subject: &str, message: &str) -> Vec<u8> {
    format!(
        "To: {}\r\nSubject: {}\r\n\r\n{}\r\n",
        header_value(to),
        header_value(subject),
        crlf_lines(message)
    )
    .into_bytes()
}
