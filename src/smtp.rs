use std::sync::Arc;

use lettre::address::{Address, Envelope};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use log::{debug, info};
use thiserror::Error;

use crate::config::Config;
use crate::mail::OutboundMail;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid SMTP configuration: {0}")]
    Config(String),

    #[error("invalid address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("{0}")]
    Transport(String),
}

/// Delivers one formatted message. One call, one SMTP session.
#[axum::async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError>;
}

/// Relays through the configured SMTP host using PLAIN auth.
pub struct SmtpRelay {
    config: Arc<Config>,
}

impl SmtpRelay {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let host = self.config.smtp_hostname.as_str();
        let port: u16 = self.config.smtp_port.trim().parse().map_err(|_| {
            MailError::Config(format!("SMTP port {:?} is not a port number", self.config.smtp_port))
        })?;

        let tls = TlsParameters::new(host.to_string())
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let credentials = Credentials::new(
            self.config.smtp_login.clone(),
            self.config.smtp_password.clone(),
        );

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .tls(tls_policy(host, tls))
            .credentials(credentials)
            .authentication(vec![Mechanism::Plain]);
        if let Some(timeout) = self.config.smtp_timeout {
            builder = builder.timeout(Some(timeout));
        }

        Ok(builder.build())
    }
}

/// Hosts that may receive credentials over an unencrypted session.
const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// PLAIN auth only goes out over TLS, except to a relay on this machine.
fn tls_policy(host: &str, params: TlsParameters) -> Tls {
    if LOOPBACK_HOSTS.contains(&host) {
        Tls::Opportunistic(params)
    } else {
        Tls::Required(params)
    }
}

fn parse_address(address: &str) -> Result<Address, MailError> {
    address.trim().parse::<Address>().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// An empty envelope-from becomes the null sender `<>`.
pub fn envelope_for(mail: &OutboundMail) -> Result<Envelope, MailError> {
    let from = if mail.envelope_from.trim().is_empty() {
        None
    } else {
        Some(parse_address(&mail.envelope_from)?)
    };
    let to = mail
        .envelope_to
        .iter()
        .map(|a| parse_address(a))
        .collect::<Result<Vec<_>, _>>()?;

    Envelope::new(from, to).map_err(|e| MailError::Transport(e.to_string()))
}

#[axum::async_trait]
impl Mailer for SmtpRelay {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        let envelope = envelope_for(mail)?;
        let transport = self.transport()?;

        debug!(
            "[smtp] connecting to {} from={} to={}",
            self.config.relay_addr(),
            mail.envelope_from,
            mail.envelope_to.join(", ")
        );

        transport
            .send_raw(&envelope, &mail.body)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!("[smtp] relayed message to {}", mail.envelope_to.join(", "));
        Ok(())
    }
}
