use log::{debug, info, warn};
use std::env;
use std::time::Duration;

pub const CONTACT_EMAIL_VAR: &str = "MY_CONTACT_EMAIL";
pub const PORT_VAR: &str = "PORT";
pub const SMTP_PORT_VAR: &str = "SMTP_PORT";
pub const SMTP_HOSTNAME_VAR: &str = "SMTP_HOSTNAME";
pub const SMTP_LOGIN_VAR: &str = "DEFAULT_SMTP_LOGIN";
pub const SMTP_PASSWORD_VAR: &str = "DEFAULT_PASSWORD";
pub const NOREPLY_VAR: &str = "CAMAGRU_NOREPLY";
pub const SMTP_TIMEOUT_VAR: &str = "SMTP_TIMEOUT";

/// Process configuration, read once at startup and never mutated.
///
/// Unset variables are kept as empty strings. Nothing is validated here: a
/// missing SMTP host or credential surfaces as a send failure on the first
/// request that needs it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub contact_email: String,
    pub port: String,
    pub smtp_port: String,
    pub smtp_hostname: String,
    pub smtp_login: String,
    pub smtp_password: String,
    pub noreply: String,
    pub smtp_timeout: Option<Duration>,
}

impl Config {
    /// Seeds the environment from `.env` when present, then reads it.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => info!("[config] loaded environment from {}", path.display()),
            Err(e) => warn!("[config] .env not loaded: {}", e),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key).unwrap_or_else(|| {
                debug!("[config] {} not set, using empty value", key);
                String::new()
            })
        };

        let smtp_timeout = lookup(SMTP_TIMEOUT_VAR).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                warn!("[config] ignoring invalid {}={:?}", SMTP_TIMEOUT_VAR, raw);
                None
            }
        });

        Config {
            contact_email: var(CONTACT_EMAIL_VAR),
            port: var(PORT_VAR),
            smtp_port: var(SMTP_PORT_VAR),
            smtp_hostname: var(SMTP_HOSTNAME_VAR),
            smtp_login: var(SMTP_LOGIN_VAR),
            smtp_password: var(SMTP_PASSWORD_VAR),
            noreply: var(NOREPLY_VAR),
            smtp_timeout,
        }
    }

    /// Addresses the HTTP listener tries, in order: the dual-stack IPv6
    /// wildcard, then IPv4 only. An empty port asks the OS for one.
    pub fn listen_addrs(&self) -> [String; 2] {
        let port = self.port.trim();
        let port = if port.is_empty() { "0" } else { port };
        [format!("[::]:{}", port), format!("0.0.0.0:{}", port)]
    }

    pub fn relay_addr(&self) -> String {
        format!("{}:{}", self.smtp_hostname, self.smtp_port)
    }
}
