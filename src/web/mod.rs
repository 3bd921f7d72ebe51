mod errors;
mod routes;

use std::sync::Arc;

use axum::Router;
use log::{error, info, warn};

use crate::config::Config;
use crate::smtp::Mailer;

// ── Shared State ──

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Arc<Config>, mailer: Arc<dyn Mailer>) -> Self {
        Self { config, mailer }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::public_routes())
        .merge(routes::mail_routes())
        .fallback(errors::handle_not_found)
        .with_state(state)
}

// ── Server ──

pub async fn start_server(state: AppState) {
    let addrs = state.config.listen_addrs();

    info!("[web] initializing mail relay server on {}", addrs.join(" or "));

    let app = router(state);

    let listener = match bind_first(&addrs).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("[web] failed to bind {}: {}", addrs.join(" or "), e);
            std::process::exit(1);
        }
    };
    match listener.local_addr() {
        Ok(local) => info!("[web] mail relay listening on {}", local),
        Err(_) => info!("[web] mail relay listening"),
    }

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("[web] server error: {}", e);
        std::process::exit(1);
    }
    info!("[web] server stopped");
}

/// Binds the first address that works; the error returned is the last one.
async fn bind_first(addrs: &[String]) -> std::io::Result<tokio::net::TcpListener> {
    let mut last_err = None;
    for addr in addrs {
        match tokio::net::TcpListener::bind(addr.as_str()).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                warn!("[web] could not bind {}: {}", addr, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "no listen address")
    }))
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("[web] failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("[web] failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("[web] shutdown signal received");
}
