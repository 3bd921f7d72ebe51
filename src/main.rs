mod config;
mod mail;
mod smtp;
mod web;

use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = Arc::new(config::Config::load());

    info!(
        "[main] mailbridge starting, port={:?}, relay={}",
        config.port,
        config.relay_addr()
    );

    let mailer = Arc::new(smtp::SmtpRelay::new(config.clone()));
    let state = web::AppState::new(config, mailer);

    web::start_server(state).await;
}
