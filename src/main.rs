extern crate news_api;

use news_api::config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[rocket::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,news_api=debug")),
        )
        .init();

    let config = Config::from_env().expect("Failed to read configuration");
    let store = config.open_store().expect("Failed to open store");
    info!(
        backend = ?config.backend,
        default_limit = config.default_limit,
        "starting news api"
    );

    if let Err(e) = news_api::rocket(config, store).launch().await {
        error!(error = %e, "server terminated");
    }
}
