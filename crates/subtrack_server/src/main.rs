//! Subscription Service Binary

use std::sync::Arc;

use log::{info, warn};
use subtrack_core::{default_log_level, init_logging, Store};
use subtrack_server::config::load_dotenv;
use subtrack_server::{serve, AppState, Config, StartupError};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let dotenv_loaded = load_dotenv();
    let config = Config::from_env()?;

    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, config.log_dir.as_deref()).map_err(StartupError::Logging)?;

    if !dotenv_loaded {
        info!("event=config_load module=server status=ok source=environment dotenv=missing");
    }
    info!(
        "event=config_load module=server status=ok port={} db={}",
        config.app_port,
        config.redacted_dsn()
    );

    let state = Arc::new(AppState::new(Store::open(&config.db_dsn)?));

    let result = serve(&config.bind_addr(), state.clone(), shutdown_signal()).await;
    state.store.close();
    result
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=server_shutdown module=server status=start"),
        Err(err) => {
            // Without a signal handler the server runs until killed.
            warn!("event=server_shutdown module=server status=error error={err}");
            std::future::pending::<()>().await;
        }
    }
}
