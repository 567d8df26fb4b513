use domain::Store;
use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use web::AppState;
use ws::Manager;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting match feed [{} environment, max WebSocket payload {} bytes]",
        config.runtime_env(),
        config.ws_max_payload_bytes
    );

    let store = Arc::new(Store::new());
    let ws_manager = Arc::new(Manager::new());
    let app_state = AppState::new(config, store, ws_manager);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        std::process::exit(1);
    }
}
