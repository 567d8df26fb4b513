use axum::http::{header, HeaderValue, Method};
use axum::Router;
use domain::Store;
use events::EventPublisher;
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use ws::{Manager, WsDomainEventHandler};

mod controller;
mod error;
mod extractors;
mod params;
mod router;
mod websocket;

pub use error::{Error, Result};

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub event_publisher: EventPublisher,
    pub ws_manager: Arc<Manager>,
}

impl AppState {
    /// Wires the store, the real-time manager and a publisher that forwards
    /// every domain event to connected WebSocket clients.
    pub fn new(config: Config, store: Arc<Store>, ws_manager: Arc<Manager>) -> Self {
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(WsDomainEventHandler::new(Arc::clone(&ws_manager))));

        Self {
            config,
            store,
            event_publisher,
            ws_manager,
        }
    }

    pub fn store_ref(&self) -> &Store {
        self.store.as_ref()
    }
}

/// Builds the full application router, including CORS.
pub fn app(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config);
    router::define_routes(app_state).layer(cors)
}

/// Serves the application on an already bound listener until the process exits.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    match listener.local_addr() {
        Ok(addr) => info!("Server starting... listening for connections on http://{addr}"),
        Err(e) => warn!("Server starting on a listener with unknown address: {e}"),
    }

    axum::serve(listener, app(app_state)).await
}

/// Binds the configured interface and port, then serves the application.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = app_state.config.listen_addr();
    let listener = TcpListener::bind(&listen_addr).await?;
    serve(listener, app_state).await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();
    debug!("CORS allowed origins: {origins:?}");

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(origins)
}
