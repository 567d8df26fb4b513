use crate::controller::{commentary_controller, health_check_controller, match_controller};
use crate::{websocket, AppState};
use axum::{
    routing::{get, patch},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// Global OpenAPI document. A path or schema only shows up in the rendered
// docs if it is listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Match Feed API"
        ),
        paths(
            health_check_controller::health_check,
            match_controller::index,
            match_controller::create,
            match_controller::update_score,
            commentary_controller::index,
            commentary_controller::create,
        ),
        components(
            schemas(
                domain::matches::Model,
                domain::commentary::Model,
                domain::match_status::MatchStatus,
                domain::sports_match::CreateParams,
                domain::sports_match::UpdateScoreParams,
                domain::commentary_entry::CreateParams,
            )
        ),
        tags(
            (name = "match_feed", description = "Live match scores and commentary")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(match_routes(app_state.clone()))
        .merge(commentary_routes(app_state.clone()))
        .merge(ws_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn match_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/matches",
            get(match_controller::index).post(match_controller::create),
        )
        .route("/matches/:id/score", patch(match_controller::update_score))
        .with_state(app_state)
}

fn commentary_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/matches/:id/commentary",
            get(commentary_controller::index).post(commentary_controller::create),
        )
        .with_state(app_state)
}

fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket::handler::ws_handler))
        .with_state(app_state)
}
