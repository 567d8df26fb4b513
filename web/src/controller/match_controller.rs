use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::extractors::{json_body::JsonBody, path_param::PathParam, query_params::QueryParams};
use crate::params::list::IndexParams;
use crate::{AppState, Error};
use domain::listing::resolve_limit;
use domain::sports_match::{self as MatchApi, CreateParams, UpdateScoreParams};
use domain::Id;
use log::*;

/// GET the most recently created matches, newest first
#[utoipa::path(
    get,
    path = "/matches",
    params(IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved matches", body = [domain::matches::Model]),
        (status = 400, description = "Invalid limit"),
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    QueryParams(params): QueryParams<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Matches with: {params:?}");

    let limit = resolve_limit(
        params.limit,
        app_state.config.default_list_limit,
        app_state.config.max_list_limit,
    )?;
    let matches = MatchApi::find_latest(app_state.store_ref(), limit).await?;

    debug!("Found {} Matches", matches.len());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), matches)))
}

/// POST create a new Match and announce it to every connected client
#[utoipa::path(
    post,
    path = "/matches",
    request_body = domain::sports_match::CreateParams,
    responses(
        (status = 201, description = "Successfully created a new Match", body = domain::matches::Model),
        (status = 422, description = "Unprocessable Entity"),
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    JsonBody(params): JsonBody<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Match from: {params:?}");

    let created =
        MatchApi::create(app_state.store_ref(), &app_state.event_publisher, params).await?;

    info!("Created Match {} ({} vs {})", created.id, created.home_team, created.away_team);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), created)),
    ))
}

/// PATCH overwrite the score of a Match
#[utoipa::path(
    patch,
    path = "/matches/{id}/score",
    params(
        ("id" = i64, Path, description = "Id of the Match to update"),
    ),
    request_body = domain::sports_match::UpdateScoreParams,
    responses(
        (status = 200, description = "Successfully updated the score", body = domain::matches::Model),
        (status = 404, description = "Match not found"),
        (status = 422, description = "Unprocessable Entity"),
    )
)]
pub async fn update_score(
    State(app_state): State<AppState>,
    PathParam(id): PathParam<Id>,
    JsonBody(params): JsonBody<UpdateScoreParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH score of Match {id} with: {params:?}");

    let updated = MatchApi::update_score(app_state.store_ref(), id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), updated)))
}
