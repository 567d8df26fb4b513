use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::extractors::{json_body::JsonBody, path_param::PathParam, query_params::QueryParams};
use crate::params::list::IndexParams;
use crate::{AppState, Error};
use domain::commentary_entry::{self as CommentaryApi, CreateParams};
use domain::listing::resolve_limit;
use domain::Id;
use log::*;

/// GET the newest commentary entries of a Match
#[utoipa::path(
    get,
    path = "/matches/{id}/commentary",
    params(
        ("id" = i64, Path, description = "Id of the Match"),
        IndexParams,
    ),
    responses(
        (status = 200, description = "Successfully retrieved commentary", body = [domain::commentary::Model]),
        (status = 400, description = "Invalid limit"),
        (status = 404, description = "Match not found"),
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    PathParam(match_id): PathParam<Id>,
    QueryParams(params): QueryParams<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Commentary for Match {match_id} with: {params:?}");

    let limit = resolve_limit(
        params.limit,
        app_state.config.default_list_limit,
        app_state.config.max_list_limit,
    )?;
    let entries = CommentaryApi::find_by_match(app_state.store_ref(), match_id, limit).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), entries)))
}

/// POST a commentary entry and push it to the Match's subscribers
#[utoipa::path(
    post,
    path = "/matches/{id}/commentary",
    params(
        ("id" = i64, Path, description = "Id of the Match"),
    ),
    request_body = domain::commentary_entry::CreateParams,
    responses(
        (status = 201, description = "Successfully posted commentary", body = domain::commentary::Model),
        (status = 404, description = "Match not found"),
        (status = 422, description = "Unprocessable Entity"),
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    PathParam(match_id): PathParam<Id>,
    JsonBody(params): JsonBody<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Commentary for Match {match_id} from: {params:?}");

    let created = CommentaryApi::create(
        app_state.store_ref(),
        &app_state.event_publisher,
        match_id,
        params,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), created)),
    ))
}
