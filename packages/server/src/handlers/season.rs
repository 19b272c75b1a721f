use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{race, season};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::season::*;
use crate::state::AppState;
use crate::utils::lookup::find_season;

#[utoipa::path(
    post,
    path = "/",
    tag = "Seasons",
    operation_id = "createSeason",
    summary = "Create a season",
    description = "Registers the entrant roster and the two new-team options for a season. Requires `season:manage` permission.",
    request_body = CreateSeasonRequest,
    responses(
        (status = 201, description = "Season created", body = SeasonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Season already exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(year = payload.year))]
pub async fn create_season(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSeasonRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("season:manage")?;
    let deadline = payload.prediction_deadline;
    let roster = payload.into_roster()?;

    let new_season = season::ActiveModel {
        year: Set(roster.season),
        drivers: Set(serde_json::to_value(&roster.drivers)?),
        constructors: Set(serde_json::to_value(&roster.constructors)?),
        new_teams: Set(serde_json::to_value(&roster.new_teams)?),
        prediction_deadline: Set(deadline),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_season.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("Season {} already exists", roster.season))
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(SeasonResponse::from_model(model)?)))
}

#[utoipa::path(
    get,
    path = "/{year}",
    tag = "Seasons",
    operation_id = "getSeason",
    summary = "Get a season by year",
    params(("year" = i32, Path, description = "Season year")),
    responses(
        (status = 200, description = "Season details", body = SeasonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Season not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_season(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<SeasonResponse>, AppError> {
    let model = find_season(&state.db, year).await?;
    Ok(Json(SeasonResponse::from_model(model)?))
}

#[utoipa::path(
    post,
    path = "/{year}/races",
    tag = "Seasons",
    operation_id = "createRace",
    summary = "Add a race to a season",
    description = "Requires `season:manage` permission. Rounds are unique within a season.",
    params(("year" = i32, Path, description = "Season year")),
    request_body = CreateRaceRequest,
    responses(
        (status = 201, description = "Race created", body = RaceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Season not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Round already scheduled (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(round = payload.round))]
pub async fn create_race(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
    AppJson(payload): AppJson<CreateRaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("season:manage")?;
    payload.validate()?;
    find_season(&state.db, year).await?;

    let new_race = race::ActiveModel {
        season: Set(year),
        round: Set(payload.round),
        name: Set(payload.name.trim().to_string()),
        has_sprint: Set(payload.has_sprint),
        prediction_deadline: Set(payload.prediction_deadline),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_race.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(format!(
            "Round {} of {year} is already scheduled",
            payload.round
        )),
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(RaceResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{year}/races",
    tag = "Seasons",
    operation_id = "listRaces",
    summary = "List a season's races in calendar order",
    params(("year" = i32, Path, description = "Season year")),
    responses(
        (status = 200, description = "Races", body = Vec<RaceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Season not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_races(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<Vec<RaceResponse>>, AppError> {
    find_season(&state.db, year).await?;
    let races = race::Entity::find()
        .filter(race::Column::Season.eq(year))
        .order_by_asc(race::Column::Round)
        .all(&state.db)
        .await?;
    Ok(Json(races.into_iter().map(RaceResponse::from).collect()))
}
