use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use scoring::submission::{validate_race_prediction, validate_season_prediction};
use scoring::{PredictionKind, RacePrediction, SeasonPrediction};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{crazy_vote, race_prediction, race_result, season_prediction, season_result};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::prediction::*;
use crate::models::score::{RaceScoreResponse, SeasonScoreResponse};
use crate::services::scoring::ScoringService;
use crate::state::AppState;
use crate::utils::lookup::{
    find_own_race_prediction, find_own_race_prediction_for_update, find_own_season_prediction,
    find_own_season_prediction_for_update, find_race, find_season, require_before_deadline,
};

fn unique_violation(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Prediction was submitted concurrently; retry".into())
        }
        _ => AppError::from(e),
    }
}

fn set_season_fields(
    active: &mut season_prediction::ActiveModel,
    prediction: &SeasonPrediction,
) -> Result<(), AppError> {
    active.drivers_order = Set(serde_json::to_value(&prediction.drivers_order)?);
    active.constructors_order = Set(serde_json::to_value(&prediction.constructors_order)?);
    active.sackings = Set(prediction
        .sackings
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?);
    active.new_team_pick = Set(prediction.new_team_pick.clone());
    active.first_winners = Set(prediction
        .first_winners
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?);
    active.grid_next = Set(serde_json::to_value(&prediction.grid_next)?);
    active.grid_following = Set(serde_json::to_value(&prediction.grid_following)?);
    active.crazy = Set(prediction.crazy.clone());
    Ok(())
}

fn set_race_fields(active: &mut race_prediction::ActiveModel, prediction: &RacePrediction) {
    let sprint = prediction.sprint.clone().unwrap_or_default();
    active.pole = Set(prediction.pole.clone());
    active.first = Set(prediction.first.clone());
    active.second = Set(prediction.second.clone());
    active.third = Set(prediction.third.clone());
    active.midfield_hero = Set(prediction.midfield_hero.clone());
    active.sprint_pole = Set(sprint.pole);
    active.sprint_winner = Set(sprint.winner);
    active.sprint_midfield_hero = Set(sprint.midfield_hero);
    active.crazy = Set(prediction.crazy.clone());
}

/// Votes judged the old text; a rewritten crazy prediction starts unvalidated.
async fn reset_crazy_validation<C: ConnectionTrait>(
    conn: &C,
    kind: PredictionKind,
    prediction_id: i32,
) -> Result<(), DbErr> {
    crazy_vote::Entity::delete_many()
        .filter(crazy_vote::Column::Kind.eq(kind.as_str()))
        .filter(crazy_vote::Column::PredictionId.eq(prediction_id))
        .exec(conn)
        .await?;
    Ok(())
}

#[utoipa::path(
    put,
    path = "/{year}/prediction",
    tag = "Predictions",
    operation_id = "upsertSeasonPrediction",
    summary = "Submit or replace the caller's season prediction",
    description = "Requires `prediction:submit` permission. Only accepted before the season's prediction deadline and before the season result is entered. Changing the crazy prediction text clears its votes and any admin override.",
    params(("year" = i32, Path, description = "Season year")),
    request_body = UpsertSeasonPredictionRequest,
    responses(
        (status = 200, description = "Stored prediction", body = SeasonPredictionResponse),
        (status = 400, description = "Validation error or deadline passed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Season not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn upsert_season_prediction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
    AppJson(payload): AppJson<UpsertSeasonPredictionRequest>,
) -> Result<Json<SeasonPredictionResponse>, AppError> {
    auth_user.require_permission("prediction:submit")?;
    let season = find_season(&state.db, year).await?;
    require_before_deadline(season.prediction_deadline, Utc::now())?;

    if season_result::Entity::find_by_id(year).one(&state.db).await?.is_some() {
        return Err(AppError::Validation(format!(
            "The result for season {year} has already been entered"
        )));
    }

    let prediction = payload.into_prediction(auth_user.user_id, year)?;
    validate_season_prediction(&prediction, &season.roster()?)?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let model = match find_own_season_prediction_for_update(&txn, auth_user.user_id, year).await? {
        Some(existing) => {
            let crazy_changed = existing.crazy != prediction.crazy;
            let id = existing.id;
            let mut active: season_prediction::ActiveModel = existing.into();
            set_season_fields(&mut active, &prediction)?;
            if crazy_changed {
                active.crazy_override = Set(None);
                reset_crazy_validation(&txn, PredictionKind::Season, id).await?;
            }
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            let mut active = season_prediction::ActiveModel {
                user_id: Set(auth_user.user_id),
                season: Set(year),
                crazy_override: Set(None),
                points: Set(None),
                scored_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            set_season_fields(&mut active, &prediction)?;
            active.insert(&txn).await.map_err(unique_violation)?
        }
    };
    txn.commit().await?;

    Ok(Json(SeasonPredictionResponse::from_model(model)?))
}

#[utoipa::path(
    get,
    path = "/{year}/prediction",
    tag = "Predictions",
    operation_id = "getSeasonPrediction",
    summary = "Get the caller's season prediction",
    params(("year" = i32, Path, description = "Season year")),
    responses(
        (status = 200, description = "Stored prediction", body = SeasonPredictionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Nothing submitted (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_season_prediction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<SeasonPredictionResponse>, AppError> {
    let model = find_own_season_prediction(&state.db, auth_user.user_id, year).await?;
    Ok(Json(SeasonPredictionResponse::from_model(model)?))
}

#[utoipa::path(
    get,
    path = "/{year}/prediction/score",
    tag = "Predictions",
    operation_id = "scoreSeasonPrediction",
    summary = "Per-category score of the caller's season prediction",
    description = "Scores the stored prediction against the entered season result using the current crazy-prediction verdict.",
    params(("year" = i32, Path, description = "Season year")),
    responses(
        (status = 200, description = "Score breakdown", body = SeasonScoreResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No prediction or no result yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn score_season_prediction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<SeasonScoreResponse>, AppError> {
    let model = find_own_season_prediction(&state.db, auth_user.user_id, year).await?;
    let score = ScoringService::new(&state.db).score_season(&model).await?;
    Ok(Json(SeasonScoreResponse::new(model.id, model.season, score)))
}

#[utoipa::path(
    put,
    path = "/{id}/prediction",
    tag = "Predictions",
    operation_id = "upsertRacePrediction",
    summary = "Submit or replace the caller's race prediction",
    description = "Requires `prediction:submit` permission. Only accepted before the race's prediction deadline and before its result is entered. Sprint picks are rejected for races without a sprint.",
    params(("id" = i32, Path, description = "Race ID")),
    request_body = UpsertRacePredictionRequest,
    responses(
        (status = 200, description = "Stored prediction", body = RacePredictionResponse),
        (status = 400, description = "Validation error or deadline passed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Race not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn upsert_race_prediction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpsertRacePredictionRequest>,
) -> Result<Json<RacePredictionResponse>, AppError> {
    auth_user.require_permission("prediction:submit")?;
    let race = find_race(&state.db, id).await?;
    require_before_deadline(race.prediction_deadline, Utc::now())?;

    if race_result::Entity::find_by_id(id).one(&state.db).await?.is_some() {
        return Err(AppError::Validation(
            "The result for this race has already been entered".into(),
        ));
    }

    let prediction = payload.into_prediction(auth_user.user_id, id)?;
    validate_race_prediction(&prediction, race.has_sprint)?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let model = match find_own_race_prediction_for_update(&txn, auth_user.user_id, id).await? {
        Some(existing) => {
            let crazy_changed = existing.crazy != prediction.crazy;
            let prediction_id = existing.id;
            let mut active: race_prediction::ActiveModel = existing.into();
            set_race_fields(&mut active, &prediction);
            if crazy_changed {
                active.crazy_override = Set(None);
                reset_crazy_validation(&txn, PredictionKind::Race, prediction_id).await?;
            }
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            let mut active = race_prediction::ActiveModel {
                user_id: Set(auth_user.user_id),
                race_id: Set(id),
                crazy_override: Set(None),
                points: Set(None),
                scored_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            set_race_fields(&mut active, &prediction);
            active.insert(&txn).await.map_err(unique_violation)?
        }
    };
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/prediction",
    tag = "Predictions",
    operation_id = "getRacePrediction",
    summary = "Get the caller's prediction for a race",
    params(("id" = i32, Path, description = "Race ID")),
    responses(
        (status = 200, description = "Stored prediction", body = RacePredictionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Nothing submitted (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_race_prediction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RacePredictionResponse>, AppError> {
    let model = find_own_race_prediction(&state.db, auth_user.user_id, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/prediction/score",
    tag = "Predictions",
    operation_id = "scoreRacePrediction",
    summary = "Per-category score of the caller's race prediction",
    params(("id" = i32, Path, description = "Race ID")),
    responses(
        (status = 200, description = "Score breakdown", body = RaceScoreResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No prediction or no result yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn score_race_prediction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RaceScoreResponse>, AppError> {
    let model = find_own_race_prediction(&state.db, auth_user.user_id, id).await?;
    let score = ScoringService::new(&state.db).score_race(&model).await?;
    Ok(Json(RaceScoreResponse::new(model.id, model.race_id, score)))
}
