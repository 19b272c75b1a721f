use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use scoring::submission::{validate_race_result, validate_season_result};
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{race_prediction, race_result, season_prediction, season_result};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::result::*;
use crate::services::scoring::{RecalculationReport, ScoringService};
use crate::state::AppState;
use crate::utils::lookup::{find_race, find_season};

/// Every id marked as happened must name a submitted prediction with crazy text.
fn check_crazy_ids(
    marked: &BTreeSet<i32>,
    eligible: &[(i32, Option<String>)],
) -> Result<(), AppError> {
    let known: BTreeSet<i32> = eligible
        .iter()
        .filter(|(_, crazy)| crazy.as_deref().is_some_and(|t| !t.trim().is_empty()))
        .map(|(id, _)| *id)
        .collect();
    match marked.difference(&known).next() {
        Some(id) => Err(AppError::Validation(format!(
            "crazy_happened: {id} is not a crazy prediction for this event"
        ))),
        None => Ok(()),
    }
}

/// Run the rescore that follows a committed result. The result stays stored
/// when this fails; the next recalculation repairs the points.
async fn rescore_committed(
    rescore: impl Future<Output = Result<RecalculationReport, AppError>>,
) -> Option<RecalculationReport> {
    match rescore.await {
        Ok(report) => Some(report),
        Err(e) => {
            warn!(error = %e, "Rescore after result change failed");
            None
        }
    }
}

#[utoipa::path(
    put,
    path = "/{year}/result",
    tag = "Results",
    operation_id = "upsertSeasonResult",
    summary = "Enter or correct the season result",
    description = "Requires `result:manage` permission. Every season prediction is rescored after the result is stored.",
    params(("year" = i32, Path, description = "Season year")),
    request_body = SeasonResultRequest,
    responses(
        (status = 200, description = "Stored result", body = SeasonResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Season not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn upsert_season_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
    AppJson(payload): AppJson<SeasonResultRequest>,
) -> Result<Json<SeasonResultResponse>, AppError> {
    auth_user.require_permission("result:manage")?;
    let season = find_season(&state.db, year).await?;
    let result = payload.into_result(year)?;
    validate_season_result(&result, &season.roster()?)?;

    let eligible: Vec<(i32, Option<String>)> = season_prediction::Entity::find()
        .select_only()
        .column(season_prediction::Column::Id)
        .column(season_prediction::Column::Crazy)
        .filter(season_prediction::Column::Season.eq(year))
        .into_tuple()
        .all(&state.db)
        .await?;
    check_crazy_ids(&result.crazy_happened, &eligible)?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let existing = season_result::Entity::find_by_id(year)
        .lock_exclusive()
        .one(&txn)
        .await?;
    let is_new = existing.is_none();
    let mut active: season_result::ActiveModel = match existing {
        Some(model) => model.into(),
        None => season_result::ActiveModel {
            season: Set(year),
            created_at: Set(now),
            ..Default::default()
        },
    };
    active.drivers_order = Set(serde_json::to_value(&result.drivers_order)?);
    active.constructors_order = Set(serde_json::to_value(&result.constructors_order)?);
    active.sackings = Set(serde_json::to_value(&result.sackings)?);
    active.new_team_winner = Set(result.new_team_winner.clone());
    active.first_winners = Set(serde_json::to_value(&result.first_winners)?);
    active.crazy_happened = Set(serde_json::to_value(&result.crazy_happened)?);
    active.entered_by = Set(auth_user.user_id);
    active.updated_at = Set(now);
    let model = if is_new {
        active.insert(&txn).await?
    } else {
        active.update(&txn).await?
    };
    txn.commit().await?;

    info!(season = year, "Season result stored");
    let concurrency = state.config.scoring.recalc_concurrency;
    let service = ScoringService::new(&state.db);
    rescore_committed(service.rescore_season(year, concurrency)).await;

    Ok(Json(SeasonResultResponse::from_model(model)?))
}

#[utoipa::path(
    get,
    path = "/{year}/result",
    tag = "Results",
    operation_id = "getSeasonResult",
    summary = "Get the season result",
    params(("year" = i32, Path, description = "Season year")),
    responses(
        (status = 200, description = "Season result", body = SeasonResultResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not entered yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_season_result(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<SeasonResultResponse>, AppError> {
    let model = season_result::Entity::find_by_id(year)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No result entered for season {year}")))?;
    Ok(Json(SeasonResultResponse::from_model(model)?))
}

#[utoipa::path(
    put,
    path = "/{id}/result",
    tag = "Results",
    operation_id = "upsertRaceResult",
    summary = "Enter or correct a race result",
    description = "Requires `result:manage` permission. Sprint outcomes are rejected unless the race is a sprint weekend; omit them when the sprint was dropped. Every prediction for the race is rescored after the result is stored.",
    params(("id" = i32, Path, description = "Race ID")),
    request_body = RaceResultRequest,
    responses(
        (status = 200, description = "Stored result", body = RaceResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Race not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn upsert_race_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RaceResultRequest>,
) -> Result<Json<RaceResultResponse>, AppError> {
    auth_user.require_permission("result:manage")?;
    let race = find_race(&state.db, id).await?;
    let result = payload.into_result(id);
    validate_race_result(&result, race.has_sprint)?;

    let eligible: Vec<(i32, Option<String>)> = race_prediction::Entity::find()
        .select_only()
        .column(race_prediction::Column::Id)
        .column(race_prediction::Column::Crazy)
        .filter(race_prediction::Column::RaceId.eq(id))
        .into_tuple()
        .all(&state.db)
        .await?;
    check_crazy_ids(&result.crazy_happened, &eligible)?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let existing = race_result::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?;
    let is_new = existing.is_none();
    let mut active: race_result::ActiveModel = match existing {
        Some(model) => model.into(),
        None => race_result::ActiveModel {
            race_id: Set(id),
            created_at: Set(now),
            ..Default::default()
        },
    };
    let sprint = result.sprint.clone();
    active.pole = Set(result.pole.clone());
    active.first = Set(result.first.clone());
    active.second = Set(result.second.clone());
    active.third = Set(result.third.clone());
    active.midfield_hero = Set(result.midfield_hero.clone());
    active.sprint_pole = Set(sprint.as_ref().map(|s| s.pole.clone()));
    active.sprint_winner = Set(sprint.as_ref().map(|s| s.winner.clone()));
    active.sprint_midfield_hero = Set(sprint.map(|s| s.midfield_hero));
    active.crazy_happened = Set(serde_json::to_value(&result.crazy_happened)?);
    active.entered_by = Set(auth_user.user_id);
    active.updated_at = Set(now);
    let model = if is_new {
        active.insert(&txn).await?
    } else {
        active.update(&txn).await?
    };
    txn.commit().await?;

    info!(race_id = id, "Race result stored");
    let concurrency = state.config.scoring.recalc_concurrency;
    let service = ScoringService::new(&state.db);
    rescore_committed(service.rescore_race(id, concurrency)).await;

    Ok(Json(RaceResultResponse::from_model(model)?))
}

#[utoipa::path(
    get,
    path = "/{id}/result",
    tag = "Results",
    operation_id = "getRaceResult",
    summary = "Get a race result",
    params(("id" = i32, Path, description = "Race ID")),
    responses(
        (status = 200, description = "Race result", body = RaceResultResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not entered yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_race_result(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RaceResultResponse>, AppError> {
    let model = race_result::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No result entered for this race".into()))?;
    Ok(Json(RaceResultResponse::from_model(model)?))
}
