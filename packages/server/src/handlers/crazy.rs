use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use scoring::{PredictionKind, VoteBook, ensure_can_vote};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{
    crazy_vote, race, race_prediction, race_result, season_prediction, season_result,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::crazy::*;
use crate::services::scoring::ScoringService;
use crate::state::AppState;
use crate::utils::lookup::find_season;

fn parse_target(target: &str) -> Result<PredictionKind, AppError> {
    target.parse().map_err(AppError::Validation)
}

fn crazy_not_found() -> AppError {
    AppError::NotFound("Crazy prediction not found".into())
}

fn crazy_text(crazy: Option<String>) -> Option<String> {
    crazy.filter(|text| !text.trim().is_empty())
}

/// Load a prediction that carries crazy text. Predictions without one are
/// invisible here.
async fn load_subject<C: ConnectionTrait>(
    conn: &C,
    kind: PredictionKind,
    prediction_id: i32,
) -> Result<CrazySubject, AppError> {
    match kind {
        PredictionKind::Season => {
            let model = season_prediction::Entity::find_by_id(prediction_id)
                .one(conn)
                .await?
                .ok_or_else(crazy_not_found)?;
            let text = crazy_text(model.crazy).ok_or_else(crazy_not_found)?;
            Ok(CrazySubject {
                kind,
                prediction_id,
                author_id: model.user_id,
                season: model.season,
                race_id: None,
                text,
                admin_override: model.crazy_override,
            })
        }
        PredictionKind::Race => {
            let model = race_prediction::Entity::find_by_id(prediction_id)
                .one(conn)
                .await?
                .ok_or_else(crazy_not_found)?;
            let text = crazy_text(model.crazy).ok_or_else(crazy_not_found)?;
            let race = race::Entity::find_by_id(model.race_id)
                .one(conn)
                .await?
                .ok_or_else(crazy_not_found)?;
            Ok(CrazySubject {
                kind,
                prediction_id,
                author_id: model.user_id,
                season: race.season,
                race_id: Some(race.id),
                text,
                admin_override: model.crazy_override,
            })
        }
    }
}

/// Whether the entered result marks the prediction as having happened.
async fn marked_happened<C: ConnectionTrait>(
    conn: &C,
    subject: &CrazySubject,
) -> Result<Option<bool>, AppError> {
    let marked = match subject.race_id {
        None => season_result::Entity::find_by_id(subject.season)
            .one(conn)
            .await?
            .map(|m| m.to_result())
            .transpose()?
            .map(|r| r.crazy_happened),
        Some(race_id) => race_result::Entity::find_by_id(race_id)
            .one(conn)
            .await?
            .map(|m| m.to_result())
            .transpose()?
            .map(|r| r.crazy_happened),
    };
    Ok(marked.map(|ids| ids.contains(&subject.prediction_id)))
}

async fn describe<C: ConnectionTrait>(
    conn: &C,
    subject: CrazySubject,
) -> Result<CrazyPredictionResponse, AppError> {
    let votes = ScoringService::new(conn)
        .votes(subject.kind, subject.prediction_id)
        .await?;
    let book = VoteBook::with_votes(subject.author_id, votes);
    let happened = marked_happened(conn, &subject).await?;
    Ok(CrazyPredictionResponse::new(subject, &book, happened))
}

#[utoipa::path(
    put,
    path = "/{target}/{prediction_id}/vote",
    tag = "Crazy Predictions",
    operation_id = "voteCrazyPrediction",
    summary = "Accept or reject someone else's crazy prediction",
    description = "Requires `crazy:vote` permission. Casting again replaces the caller's earlier vote. Voting on your own prediction is refused.",
    params(
        ("target" = PredictionKind, Path, description = "`season` or `race`"),
        ("prediction_id" = i32, Path, description = "Prediction ID"),
    ),
    request_body = CastVoteRequest,
    responses(
        (status = 200, description = "Updated validation status", body = CrazyPredictionResponse),
        (status = 400, description = "Unknown target (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, SELF_VALIDATION)", body = ErrorBody),
        (status = 404, description = "No such crazy prediction (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn cast_vote(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((target, prediction_id)): Path<(String, i32)>,
    AppJson(payload): AppJson<CastVoteRequest>,
) -> Result<Json<CrazyPredictionResponse>, AppError> {
    auth_user.require_permission("crazy:vote")?;
    let kind = parse_target(&target)?;
    let subject = load_subject(&state.db, kind, prediction_id).await?;
    ensure_can_vote(subject.author_id, auth_user.user_id)?;

    let now = Utc::now();
    let vote = crazy_vote::ActiveModel {
        validator_id: Set(auth_user.user_id),
        kind: Set(kind.as_str().to_string()),
        prediction_id: Set(prediction_id),
        accepted: Set(payload.accepted),
        created_at: Set(now),
        updated_at: Set(now),
    };
    crazy_vote::Entity::insert(vote)
        .on_conflict(
            OnConflict::columns([
                crazy_vote::Column::ValidatorId,
                crazy_vote::Column::Kind,
                crazy_vote::Column::PredictionId,
            ])
            .update_columns([crazy_vote::Column::Accepted, crazy_vote::Column::UpdatedAt])
            .to_owned(),
        )
        .exec(&state.db)
        .await?;
    info!(%kind, prediction_id, accepted = payload.accepted, "Crazy prediction vote cast");

    ScoringService::new(&state.db)
        .rescore_prediction(kind, prediction_id)
        .await?;

    Ok(Json(describe(&state.db, subject).await?))
}

#[utoipa::path(
    get,
    path = "/{target}/{prediction_id}",
    tag = "Crazy Predictions",
    operation_id = "getCrazyPrediction",
    summary = "Votes and resolved state of a crazy prediction",
    params(
        ("target" = PredictionKind, Path, description = "`season` or `race`"),
        ("prediction_id" = i32, Path, description = "Prediction ID"),
    ),
    responses(
        (status = 200, description = "Validation status", body = CrazyPredictionResponse),
        (status = 400, description = "Unknown target (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No such crazy prediction (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_crazy_prediction(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((target, prediction_id)): Path<(String, i32)>,
) -> Result<Json<CrazyPredictionResponse>, AppError> {
    let kind = parse_target(&target)?;
    let subject = load_subject(&state.db, kind, prediction_id).await?;
    Ok(Json(describe(&state.db, subject).await?))
}

#[utoipa::path(
    put,
    path = "/{target}/{prediction_id}/override",
    tag = "Crazy Predictions",
    operation_id = "overrideCrazyPrediction",
    summary = "Force or clear the verdict of a crazy prediction",
    description = "Requires `result:manage` permission. A forced verdict wins over the votes until it is cleared with `null`.",
    params(
        ("target" = PredictionKind, Path, description = "`season` or `race`"),
        ("prediction_id" = i32, Path, description = "Prediction ID"),
    ),
    request_body = CrazyOverrideRequest,
    responses(
        (status = 200, description = "Updated validation status", body = CrazyPredictionResponse),
        (status = 400, description = "Unknown target (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "No such crazy prediction (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn override_crazy_prediction(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((target, prediction_id)): Path<(String, i32)>,
    AppJson(payload): AppJson<CrazyOverrideRequest>,
) -> Result<Json<CrazyPredictionResponse>, AppError> {
    auth_user.require_permission("result:manage")?;
    let kind = parse_target(&target)?;
    let mut subject = load_subject(&state.db, kind, prediction_id).await?;

    let accepted = payload.accepted;
    match kind {
        PredictionKind::Season => {
            season_prediction::Entity::update_many()
                .col_expr(season_prediction::Column::CrazyOverride, Expr::value(accepted))
                .filter(season_prediction::Column::Id.eq(prediction_id))
                .exec(&state.db)
                .await?;
        }
        PredictionKind::Race => {
            race_prediction::Entity::update_many()
                .col_expr(race_prediction::Column::CrazyOverride, Expr::value(accepted))
                .filter(race_prediction::Column::Id.eq(prediction_id))
                .exec(&state.db)
                .await?;
        }
    }
    subject.admin_override = accepted;
    info!(%kind, prediction_id, ?accepted, "Crazy prediction override set");

    ScoringService::new(&state.db)
        .rescore_prediction(kind, prediction_id)
        .await?;

    Ok(Json(describe(&state.db, subject).await?))
}

#[utoipa::path(
    get,
    path = "/{year}/crazy",
    tag = "Crazy Predictions",
    operation_id = "listSeasonCrazyPredictions",
    summary = "All crazy predictions of a season",
    description = "Season-level and race-level crazy predictions with their votes, so players can find predictions to validate.",
    params(("year" = i32, Path, description = "Season year")),
    responses(
        (status = 200, description = "Crazy predictions", body = Vec<CrazyPredictionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Season not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_season_crazy_predictions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<Json<Vec<CrazyPredictionResponse>>, AppError> {
    find_season(&state.db, year).await?;

    let mut subjects = Vec::new();
    for model in season_prediction::Entity::find()
        .filter(season_prediction::Column::Season.eq(year))
        .filter(season_prediction::Column::Crazy.is_not_null())
        .order_by_asc(season_prediction::Column::Id)
        .all(&state.db)
        .await?
    {
        if let Some(text) = crazy_text(model.crazy) {
            subjects.push(CrazySubject {
                kind: PredictionKind::Season,
                prediction_id: model.id,
                author_id: model.user_id,
                season: year,
                race_id: None,
                text,
                admin_override: model.crazy_override,
            });
        }
    }

    let races = race::Entity::find()
        .filter(race::Column::Season.eq(year))
        .order_by_asc(race::Column::Round)
        .all(&state.db)
        .await?;
    for race in races {
        for model in race_prediction::Entity::find()
            .filter(race_prediction::Column::RaceId.eq(race.id))
            .filter(race_prediction::Column::Crazy.is_not_null())
            .order_by_asc(race_prediction::Column::Id)
            .all(&state.db)
            .await?
        {
            if let Some(text) = crazy_text(model.crazy) {
                subjects.push(CrazySubject {
                    kind: PredictionKind::Race,
                    prediction_id: model.id,
                    author_id: model.user_id,
                    season: year,
                    race_id: Some(race.id),
                    text,
                    admin_override: model.crazy_override,
                });
            }
        }
    }

    let mut items = Vec::with_capacity(subjects.len());
    for subject in subjects {
        items.push(describe(&state.db, subject).await?);
    }
    Ok(Json(items))
}
