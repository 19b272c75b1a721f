use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{league, league_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::league::*;
use crate::services::standings::{league_leaderboard, league_members};
use crate::state::AppState;
use crate::utils::lookup::{find_league, find_season, is_league_member};

async fn member_list<C: ConnectionTrait>(
    conn: &C,
    league_id: i32,
) -> Result<Vec<LeagueMemberResponse>, AppError> {
    Ok(league_members(conn, league_id)
        .await?
        .into_iter()
        .map(|(member, row)| LeagueMemberResponse {
            user_id: member.user_id,
            username: member.display_name,
            joined_at: row.joined_at,
        })
        .collect())
}

/// Non-members without `league:manage` cannot tell a private league from a
/// missing one.
async fn require_visible<C: ConnectionTrait>(
    conn: &C,
    auth_user: &AuthUser,
    league_id: i32,
) -> Result<league::Model, AppError> {
    let model = find_league(conn, league_id).await?;
    if !auth_user.has_permission("league:manage")
        && !is_league_member(conn, league_id, auth_user.user_id).await?
    {
        return Err(AppError::NotFound("League not found".into()));
    }
    Ok(model)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Leagues",
    operation_id = "createLeague",
    summary = "Create a league",
    description = "Requires `league:create` permission. The creator becomes the first member.",
    request_body = CreateLeagueRequest,
    responses(
        (status = 201, description = "League created", body = LeagueResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_league(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateLeagueRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("league:create")?;
    payload.validate()?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let model = league::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    league_member::ActiveModel {
        league_id: Set(model.id),
        user_id: Set(auth_user.user_id),
        joined_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(league_id = model.id, "League created");
    let members = member_list(&state.db, model.id).await?;
    Ok((StatusCode::CREATED, Json(LeagueResponse::new(model, members))))
}

#[utoipa::path(
    post,
    path = "/{id}/join",
    tag = "Leagues",
    operation_id = "joinLeague",
    summary = "Join a league",
    description = "Joining a league you already belong to is a no-op.",
    params(("id" = i32, Path, description = "League ID")),
    responses(
        (status = 200, description = "League with its members", body = LeagueResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "League not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn join_league(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LeagueResponse>, AppError> {
    let model = find_league(&state.db, id).await?;

    let membership = league_member::ActiveModel {
        league_id: Set(id),
        user_id: Set(auth_user.user_id),
        joined_at: Set(Utc::now()),
    };
    let result = league_member::Entity::insert(membership)
        .on_conflict(
            OnConflict::columns([league_member::Column::LeagueId, league_member::Column::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await;
    match result {
        Ok(_) => info!(league_id = id, "Joined league"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    let members = member_list(&state.db, id).await?;
    Ok(Json(LeagueResponse::new(model, members)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Leagues",
    operation_id = "getLeague",
    summary = "Get a league and its members",
    description = "Visible to members and to holders of `league:manage`.",
    params(("id" = i32, Path, description = "League ID")),
    responses(
        (status = 200, description = "League with its members", body = LeagueResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "League not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_league(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LeagueResponse>, AppError> {
    let model = require_visible(&state.db, &auth_user, id).await?;
    let members = member_list(&state.db, id).await?;
    Ok(Json(LeagueResponse::new(model, members)))
}

#[utoipa::path(
    get,
    path = "/{id}/leaderboard",
    tag = "Leagues",
    operation_id = "getLeaderboard",
    summary = "Season leaderboard of a league",
    description = "Ranks members by season plus race points, computed from the current results and votes. Tied totals share a rank. Visible to members and to holders of `league:manage`.",
    params(
        ("id" = i32, Path, description = "League ID"),
        LeaderboardQuery,
    ),
    responses(
        (status = 200, description = "Leaderboard", body = LeaderboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "League or season not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_leaderboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    require_visible(&state.db, &auth_user, id).await?;
    find_season(&state.db, query.season).await?;

    let entries = league_leaderboard(&state.db, id, query.season).await?;
    Ok(Json(LeaderboardResponse {
        league_id: id,
        season: query.season,
        entries,
    }))
}
