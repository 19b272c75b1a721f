use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{league, league_member, race, race_prediction, season, season_prediction};
use crate::error::AppError;

/// Look up a season by year, returning 404 if not found.
pub async fn find_season<C: ConnectionTrait>(db: &C, year: i32) -> Result<season::Model, AppError> {
    season::Entity::find_by_id(year)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Season {year} not found")))
}

/// Look up a race by ID, returning 404 if not found.
pub async fn find_race<C: ConnectionTrait>(db: &C, id: i32) -> Result<race::Model, AppError> {
    race::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Race not found".into()))
}

/// Look up a league by ID, returning 404 if not found.
pub async fn find_league<C: ConnectionTrait>(db: &C, id: i32) -> Result<league::Model, AppError> {
    league::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("League not found".into()))
}

/// The caller's season prediction, locked for update inside a transaction.
pub async fn find_own_season_prediction_for_update<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    season: i32,
) -> Result<Option<season_prediction::Model>, AppError> {
    Ok(season_prediction::Entity::find()
        .filter(season_prediction::Column::UserId.eq(user_id))
        .filter(season_prediction::Column::Season.eq(season))
        .lock_exclusive()
        .one(db)
        .await?)
}

pub async fn find_own_season_prediction<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    season: i32,
) -> Result<season_prediction::Model, AppError> {
    season_prediction::Entity::find()
        .filter(season_prediction::Column::UserId.eq(user_id))
        .filter(season_prediction::Column::Season.eq(season))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No season prediction submitted".into()))
}

pub async fn find_own_race_prediction_for_update<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    race_id: i32,
) -> Result<Option<race_prediction::Model>, AppError> {
    Ok(race_prediction::Entity::find()
        .filter(race_prediction::Column::UserId.eq(user_id))
        .filter(race_prediction::Column::RaceId.eq(race_id))
        .lock_exclusive()
        .one(db)
        .await?)
}

pub async fn find_own_race_prediction<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    race_id: i32,
) -> Result<race_prediction::Model, AppError> {
    race_prediction::Entity::find()
        .filter(race_prediction::Column::UserId.eq(user_id))
        .filter(race_prediction::Column::RaceId.eq(race_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No race prediction submitted".into()))
}

pub async fn is_league_member<C: ConnectionTrait>(
    db: &C,
    league_id: i32,
    user_id: i32,
) -> Result<bool, AppError> {
    Ok(league_member::Entity::find_by_id((league_id, user_id))
        .one(db)
        .await?
        .is_some())
}

/// Predictions become read-only once their deadline has passed.
pub fn require_before_deadline(
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if now >= deadline {
        return Err(AppError::Validation(format!(
            "The prediction deadline ({}) has passed",
            deadline.to_rfc3339()
        )));
    }
    Ok(())
}
