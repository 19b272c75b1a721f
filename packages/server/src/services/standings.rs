use std::collections::HashMap;

use scoring::{
    LeaderboardEntry, LeagueMember, PredictionKind, ScoredPrediction, compute_leaderboard,
};
use sea_orm::*;
use tracing::warn;

use super::scoring::{ScoringService, score_race_model, score_season_model};
use crate::entity::{
    league_member, race, race_prediction, race_result, season_prediction, season_result, user,
};
use crate::error::AppError;

/// Members of a league with their usernames as display names.
pub async fn league_members<C: ConnectionTrait>(
    conn: &C,
    league_id: i32,
) -> Result<Vec<(LeagueMember, league_member::Model)>, DbErr> {
    let memberships = league_member::Entity::find()
        .filter(league_member::Column::LeagueId.eq(league_id))
        .order_by_asc(league_member::Column::JoinedAt)
        .all(conn)
        .await?;
    let user_ids: Vec<i32> = memberships.iter().map(|m| m.user_id).collect();
    let names: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    Ok(memberships
        .into_iter()
        .filter_map(|m| {
            names.get(&m.user_id).map(|name| {
                (
                    LeagueMember {
                        user_id: m.user_id,
                        display_name: name.clone(),
                    },
                    m,
                )
            })
        })
        .collect())
}

/// Rank a league for one season by scoring every member's predictions live.
///
/// Predictions whose result is not entered yet contribute nothing. Rows that
/// cannot be decoded are logged and skipped.
pub async fn league_leaderboard<C: ConnectionTrait>(
    conn: &C,
    league_id: i32,
    season: i32,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let members: Vec<LeagueMember> = league_members(conn, league_id)
        .await?
        .into_iter()
        .map(|(member, _)| member)
        .collect();
    let member_ids: Vec<i32> = members.iter().map(|m| m.user_id).collect();
    if member_ids.is_empty() {
        return Ok(Vec::new());
    }

    let service = ScoringService::new(conn);
    let mut scored = Vec::new();

    let stored_result = season_result::Entity::find_by_id(season).one(conn).await?;
    let result = match stored_result.map(|m| m.to_result()).transpose() {
        Ok(result) => result,
        Err(e) => {
            warn!(season, error = %e, "Skipping unreadable season result");
            None
        }
    };
    if let Some(result) = result {
        let predictions = season_prediction::Entity::find()
            .filter(season_prediction::Column::Season.eq(season))
            .filter(season_prediction::Column::UserId.is_in(member_ids.clone()))
            .all(conn)
            .await?;
        let ids: Vec<i32> = predictions.iter().map(|p| p.id).collect();
        let votes = service.votes_for(PredictionKind::Season, &ids).await?;
        for prediction in &predictions {
            let votes = votes.get(&prediction.id).map(Vec::as_slice).unwrap_or(&[]);
            match score_season_model(prediction, Some(&result), votes) {
                Ok(score) => scored.push(ScoredPrediction {
                    user_id: prediction.user_id,
                    season,
                    kind: PredictionKind::Season,
                    points: score.total,
                }),
                Err(e) => warn!(
                    prediction_id = prediction.id,
                    error = %e,
                    "Skipping unreadable season prediction"
                ),
            }
        }
    }

    let race_ids: Vec<i32> = race::Entity::find()
        .select_only()
        .column(race::Column::Id)
        .filter(race::Column::Season.eq(season))
        .into_tuple()
        .all(conn)
        .await?;
    if !race_ids.is_empty() {
        let mut results = HashMap::new();
        for model in race_result::Entity::find()
            .filter(race_result::Column::RaceId.is_in(race_ids))
            .all(conn)
            .await?
        {
            match model.to_result() {
                Ok(result) => {
                    results.insert(model.race_id, result);
                }
                Err(e) => {
                    warn!(race_id = model.race_id, error = %e, "Skipping unreadable race result")
                }
            }
        }

        let judged: Vec<i32> = results.keys().copied().collect();
        let predictions = race_prediction::Entity::find()
            .filter(race_prediction::Column::RaceId.is_in(judged))
            .filter(race_prediction::Column::UserId.is_in(member_ids))
            .all(conn)
            .await?;
        let ids: Vec<i32> = predictions.iter().map(|p| p.id).collect();
        let votes = service.votes_for(PredictionKind::Race, &ids).await?;
        for prediction in &predictions {
            let votes = votes.get(&prediction.id).map(Vec::as_slice).unwrap_or(&[]);
            match score_race_model(prediction, results.get(&prediction.race_id), votes) {
                Ok(score) => scored.push(ScoredPrediction {
                    user_id: prediction.user_id,
                    season,
                    kind: PredictionKind::Race,
                    points: score.total,
                }),
                Err(e) => warn!(
                    prediction_id = prediction.id,
                    error = %e,
                    "Skipping unreadable race prediction"
                ),
            }
        }
    }

    Ok(compute_leaderboard(&members, season, &scored))
}
