use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{PredictionKind, SeasonYear, UserId};

/// A user belonging to the league being ranked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeagueMember {
    pub user_id: UserId,
    pub display_name: String,
}

/// The judged total of one stored prediction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredPrediction {
    pub user_id: UserId,
    pub season: SeasonYear,
    pub kind: PredictionKind,
    pub points: u32,
}

/// One row of a league leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    #[schema(example = 42)]
    pub user_id: UserId,
    #[schema(example = "alice_wonder")]
    pub display_name: String,
    #[schema(example = 4)]
    pub season_points: u32,
    #[schema(example = 5)]
    pub race_points: u32,
    #[schema(example = 9)]
    pub total: u32,
    /// Competition rank: tied totals share a rank and the next rank is skipped.
    #[schema(example = 1)]
    pub rank: u32,
}

/// Rank a league for one season.
///
/// Scores from other seasons or from non-members are ignored. Members with no
/// scored predictions appear with zero points. Rows are ordered by total,
/// then season points, then display name, then user id, so the output is
/// identical across recomputations.
pub fn compute_leaderboard(
    members: &[LeagueMember],
    season: SeasonYear,
    scored: &[ScoredPrediction],
) -> Vec<LeaderboardEntry> {
    let mut sums: HashMap<UserId, (u32, u32)> =
        members.iter().map(|m| (m.user_id, (0, 0))).collect();

    for score in scored.iter().filter(|s| s.season == season) {
        if let Some((season_points, race_points)) = sums.get_mut(&score.user_id) {
            match score.kind {
                PredictionKind::Season => *season_points += score.points,
                PredictionKind::Race => *race_points += score.points,
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = members
        .iter()
        .map(|m| {
            let (season_points, race_points) = sums.get(&m.user_id).copied().unwrap_or_default();
            LeaderboardEntry {
                user_id: m.user_id,
                display_name: m.display_name.clone(),
                season_points,
                race_points,
                total: season_points + race_points,
                rank: 0,
            }
        })
        .collect();
    // A member listed twice would otherwise be ranked twice.
    entries.sort_by_key(|e| e.user_id);
    entries.dedup_by_key(|e| e.user_id);

    entries.sort_by(leaderboard_order);

    let mut previous_total = None;
    let mut current_rank = 0;
    for (index, entry) in entries.iter_mut().enumerate() {
        if previous_total != Some(entry.total) {
            current_rank = index as u32 + 1;
            previous_total = Some(entry.total);
        }
        entry.rank = current_rank;
    }

    entries
}

fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.total
        .cmp(&a.total)
        .then_with(|| b.season_points.cmp(&a.season_points))
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.user_id.cmp(&b.user_id))
}
