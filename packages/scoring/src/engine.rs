use std::collections::BTreeSet;

use crate::category::{RaceCategory, RaceScore, ScoreCard, SeasonCategory, SeasonScore};
use crate::error::{Result, ScoringError};
use crate::model::{
    FirstWinPick, PredictionId, RacePrediction, RaceResult, SeasonPrediction, SeasonResult,
    has_crazy_text,
};
use crate::validation::CrazyVerdict;

/// How a predicted sacking set is matched against the actual sackings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SackingPolicy {
    /// At least one predicted target was actually sacked.
    AnyOverlap,
    /// The predicted set equals the actual set.
    ExactSet,
}

/// The sacking category is a flat single point, so one correct name earns it.
pub const SACKING_POLICY: SackingPolicy = SackingPolicy::AnyOverlap;

/// Score a season prediction against the season's result.
///
/// Fails with `NotFound` when no result has been entered yet and with
/// `Validation` when the result belongs to a different season.
pub fn score_season_prediction(
    prediction: &SeasonPrediction,
    result: Option<&SeasonResult>,
    crazy: CrazyVerdict,
) -> Result<SeasonScore> {
    let result = result.ok_or_else(|| {
        ScoringError::NotFound(format!("No result entered for season {}", prediction.season))
    })?;
    if result.season != prediction.season {
        return Err(ScoringError::Validation(format!(
            "Prediction is for season {} but result is for season {}",
            prediction.season, result.season
        )));
    }

    Ok(ScoreCard::evaluate(|category| match category {
        SeasonCategory::DriversChampionship => {
            order_matches(&prediction.drivers_order, &result.drivers_order)
        }
        SeasonCategory::ConstructorsChampionship => {
            order_matches(&prediction.constructors_order, &result.constructors_order)
        }
        SeasonCategory::Sackings => prediction
            .sackings
            .as_ref()
            .map_or(0, |predicted| sackings_award(predicted, &result.sackings, SACKING_POLICY)),
        SeasonCategory::NewTeam => match (&prediction.new_team_pick, &result.new_team_winner) {
            (Some(pick), Some(winner)) if pick == winner => 1,
            _ => 0,
        },
        SeasonCategory::FirstWinners => prediction
            .first_winners
            .as_ref()
            .map_or(0, |pick| first_winners_award(pick, &result.first_winners)),
        SeasonCategory::FutureGrid => 0,
        SeasonCategory::Crazy => crazy_award(
            prediction.id,
            &prediction.crazy,
            crazy,
            &result.crazy_happened,
        ),
    }))
}

/// Score a race prediction against the race's result.
///
/// Sprint categories only score when the result records a sprint.
pub fn score_race_prediction(
    prediction: &RacePrediction,
    result: Option<&RaceResult>,
    crazy: CrazyVerdict,
) -> Result<RaceScore> {
    let result = result.ok_or_else(|| {
        ScoringError::NotFound(format!("No result entered for race {}", prediction.race_id))
    })?;
    if result.race_id != prediction.race_id {
        return Err(ScoringError::Validation(format!(
            "Prediction is for race {} but result is for race {}",
            prediction.race_id, result.race_id
        )));
    }

    let sprint_pick = prediction.sprint.as_ref();
    let sprint_result = result.sprint.as_ref();

    Ok(ScoreCard::evaluate(|category| match category {
        RaceCategory::Pole => exact(prediction.pole.as_ref(), &result.pole),
        RaceCategory::Podium => prediction
            .podium()
            .into_iter()
            .zip(result.podium())
            .map(|(predicted, actual)| exact(predicted, actual))
            .sum(),
        RaceCategory::MidfieldHero => {
            exact(prediction.midfield_hero.as_ref(), &result.midfield_hero)
        }
        RaceCategory::SprintPole => match (sprint_pick, sprint_result) {
            (Some(pick), Some(outcome)) => exact(pick.pole.as_ref(), &outcome.pole),
            _ => 0,
        },
        RaceCategory::SprintWinner => match (sprint_pick, sprint_result) {
            (Some(pick), Some(outcome)) => exact(pick.winner.as_ref(), &outcome.winner),
            _ => 0,
        },
        RaceCategory::SprintMidfieldHero => match (sprint_pick, sprint_result) {
            (Some(pick), Some(outcome)) => {
                exact(pick.midfield_hero.as_ref(), &outcome.midfield_hero)
            }
            _ => 0,
        },
        RaceCategory::Crazy => crazy_award(
            prediction.id,
            &prediction.crazy,
            crazy,
            &result.crazy_happened,
        ),
    }))
}

/// One point per index where both lists hold the same identifier.
fn order_matches(predicted: &[String], actual: &[String]) -> u32 {
    predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| p == a)
        .count() as u32
}

fn exact(predicted: Option<&String>, actual: &String) -> u32 {
    u32::from(predicted == Some(actual))
}

pub fn sackings_award(
    predicted: &BTreeSet<String>,
    actual: &BTreeSet<String>,
    policy: SackingPolicy,
) -> u32 {
    if predicted.is_empty() {
        return 0;
    }
    let hit = match policy {
        SackingPolicy::AnyOverlap => !predicted.is_disjoint(actual),
        SackingPolicy::ExactSet => predicted == actual,
    };
    u32::from(hit)
}

fn first_winners_award(pick: &FirstWinPick, actual: &BTreeSet<String>) -> u32 {
    match pick {
        FirstWinPick::Drivers(drivers) => drivers.intersection(actual).count() as u32,
        FirstWinPick::NoNewWinners => u32::from(actual.is_empty()),
    }
}

fn crazy_award(
    prediction_id: PredictionId,
    text: &Option<String>,
    verdict: CrazyVerdict,
    happened: &BTreeSet<PredictionId>,
) -> u32 {
    u32::from(has_crazy_text(text) && verdict.is_accepted() && happened.contains(&prediction_id))
}
