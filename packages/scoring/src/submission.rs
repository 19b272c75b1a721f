//! Submission-time checks for predictions and results.
//!
//! These run when a record is written, never at scoring time. Messages are
//! prefixed with the offending field name.

use std::collections::HashSet;

use crate::error::{Result, ScoringError};
use crate::model::{
    ConstructorId, DriverId, FirstWinPick, GridPairing, RacePrediction, RaceResult,
    SeasonPrediction, SeasonResult, SeasonYear,
};

pub const MAX_CRAZY_LEN: usize = 500;

/// The entrants of a season, used to check orderings and picks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeasonRoster {
    pub season: SeasonYear,
    pub drivers: Vec<DriverId>,
    pub constructors: Vec<ConstructorId>,
    /// The two new entrants the new-team question chooses between.
    pub new_teams: [ConstructorId; 2],
}

impl SeasonRoster {
    /// Check the roster itself: non-empty, no duplicates, distinct new teams.
    pub fn validate(&self) -> Result<()> {
        if self.drivers.is_empty() {
            return Err(invalid("drivers", "must not be empty"));
        }
        if self.constructors.is_empty() {
            return Err(invalid("constructors", "must not be empty"));
        }
        ensure_unique("drivers", &self.drivers)?;
        ensure_unique("constructors", &self.constructors)?;
        if self.new_teams.iter().any(|t| t.trim().is_empty()) {
            return Err(invalid("new_teams", "identifiers must not be blank"));
        }
        if self.new_teams[0] == self.new_teams[1] {
            return Err(invalid("new_teams", "the two options must differ"));
        }
        Ok(())
    }

    fn has_driver(&self, driver: &str) -> bool {
        self.drivers.iter().any(|d| d == driver)
    }

    fn has_constructor(&self, constructor: &str) -> bool {
        self.constructors.iter().any(|c| c == constructor)
    }
}

pub fn validate_season_prediction(
    prediction: &SeasonPrediction,
    roster: &SeasonRoster,
) -> Result<()> {
    ensure_season(prediction.season, roster)?;
    if !prediction.drivers_order.is_empty() {
        ensure_permutation("drivers_order", &prediction.drivers_order, &roster.drivers)?;
    }
    if !prediction.constructors_order.is_empty() {
        ensure_permutation(
            "constructors_order",
            &prediction.constructors_order,
            &roster.constructors,
        )?;
    }
    if let Some(sackings) = &prediction.sackings
        && sackings.iter().any(|s| s.trim().is_empty())
    {
        return Err(invalid("sackings", "identifiers must not be blank"));
    }
    if let Some(pick) = &prediction.new_team_pick
        && !roster.new_teams.contains(pick)
    {
        return Err(invalid(
            "new_team_pick",
            &format!("must be one of {} or {}", roster.new_teams[0], roster.new_teams[1]),
        ));
    }
    if let Some(FirstWinPick::Drivers(drivers)) = &prediction.first_winners {
        if drivers.is_empty() {
            return Err(invalid(
                "first_winners",
                "pick at least one driver or choose no new winners",
            ));
        }
        if let Some(unknown) = drivers.iter().find(|d| !roster.has_driver(d)) {
            return Err(invalid("first_winners", &format!("unknown driver {unknown}")));
        }
    }
    validate_grid("grid_next", &prediction.grid_next, roster)?;
    validate_grid("grid_following", &prediction.grid_following, roster)?;
    validate_crazy_text(prediction.crazy.as_deref())?;
    Ok(())
}

pub fn validate_season_result(result: &SeasonResult, roster: &SeasonRoster) -> Result<()> {
    ensure_season(result.season, roster)?;
    ensure_permutation("drivers_order", &result.drivers_order, &roster.drivers)?;
    ensure_permutation("constructors_order", &result.constructors_order, &roster.constructors)?;
    if result.sackings.iter().any(|s| s.trim().is_empty()) {
        return Err(invalid("sackings", "identifiers must not be blank"));
    }
    if let Some(winner) = &result.new_team_winner
        && !roster.new_teams.contains(winner)
    {
        return Err(invalid(
            "new_team_winner",
            &format!("must be one of {} or {}", roster.new_teams[0], roster.new_teams[1]),
        ));
    }
    if let Some(unknown) = result.first_winners.iter().find(|d| !roster.has_driver(d)) {
        return Err(invalid("first_winners", &format!("unknown driver {unknown}")));
    }
    Ok(())
}

/// Podium picks must be pairwise distinct and sprint picks need a sprint weekend.
pub fn validate_race_prediction(prediction: &RacePrediction, has_sprint: bool) -> Result<()> {
    let podium: Vec<&DriverId> = prediction.podium().into_iter().flatten().collect();
    ensure_distinct_podium(&podium)?;
    if prediction.sprint.is_some() && !has_sprint {
        return Err(invalid("sprint", "this race has no sprint"));
    }
    validate_crazy_text(prediction.crazy.as_deref())?;
    Ok(())
}

pub fn validate_race_result(result: &RaceResult, has_sprint: bool) -> Result<()> {
    let podium = result.podium();
    if podium.iter().any(|d| d.trim().is_empty()) {
        return Err(invalid("podium", "all three positions are required"));
    }
    ensure_distinct_podium(&podium)?;
    if result.pole.trim().is_empty() {
        return Err(invalid("pole", "is required"));
    }
    if result.midfield_hero.trim().is_empty() {
        return Err(invalid("midfield_hero", "is required"));
    }
    // A sprint weekend without a sprint outcome means the sprint was dropped.
    if result.sprint.is_some() && !has_sprint {
        return Err(invalid("sprint", "this race has no sprint"));
    }
    Ok(())
}

/// Trim crazy prediction text; blank text means no crazy prediction.
pub fn normalize_crazy_text(text: Option<String>) -> Result<Option<String>> {
    let trimmed = text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    validate_crazy_text(trimmed.as_deref())?;
    Ok(trimmed)
}

fn validate_crazy_text(text: Option<&str>) -> Result<()> {
    if let Some(text) = text
        && text.chars().count() > MAX_CRAZY_LEN
    {
        return Err(invalid(
            "crazy",
            &format!("must be at most {MAX_CRAZY_LEN} characters"),
        ));
    }
    Ok(())
}

fn ensure_season(season: SeasonYear, roster: &SeasonRoster) -> Result<()> {
    if season != roster.season {
        return Err(invalid(
            "season",
            &format!("expected {} but got {season}", roster.season),
        ));
    }
    Ok(())
}

fn ensure_distinct_podium(podium: &[&DriverId]) -> Result<()> {
    let mut seen = HashSet::new();
    for driver in podium {
        if !seen.insert(*driver) {
            return Err(invalid(
                "podium",
                &format!("driver {driver} is picked for more than one position"),
            ));
        }
    }
    Ok(())
}

fn ensure_unique(field: &str, items: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item) {
            return Err(invalid(field, &format!("duplicate entry {item}")));
        }
    }
    Ok(())
}

fn ensure_permutation(field: &str, order: &[String], roster: &[String]) -> Result<()> {
    if order.len() != roster.len() {
        return Err(invalid(
            field,
            &format!("must list all {} entrants, got {}", roster.len(), order.len()),
        ));
    }
    ensure_unique(field, order)?;
    if let Some(unknown) = order.iter().find(|id| !roster.contains(*id)) {
        return Err(invalid(field, &format!("unknown entrant {unknown}")));
    }
    Ok(())
}

fn validate_grid(field: &str, grid: &[GridPairing], roster: &SeasonRoster) -> Result<()> {
    let mut drivers = HashSet::new();
    for pairing in grid {
        if pairing.driver.trim().is_empty() {
            return Err(invalid(field, "driver must not be blank"));
        }
        if !drivers.insert(&pairing.driver) {
            return Err(invalid(
                field,
                &format!("driver {} is seated twice", pairing.driver),
            ));
        }
        if !roster.has_constructor(&pairing.constructor) {
            return Err(invalid(
                field,
                &format!("unknown constructor {}", pairing.constructor),
            ));
        }
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> ScoringError {
    ScoringError::Validation(format!("{field}: {message}"))
}
