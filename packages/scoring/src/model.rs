use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type UserId = i32;
pub type PredictionId = i32;
pub type RaceId = i32;
/// Seasons are identified by their calendar year.
pub type SeasonYear = i32;
/// Opaque driver identifier, e.g. `"VER"`.
pub type DriverId = String;
/// Opaque constructor identifier, e.g. `"ferrari"`.
pub type ConstructorId = String;

/// A predicted driver-to-constructor seat for a future grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GridPairing {
    #[schema(example = "HAM")]
    pub driver: DriverId,
    #[schema(example = "ferrari")]
    pub constructor: ConstructorId,
}

/// First-career-win pick: either a set of drivers or the "no new winners" sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "kind", content = "drivers", rename_all = "snake_case")]
pub enum FirstWinPick {
    Drivers(BTreeSet<DriverId>),
    NoNewWinners,
}

/// A user's once-per-season prediction.
///
/// Empty ordering lists and `None` fields mean the user never answered that
/// question; they score zero and never fail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonPrediction {
    pub id: PredictionId,
    pub user_id: UserId,
    pub season: SeasonYear,
    pub drivers_order: Vec<DriverId>,
    pub constructors_order: Vec<ConstructorId>,
    /// `Some(empty)` is an explicit "no sackings" answer.
    pub sackings: Option<BTreeSet<String>>,
    pub new_team_pick: Option<ConstructorId>,
    pub crazy: Option<String>,
    pub first_winners: Option<FirstWinPick>,
    pub grid_next: Vec<GridPairing>,
    pub grid_following: Vec<GridPairing>,
}

/// Authoritative season outcome entered by an admin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonResult {
    pub season: SeasonYear,
    pub drivers_order: Vec<DriverId>,
    pub constructors_order: Vec<ConstructorId>,
    pub sackings: BTreeSet<String>,
    pub new_team_winner: Option<ConstructorId>,
    /// Empty when nobody took a first career win.
    pub first_winners: BTreeSet<DriverId>,
    /// Season prediction ids whose crazy prediction actually happened.
    pub crazy_happened: BTreeSet<PredictionId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SprintPick {
    pub pole: Option<DriverId>,
    pub winner: Option<DriverId>,
    pub midfield_hero: Option<DriverId>,
}

/// A user's prediction for a single race weekend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacePrediction {
    pub id: PredictionId,
    pub user_id: UserId,
    pub race_id: RaceId,
    pub pole: Option<DriverId>,
    pub first: Option<DriverId>,
    pub second: Option<DriverId>,
    pub third: Option<DriverId>,
    pub midfield_hero: Option<DriverId>,
    pub sprint: Option<SprintPick>,
    pub crazy: Option<String>,
}

impl RacePrediction {
    /// Podium picks in finishing order.
    pub fn podium(&self) -> [Option<&DriverId>; 3] {
        [self.first.as_ref(), self.second.as_ref(), self.third.as_ref()]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SprintOutcome {
    pub pole: DriverId,
    pub winner: DriverId,
    pub midfield_hero: DriverId,
}

/// Authoritative race outcome entered by an admin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: RaceId,
    pub pole: DriverId,
    pub first: DriverId,
    pub second: DriverId,
    pub third: DriverId,
    pub midfield_hero: DriverId,
    /// `None` when the weekend had no sprint.
    pub sprint: Option<SprintOutcome>,
    /// Race prediction ids whose crazy prediction actually happened.
    pub crazy_happened: BTreeSet<PredictionId>,
}

impl RaceResult {
    pub fn podium(&self) -> [&DriverId; 3] {
        [&self.first, &self.second, &self.third]
    }
}

/// Season-level or race-level prediction. Also names where a crazy
/// prediction and its votes live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    Season,
    Race,
}

impl PredictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Season => "season",
            Self::Race => "race",
        }
    }
}

impl fmt::Display for PredictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "season" => Ok(Self::Season),
            "race" => Ok(Self::Race),
            other => Err(format!("unknown prediction kind: {other}")),
        }
    }
}

/// Whether a prediction's crazy text counts as present.
pub(crate) fn has_crazy_text(crazy: &Option<String>) -> bool {
    crazy.as_deref().is_some_and(|text| !text.trim().is_empty())
}
