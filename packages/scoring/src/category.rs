use serde::{Deserialize, Serialize};

/// A closed set of scoring categories for one prediction type.
pub trait Category: Copy + Eq + 'static {
    /// Every category, in the order awards are reported.
    const ALL: &'static [Self];
}

/// Scoring categories of a season prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeasonCategory {
    DriversChampionship,
    ConstructorsChampionship,
    Sackings,
    NewTeam,
    FirstWinners,
    /// Display-only; never awards points.
    FutureGrid,
    Crazy,
}

impl Category for SeasonCategory {
    const ALL: &'static [Self] = &[
        Self::DriversChampionship,
        Self::ConstructorsChampionship,
        Self::Sackings,
        Self::NewTeam,
        Self::FirstWinners,
        Self::FutureGrid,
        Self::Crazy,
    ];
}

/// Scoring categories of a race prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RaceCategory {
    Pole,
    Podium,
    MidfieldHero,
    SprintPole,
    SprintWinner,
    SprintMidfieldHero,
    Crazy,
}

impl RaceCategory {
    pub fn is_sprint(&self) -> bool {
        matches!(
            self,
            Self::SprintPole | Self::SprintWinner | Self::SprintMidfieldHero
        )
    }
}

impl Category for RaceCategory {
    const ALL: &'static [Self] = &[
        Self::Pole,
        Self::Podium,
        Self::MidfieldHero,
        Self::SprintPole,
        Self::SprintWinner,
        Self::SprintMidfieldHero,
        Self::Crazy,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAward<C> {
    pub category: C,
    pub points: u32,
}

/// Per-category awards for one prediction plus their sum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard<C> {
    pub awards: Vec<CategoryAward<C>>,
    pub total: u32,
}

impl<C: Category> ScoreCard<C> {
    /// Build a card by evaluating `award` once for every category.
    pub fn evaluate(mut award: impl FnMut(C) -> u32) -> Self {
        let awards: Vec<CategoryAward<C>> = C::ALL
            .iter()
            .map(|&category| CategoryAward {
                category,
                points: award(category),
            })
            .collect();
        let total = awards.iter().map(|a| a.points).sum();
        Self { awards, total }
    }

    /// Points awarded for a single category.
    pub fn points(&self, category: C) -> u32 {
        self.awards
            .iter()
            .find(|a| a.category == category)
            .map(|a| a.points)
            .unwrap_or(0)
    }
}

pub type SeasonScore = ScoreCard<SeasonCategory>;
pub type RaceScore = ScoreCard<RaceCategory>;
