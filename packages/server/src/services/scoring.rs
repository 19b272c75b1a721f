use std::collections::HashMap;

use chrono::Utc;
use futures::{StreamExt, stream};
use scoring::{
    PredictionKind, RaceResult, RaceScore, SeasonResult, SeasonScore, Vote,
    resolve_crazy_prediction_state, score_race_prediction, score_season_prediction,
};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::{crazy_vote, race_prediction, race_result, season_prediction, season_result};
use crate::error::AppError;

/// A prediction that could not be rescored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescoreFailure {
    pub kind: PredictionKind,
    pub prediction_id: i32,
    pub error: String,
}

/// Summary of a rescoring batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecalculationReport {
    pub rescored: u64,
    /// Predictions whose result is not entered yet. Their stored points are cleared.
    pub deferred: u64,
    pub failures: Vec<RescoreFailure>,
}

impl RecalculationReport {
    fn merge(&mut self, other: RecalculationReport) {
        self.rescored += other.rescored;
        self.deferred += other.deferred;
        self.failures.extend(other.failures);
    }
}

/// Votes grouped by prediction id.
pub type VoteIndex = HashMap<i32, Vec<Vote>>;

/// Decoded results keyed by season year or race id. A result whose stored
/// JSON cannot be decoded maps to the decode error.
type ResultIndex<R> = HashMap<i32, Result<R, String>>;

enum Outcome {
    Scored(u32),
    Deferred,
    Failed(String),
}

struct Job {
    kind: PredictionKind,
    prediction_id: i32,
    outcome: Outcome,
}

/// Score a stored season prediction against an optional result.
pub fn score_season_model(
    model: &season_prediction::Model,
    result: Option<&SeasonResult>,
    votes: &[Vote],
) -> Result<SeasonScore, AppError> {
    let prediction = model.to_prediction()?;
    let verdict = resolve_crazy_prediction_state(votes, model.crazy_override);
    Ok(score_season_prediction(&prediction, result, verdict)?)
}

/// Score a stored race prediction against an optional result.
pub fn score_race_model(
    model: &race_prediction::Model,
    result: Option<&RaceResult>,
    votes: &[Vote],
) -> Result<RaceScore, AppError> {
    let prediction = model.to_prediction();
    let verdict = resolve_crazy_prediction_state(votes, model.crazy_override);
    Ok(score_race_prediction(&prediction, result, verdict)?)
}

fn votes_of<'v>(votes: &'v VoteIndex, prediction_id: i32) -> &'v [Vote] {
    votes.get(&prediction_id).map(Vec::as_slice).unwrap_or(&[])
}

fn season_results_index(models: Vec<season_result::Model>) -> ResultIndex<SeasonResult> {
    models
        .into_iter()
        .map(|m| (m.season, m.to_result().map_err(|e| e.to_string())))
        .collect()
}

fn race_results_index(models: Vec<race_result::Model>) -> ResultIndex<RaceResult> {
    models
        .into_iter()
        .map(|m| (m.race_id, m.to_result().map_err(|e| e.to_string())))
        .collect()
}

fn season_jobs(
    models: &[season_prediction::Model],
    results: &ResultIndex<SeasonResult>,
    votes: &VoteIndex,
) -> Vec<Job> {
    models
        .iter()
        .map(|model| {
            let outcome = match results.get(&model.season) {
                None => Outcome::Deferred,
                Some(Err(e)) => Outcome::Failed(format!("Stored season result is unreadable: {e}")),
                Some(Ok(result)) => {
                    match score_season_model(model, Some(result), votes_of(votes, model.id)) {
                        Ok(score) => Outcome::Scored(score.total),
                        Err(e) => Outcome::Failed(e.to_string()),
                    }
                }
            };
            Job {
                kind: PredictionKind::Season,
                prediction_id: model.id,
                outcome,
            }
        })
        .collect()
}

fn race_jobs(
    models: &[race_prediction::Model],
    results: &ResultIndex<RaceResult>,
    votes: &VoteIndex,
) -> Vec<Job> {
    models
        .iter()
        .map(|model| {
            let outcome = match results.get(&model.race_id) {
                None => Outcome::Deferred,
                Some(Err(e)) => Outcome::Failed(format!("Stored race result is unreadable: {e}")),
                Some(Ok(result)) => {
                    match score_race_model(model, Some(result), votes_of(votes, model.id)) {
                        Ok(score) => Outcome::Scored(score.total),
                        Err(e) => Outcome::Failed(e.to_string()),
                    }
                }
            };
            Job {
                kind: PredictionKind::Race,
                prediction_id: model.id,
                outcome,
            }
        })
        .collect()
}

/// Loads predictions, results and votes, runs the scoring engine and stores
/// the totals back on the prediction rows.
pub struct ScoringService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ScoringService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// All votes on one crazy prediction.
    pub async fn votes(
        &self,
        kind: PredictionKind,
        prediction_id: i32,
    ) -> Result<Vec<Vote>, DbErr> {
        let rows = crazy_vote::Entity::find()
            .filter(crazy_vote::Column::Kind.eq(kind.as_str()))
            .filter(crazy_vote::Column::PredictionId.eq(prediction_id))
            .order_by_asc(crazy_vote::Column::ValidatorId)
            .all(self.conn)
            .await?;
        Ok(rows.iter().map(crazy_vote::Model::to_vote).collect())
    }

    /// Votes on many predictions of one kind, grouped by prediction id.
    pub async fn votes_for(
        &self,
        kind: PredictionKind,
        prediction_ids: &[i32],
    ) -> Result<VoteIndex, DbErr> {
        if prediction_ids.is_empty() {
            return Ok(VoteIndex::new());
        }
        let rows = crazy_vote::Entity::find()
            .filter(crazy_vote::Column::Kind.eq(kind.as_str()))
            .filter(crazy_vote::Column::PredictionId.is_in(prediction_ids.iter().copied()))
            .all(self.conn)
            .await?;
        Ok(group_votes(rows))
    }

    async fn all_votes(&self, kind: PredictionKind) -> Result<VoteIndex, DbErr> {
        let rows = crazy_vote::Entity::find()
            .filter(crazy_vote::Column::Kind.eq(kind.as_str()))
            .all(self.conn)
            .await?;
        Ok(group_votes(rows))
    }

    pub async fn season_result(&self, season: i32) -> Result<Option<SeasonResult>, AppError> {
        let model = season_result::Entity::find_by_id(season).one(self.conn).await?;
        Ok(model.map(|m| m.to_result()).transpose()?)
    }

    pub async fn race_result(&self, race_id: i32) -> Result<Option<RaceResult>, AppError> {
        let model = race_result::Entity::find_by_id(race_id).one(self.conn).await?;
        Ok(model.map(|m| m.to_result()).transpose()?)
    }

    /// Live breakdown for one season prediction. `NotFound` until the result exists.
    pub async fn score_season(
        &self,
        model: &season_prediction::Model,
    ) -> Result<SeasonScore, AppError> {
        let result = self.season_result(model.season).await?;
        let votes = self.votes(PredictionKind::Season, model.id).await?;
        score_season_model(model, result.as_ref(), &votes)
    }

    /// Live breakdown for one race prediction. `NotFound` until the result exists.
    pub async fn score_race(&self, model: &race_prediction::Model) -> Result<RaceScore, AppError> {
        let result = self.race_result(model.race_id).await?;
        let votes = self.votes(PredictionKind::Race, model.id).await?;
        score_race_model(model, result.as_ref(), &votes)
    }

    /// Rescore a single prediction, e.g. after a vote or override changed its verdict.
    pub async fn rescore_prediction(
        &self,
        kind: PredictionKind,
        prediction_id: i32,
    ) -> Result<RecalculationReport, AppError> {
        let jobs = match kind {
            PredictionKind::Season => {
                let model = season_prediction::Entity::find_by_id(prediction_id)
                    .one(self.conn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Season prediction not found".into()))?;
                let results = season_results_index(
                    season_result::Entity::find_by_id(model.season)
                        .all(self.conn)
                        .await?,
                );
                let votes = self.votes_for(kind, &[prediction_id]).await?;
                season_jobs(&[model], &results, &votes)
            }
            PredictionKind::Race => {
                let model = race_prediction::Entity::find_by_id(prediction_id)
                    .one(self.conn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Race prediction not found".into()))?;
                let results = race_results_index(
                    race_result::Entity::find_by_id(model.race_id)
                        .all(self.conn)
                        .await?,
                );
                let votes = self.votes_for(kind, &[prediction_id]).await?;
                race_jobs(&[model], &results, &votes)
            }
        };
        Ok(self.apply(jobs, 1).await)
    }

    /// Rescore every season prediction of one season.
    pub async fn rescore_season(
        &self,
        season: i32,
        concurrency: usize,
    ) -> Result<RecalculationReport, AppError> {
        let models = season_prediction::Entity::find()
            .filter(season_prediction::Column::Season.eq(season))
            .all(self.conn)
            .await?;
        let results = season_results_index(
            season_result::Entity::find_by_id(season)
                .all(self.conn)
                .await?,
        );
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let votes = self.votes_for(PredictionKind::Season, &ids).await?;

        let report = self
            .apply(season_jobs(&models, &results, &votes), concurrency)
            .await;
        info!(
            season,
            rescored = report.rescored,
            deferred = report.deferred,
            failed = report.failures.len(),
            "Season predictions rescored"
        );
        Ok(report)
    }

    /// Rescore every prediction for one race.
    pub async fn rescore_race(
        &self,
        race_id: i32,
        concurrency: usize,
    ) -> Result<RecalculationReport, AppError> {
        let models = race_prediction::Entity::find()
            .filter(race_prediction::Column::RaceId.eq(race_id))
            .all(self.conn)
            .await?;
        let results = race_results_index(
            race_result::Entity::find_by_id(race_id)
                .all(self.conn)
                .await?,
        );
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let votes = self.votes_for(PredictionKind::Race, &ids).await?;

        let report = self
            .apply(race_jobs(&models, &results, &votes), concurrency)
            .await;
        info!(
            race_id,
            rescored = report.rescored,
            deferred = report.deferred,
            failed = report.failures.len(),
            "Race predictions rescored"
        );
        Ok(report)
    }

    /// Recompute every stored prediction from scratch.
    ///
    /// Idempotent: running it twice with unchanged inputs stores the same
    /// points. Predictions without a result are reported as deferred and have
    /// their points cleared. A failing prediction also loses its points and is
    /// recorded in the report while the batch carries on.
    pub async fn recalculate_all(
        &self,
        concurrency: usize,
    ) -> Result<RecalculationReport, AppError> {
        let mut report = RecalculationReport::default();

        let season_models = season_prediction::Entity::find()
            .order_by_asc(season_prediction::Column::Id)
            .all(self.conn)
            .await?;
        let season_results =
            season_results_index(season_result::Entity::find().all(self.conn).await?);
        let season_votes = self.all_votes(PredictionKind::Season).await?;
        report.merge(
            self.apply(
                season_jobs(&season_models, &season_results, &season_votes),
                concurrency,
            )
            .await,
        );

        let race_models = race_prediction::Entity::find()
            .order_by_asc(race_prediction::Column::Id)
            .all(self.conn)
            .await?;
        let race_results = race_results_index(race_result::Entity::find().all(self.conn).await?);
        let race_votes = self.all_votes(PredictionKind::Race).await?;
        report.merge(
            self.apply(race_jobs(&race_models, &race_results, &race_votes), concurrency)
                .await,
        );

        info!(
            rescored = report.rescored,
            deferred = report.deferred,
            failed = report.failures.len(),
            "Full recalculation finished"
        );
        Ok(report)
    }

    /// Store the outcome of each job, at most `concurrency` writes in flight.
    /// Deferred and failed predictions have their points cleared.
    async fn apply(&self, jobs: Vec<Job>, concurrency: usize) -> RecalculationReport {
        let mut report = RecalculationReport::default();

        let writes = stream::iter(jobs)
            .map(|job| async move {
                let points = match job.outcome {
                    Outcome::Scored(points) => Some(points),
                    Outcome::Deferred | Outcome::Failed(_) => None,
                };
                let stored = self.store_points(job.kind, job.prediction_id, points).await;
                let outcome = match (job.outcome, stored) {
                    (Outcome::Failed(error), _) => Err(error),
                    (_, Err(e)) => Err(e.to_string()),
                    (Outcome::Scored(_), Ok(())) => Ok(true),
                    (Outcome::Deferred, Ok(())) => Ok(false),
                };
                (job.kind, job.prediction_id, outcome)
            })
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for (kind, prediction_id, stored) in writes {
            match stored {
                Ok(true) => report.rescored += 1,
                Ok(false) => report.deferred += 1,
                Err(error) => {
                    warn!(%kind, prediction_id, %error, "Failed to rescore prediction");
                    report.failures.push(RescoreFailure {
                        kind,
                        prediction_id,
                        error,
                    });
                }
            }
        }
        report.failures.sort_by_key(|f| (f.kind.as_str(), f.prediction_id));

        report
    }

    async fn store_points(
        &self,
        kind: PredictionKind,
        prediction_id: i32,
        points: Option<u32>,
    ) -> Result<(), DbErr> {
        let points = points.map(|p| p as i32);
        let scored_at = points.map(|_| Utc::now());
        match kind {
            PredictionKind::Season => {
                season_prediction::Entity::update_many()
                    .col_expr(season_prediction::Column::Points, Expr::value(points))
                    .col_expr(season_prediction::Column::ScoredAt, Expr::value(scored_at))
                    .filter(season_prediction::Column::Id.eq(prediction_id))
                    .exec(self.conn)
                    .await?;
            }
            PredictionKind::Race => {
                race_prediction::Entity::update_many()
                    .col_expr(race_prediction::Column::Points, Expr::value(points))
                    .col_expr(race_prediction::Column::ScoredAt, Expr::value(scored_at))
                    .filter(race_prediction::Column::Id.eq(prediction_id))
                    .exec(self.conn)
                    .await?;
            }
        }
        Ok(())
    }
}

fn group_votes(rows: Vec<crazy_vote::Model>) -> VoteIndex {
    let mut index = VoteIndex::new();
    for row in rows {
        index.entry(row.prediction_id).or_default().push(row.to_vote());
    }
    index
}
