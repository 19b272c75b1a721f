use scoring::PredictionKind;
use serde::Serialize;

use crate::services::scoring::{RecalculationReport, RescoreFailure};

#[derive(Serialize, utoipa::ToSchema)]
pub struct RescoreFailureResponse {
    pub kind: PredictionKind,
    #[schema(example = 12)]
    pub prediction_id: i32,
    #[schema(example = "Stored season result is unreadable: expected a sequence")]
    pub error: String,
}

impl From<RescoreFailure> for RescoreFailureResponse {
    fn from(failure: RescoreFailure) -> Self {
        Self {
            kind: failure.kind,
            prediction_id: failure.prediction_id,
            error: failure.error,
        }
    }
}

/// Outcome of a rescoring batch.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecalculationReportResponse {
    /// Predictions whose points were recomputed and stored.
    #[schema(example = 120)]
    pub rescored: u64,
    /// Predictions skipped because their result is not entered yet.
    #[schema(example = 48)]
    pub deferred: u64,
    /// Predictions that could not be rescored; the rest of the batch still ran.
    pub failures: Vec<RescoreFailureResponse>,
}

impl From<RecalculationReport> for RecalculationReportResponse {
    fn from(report: RecalculationReport) -> Self {
        Self {
            rescored: report.rescored,
            deferred: report.deferred,
            failures: report.failures.into_iter().map(Into::into).collect(),
        }
    }
}
