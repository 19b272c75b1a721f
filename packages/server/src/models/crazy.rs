use scoring::{CrazyVerdict, PredictionKind, ValidationState, Vote, VoteBook};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CastVoteRequest {
    /// `true` accepts the prediction as a legitimate guess, `false` rejects it.
    pub accepted: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CrazyOverrideRequest {
    /// Forced verdict. `null` clears the override so votes decide again.
    pub accepted: Option<bool>,
}

/// A crazy prediction with its current validation status.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CrazyPredictionResponse {
    pub kind: PredictionKind,
    #[schema(example = 12)]
    pub prediction_id: i32,
    #[schema(example = 42)]
    pub author_id: i32,
    #[schema(example = 2026)]
    pub season: i32,
    /// Set for race-level predictions.
    pub race_id: Option<i32>,
    #[schema(example = "A Williams driver finishes on the podium")]
    pub text: String,
    pub votes: Vec<Vote>,
    pub state: ValidationState,
    /// The verdict scoring uses, after applying any admin override.
    pub verdict: CrazyVerdict,
    pub admin_override: Option<bool>,
    /// Whether the entered result marks it as having happened; NULL before
    /// the result exists.
    pub happened: Option<bool>,
}

/// Identity of a crazy prediction, independent of which table it lives in.
pub struct CrazySubject {
    pub kind: PredictionKind,
    pub prediction_id: i32,
    pub author_id: i32,
    pub season: i32,
    pub race_id: Option<i32>,
    pub text: String,
    pub admin_override: Option<bool>,
}

impl CrazyPredictionResponse {
    pub fn new(subject: CrazySubject, book: &VoteBook, happened: Option<bool>) -> Self {
        Self {
            kind: subject.kind,
            prediction_id: subject.prediction_id,
            author_id: subject.author_id,
            season: subject.season,
            race_id: subject.race_id,
            text: subject.text,
            votes: book.votes().to_vec(),
            state: book.state(),
            verdict: book.verdict(subject.admin_override),
            admin_override: subject.admin_override,
            happened,
        }
    }
}
