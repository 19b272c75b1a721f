//! Peer validation of crazy predictions.
//!
//! Votes decide whether a crazy prediction is a legitimate guess, not whether
//! it came true. The admin "happened" flag is a separate gate applied by the
//! engine; a point needs both.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};
use crate::model::UserId;

/// One peer's accept/reject opinion on a crazy prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Vote {
    pub validator_id: UserId,
    pub accepted: bool,
}

/// Validation state derived from the current votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    Unvalidated,
    Accepted,
    Rejected,
}

impl ValidationState {
    /// The single transition function.
    ///
    /// No votes leaves the prediction `Unvalidated`. Any explicit reject makes
    /// it `Rejected`, regardless of how many accepts exist. Otherwise it is
    /// `Accepted`.
    pub fn from_votes(votes: &[Vote]) -> Self {
        if votes.is_empty() {
            Self::Unvalidated
        } else if votes.iter().any(|v| !v.accepted) {
            Self::Rejected
        } else {
            Self::Accepted
        }
    }
}

/// Scoring-time outcome of validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CrazyVerdict {
    Accepted,
    Rejected,
}

impl CrazyVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Resolve the verdict used by the engine.
///
/// An admin override (`Some(true)` accept, `Some(false)` reject) always wins.
/// Without one, unvalidated predictions are accepted by default.
pub fn resolve_crazy_prediction_state(
    votes: &[Vote],
    admin_override: Option<bool>,
) -> CrazyVerdict {
    if let Some(accepted) = admin_override {
        return if accepted {
            CrazyVerdict::Accepted
        } else {
            CrazyVerdict::Rejected
        };
    }
    match ValidationState::from_votes(votes) {
        ValidationState::Unvalidated | ValidationState::Accepted => CrazyVerdict::Accepted,
        ValidationState::Rejected => CrazyVerdict::Rejected,
    }
}

/// Reject a vote cast by the prediction's own author.
pub fn ensure_can_vote(author_id: UserId, validator_id: UserId) -> Result<()> {
    if author_id == validator_id {
        return Err(ScoringError::Authorization(
            "You cannot validate your own crazy prediction".into(),
        ));
    }
    Ok(())
}

/// Votes on a single crazy prediction, at most one per validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteBook {
    author_id: UserId,
    votes: Vec<Vote>,
}

impl VoteBook {
    pub fn new(author_id: UserId) -> Self {
        Self {
            author_id,
            votes: Vec::new(),
        }
    }

    /// Build a book from stored votes. Votes by the author are left out and
    /// a later vote by the same validator replaces an earlier one.
    pub fn with_votes(author_id: UserId, votes: Vec<Vote>) -> Self {
        let mut book = Self::new(author_id);
        for vote in votes {
            if vote.validator_id != author_id {
                book.record(vote);
            }
        }
        book
    }

    /// Insert or replace the validator's vote. A self-vote fails and leaves
    /// the book unchanged.
    pub fn cast(&mut self, vote: Vote) -> Result<()> {
        ensure_can_vote(self.author_id, vote.validator_id)?;
        self.record(vote);
        Ok(())
    }

    fn record(&mut self, vote: Vote) {
        match self
            .votes
            .iter_mut()
            .find(|v| v.validator_id == vote.validator_id)
        {
            Some(existing) => existing.accepted = vote.accepted,
            None => self.votes.push(vote),
        }
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn state(&self) -> ValidationState {
        ValidationState::from_votes(&self.votes)
    }

    pub fn verdict(&self, admin_override: Option<bool>) -> CrazyVerdict {
        resolve_crazy_prediction_state(&self.votes, admin_override)
    }
}
