//! Ordered stage cascade.
//!
//! Each stage looks at the query and returns `Skip`, a `Tentative` outcome
//! (candidates that still need review) or an `Accepted` outcome. The
//! orchestrator walks the stages in order and stops according to its
//! `StopRule`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "debug_matcher")]
use log::debug;

use super::types::{MatchOutcome, MatchSource};
use crate::types::errors::{MatchError, MatchResult};

/// Shared cancellation switch. Set it to abandon a multi-stage match.
pub type CancelFlag = Arc<AtomicBool>;

pub fn new_cancel_flag() -> CancelFlag {
    Arc::new(AtomicBool::new(false))
}

pub fn is_cancelled(cancel_flag: &AtomicBool) -> bool {
    cancel_flag.load(Ordering::Relaxed)
}

/// Named stages in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Passcode,
    ExactName,
    FuzzyName,
    TranslatedName,
    Visual,
}

impl Stage {
    pub fn source(&self) -> MatchSource {
        match self {
            Stage::Passcode => MatchSource::Passcode,
            Stage::ExactName => MatchSource::ExactName,
            Stage::FuzzyName => MatchSource::FuzzyName,
            Stage::TranslatedName => MatchSource::TranslatedName,
            Stage::Visual => MatchSource::Visual,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Passcode => write!(f, "passcode"),
            Stage::ExactName => write!(f, "exact_name"),
            Stage::FuzzyName => write!(f, "fuzzy_name"),
            Stage::TranslatedName => write!(f, "translated_name"),
            Stage::Visual => write!(f, "visual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageResult {
    Skip,
    Tentative(MatchOutcome),
    Accepted(MatchOutcome),
}

impl StageResult {
    /// Accepted when resolved (`exact`/`fuzzy`), tentative otherwise.
    pub fn from_outcome(outcome: Option<MatchOutcome>) -> Self {
        match outcome {
            Some(outcome) if outcome.is_resolved() => StageResult::Accepted(outcome),
            Some(outcome) => StageResult::Tentative(outcome),
            None => StageResult::Skip,
        }
    }
}

/// When the cascade ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Any non-skip result is final (spreadsheet import).
    FirstResult,
    /// Only an accepted result is final; the first tentative result is kept
    /// as the fallback answer (live scan).
    FirstAccepted,
}

/// Run `stages` in order through `run`.
///
/// The cancel flag is checked before every stage. When no stage produces a
/// final result the kept tentative outcome (if any) is returned, otherwise
/// `not_found`.
pub async fn run_cascade<F, Fut>(
    stages: &[Stage],
    stop: StopRule,
    cancel_flag: &AtomicBool,
    mut run: F,
) -> MatchResult<MatchOutcome>
where
    F: FnMut(Stage) -> Fut,
    Fut: std::future::Future<Output = MatchResult<StageResult>>,
{
    let mut fallback: Option<MatchOutcome> = None;

    for &stage in stages {
        if is_cancelled(cancel_flag) {
            return Err(MatchError::Cancelled);
        }

        let result = run(stage).await?;

        #[cfg(feature = "debug_matcher")]
        log_stage(stage, &result);

        match result {
            StageResult::Skip => {}
            StageResult::Accepted(outcome) => return Ok(outcome),
            StageResult::Tentative(outcome) => match stop {
                StopRule::FirstResult => return Ok(outcome),
                StopRule::FirstAccepted => {
                    if fallback.is_none() {
                        fallback = Some(outcome);
                    }
                }
            },
        }
    }

    Ok(fallback.unwrap_or_else(MatchOutcome::not_found))
}

#[cfg(feature = "debug_matcher")]
fn log_stage(stage: Stage, result: &StageResult) {
    match result {
        StageResult::Skip => debug!("[MATCHER] stage={stage} decision=skip"),
        StageResult::Tentative(outcome) | StageResult::Accepted(outcome) => debug!(
            "[MATCHER] stage={stage} decision={} confidence={:.3} chosen={:?} suggestions={}",
            outcome.status,
            outcome.confidence,
            outcome.chosen_id,
            outcome.suggestions.len()
        ),
    }
}

#[cfg(test)]
#[path = "tests/stages_tests.rs"]
mod tests;
