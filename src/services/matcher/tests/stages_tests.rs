use super::*;
use crate::services::matcher::types::{MatchStatus, Suggestion};

fn outcome(status: MatchStatus, id: i64) -> MatchOutcome {
    MatchOutcome {
        status,
        confidence: 0.5,
        chosen_id: matches!(status, MatchStatus::Exact | MatchStatus::Fuzzy).then_some(id),
        suggestions: vec![Suggestion {
            card_id: id,
            name: format!("Card {id}"),
            card_type: None,
            race: None,
            score: 0.5,
        }],
        source: MatchSource::FuzzyName,
    }
}

const ALL: [Stage; 5] = [
    Stage::Passcode,
    Stage::ExactName,
    Stage::FuzzyName,
    Stage::TranslatedName,
    Stage::Visual,
];

#[tokio::test]
async fn test_all_skips_is_not_found() {
    let flag = new_cancel_flag();
    let result = run_cascade(&ALL, StopRule::FirstAccepted, &flag, |_| async {
        Ok(StageResult::Skip)
    })
    .await
    .unwrap();
    assert_eq!(result, MatchOutcome::not_found());
}

#[tokio::test]
async fn test_first_result_stops_on_tentative() {
    let flag = new_cancel_flag();
    let mut visited = Vec::new();
    let result = run_cascade(&ALL, StopRule::FirstResult, &flag, |stage| {
        visited.push(stage);
        async move {
            Ok(match stage {
                Stage::FuzzyName => StageResult::Tentative(outcome(MatchStatus::Ambiguous, 1)),
                Stage::Visual => StageResult::Accepted(outcome(MatchStatus::Fuzzy, 2)),
                _ => StageResult::Skip,
            })
        }
    })
    .await
    .unwrap();

    assert_eq!(result.status, MatchStatus::Ambiguous);
    assert_eq!(visited, vec![Stage::Passcode, Stage::ExactName, Stage::FuzzyName]);
}

#[tokio::test]
async fn test_first_accepted_continues_past_tentative() {
    let flag = new_cancel_flag();
    let result = run_cascade(&ALL, StopRule::FirstAccepted, &flag, |stage| async move {
        Ok(match stage {
            Stage::FuzzyName => StageResult::Tentative(outcome(MatchStatus::Ambiguous, 1)),
            Stage::Visual => StageResult::Accepted(outcome(MatchStatus::Fuzzy, 2)),
            _ => StageResult::Skip,
        })
    })
    .await
    .unwrap();
    assert_eq!(result.chosen_id, Some(2));
}

#[tokio::test]
async fn test_first_tentative_is_kept_as_fallback() {
    let flag = new_cancel_flag();
    let result = run_cascade(&ALL, StopRule::FirstAccepted, &flag, |stage| async move {
        Ok(match stage {
            Stage::FuzzyName => StageResult::Tentative(outcome(MatchStatus::Ambiguous, 1)),
            Stage::Visual => StageResult::Tentative(outcome(MatchStatus::Ambiguous, 2)),
            _ => StageResult::Skip,
        })
    })
    .await
    .unwrap();
    assert_eq!(result.status, MatchStatus::Ambiguous);
    assert_eq!(result.suggestions[0].card_id, 1);
}

#[tokio::test]
async fn test_cancelled_before_any_stage() {
    let flag = new_cancel_flag();
    flag.store(true, Ordering::Relaxed);
    let result = run_cascade(&ALL, StopRule::FirstResult, &flag, |_| async {
        Ok(StageResult::Skip)
    })
    .await;
    assert!(matches!(result, Err(MatchError::Cancelled)));
}

#[tokio::test]
async fn test_cancel_between_stages() {
    let flag = new_cancel_flag();
    let flag_in_stage = Arc::clone(&flag);
    let result = run_cascade(&ALL, StopRule::FirstAccepted, &flag, move |stage| {
        if stage == Stage::ExactName {
            flag_in_stage.store(true, Ordering::Relaxed);
        }
        async { Ok(StageResult::Skip) }
    })
    .await;
    assert!(matches!(result, Err(MatchError::Cancelled)));
}

#[tokio::test]
async fn test_stage_error_propagates() {
    let flag = new_cancel_flag();
    let result = run_cascade(&ALL, StopRule::FirstResult, &flag, |_| async {
        Err(MatchError::StoreUnavailable("down".into()))
    })
    .await;
    assert!(matches!(result, Err(MatchError::StoreUnavailable(_))));
}

#[test]
fn test_stage_result_from_outcome() {
    assert_eq!(StageResult::from_outcome(None), StageResult::Skip);
    assert!(matches!(
        StageResult::from_outcome(Some(outcome(MatchStatus::Fuzzy, 1))),
        StageResult::Accepted(_)
    ));
    assert!(matches!(
        StageResult::from_outcome(Some(outcome(MatchStatus::Ambiguous, 1))),
        StageResult::Tentative(_)
    ));
}
