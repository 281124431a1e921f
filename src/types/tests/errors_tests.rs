use crate::types::errors::{MatchError, NoSignal};
use sqlx::Error as SqlxError;

#[test]
fn test_match_error_from_sqlx_is_store_unavailable() {
    let sqlx_err = SqlxError::PoolTimedOut;
    let err = MatchError::from(sqlx_err);

    match err {
        MatchError::StoreUnavailable(msg) => {
            assert!(!msg.is_empty());
        }
        _ => panic!("Expected MatchError::StoreUnavailable"),
    }
}

#[test]
fn test_match_error_serialization() {
    let err = MatchError::InvalidHash("nothex".to_string());

    // MatchError serializes as just its Display string
    let serialized = serde_json::to_string(&err).unwrap();
    assert_eq!(serialized, "\"Invalid hash: nothex\"");
}

#[test]
fn test_no_signal_display() {
    assert_eq!(NoSignal::Http(503).to_string(), "HTTP 503");
    assert_eq!(NoSignal::Unconfigured.to_string(), "no provider configured");
}
