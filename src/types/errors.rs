use serde::Serialize;
use thiserror::Error;

/// Errors that abort a match attempt.
///
/// "Nothing matched" is never an error: it is reported as
/// `MatchStatus::NotFound` inside a normal result.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid hash: {0}")]
    InvalidHash(String),
    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Match cancelled")]
    Cancelled,
}

impl From<sqlx::Error> for MatchError {
    fn from(error: sqlx::Error) -> Self {
        MatchError::StoreUnavailable(error.to_string())
    }
}

impl Serialize for MatchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

/// Why an optional upstream (translation, image fetch, image decode)
/// produced nothing. Always recovered locally by skipping the stage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoSignal {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {0}")]
    Http(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("no provider configured")]
    Unconfigured,
}

impl From<reqwest::Error> for NoSignal {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            NoSignal::Timeout
        } else if let Some(status) = error.status() {
            NoSignal::Http(status.as_u16())
        } else {
            NoSignal::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
