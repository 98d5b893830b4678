// src/error.rs
// =============================================================================
// Error types shared by the API wrapper and the search pipeline.
//
// There are two layers:
// - ApiError: something went wrong talking to the indexing service
//   (network failure, non-2xx response, body we couldn't decode)
// - SearchError: why a whole search was aborted. These are the messages
//   the user actually sees, so every variant renders a readable sentence.
//
// Rust concepts:
// - thiserror: derive Display + std::error::Error from attributes
// - #[from]: lets the ? operator convert one error type into another
// =============================================================================

use std::time::Duration;
use thiserror::Error;

/// Failure of a single request to the indexing service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, connection reset, timeout)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status code
    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    /// The service answered 2xx but the body was not the JSON we expected
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Why a search (or an index/status command) stopped.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please enter a valid repository in the format \"owner/repo\" (got \"{input}\")")]
    InvalidRepository { input: String },

    #[error("Not a GitHub repository URL: {input}")]
    NotGithub { input: String },

    /// Both branch candidates were rejected; status and body come from `main`
    #[error("Indexing failed: {status} - {body}")]
    Submission { status: u16, body: String },

    #[error(
        "Indexing timed out after {} ({} status checks). Try again later.",
        describe_wait(.waited),
        .attempts
    )]
    Timeout { attempts: u32, waited: Duration },

    #[error("Query failed: {status}")]
    Query { status: u16 },

    #[error("Search cancelled")]
    Cancelled,

    #[error("Indexing service unreachable: {0}")]
    Api(#[from] ApiError),
}

// "4 minutes" reads better than "240s" in the timeout message
fn describe_wait(waited: &Duration) -> String {
    let secs = waited.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        s if s >= 1 => format!("{} seconds", s),
        _ => format!("{} ms", waited.as_millis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_in_minutes() {
        let err = SearchError::Timeout {
            attempts: 48,
            waited: Duration::from_secs(240),
        };
        assert_eq!(
            err.to_string(),
            "Indexing timed out after 4 minutes (48 status checks). Try again later."
        );
    }

    #[test]
    fn test_timeout_message_in_seconds() {
        let err = SearchError::Timeout {
            attempts: 3,
            waited: Duration::from_secs(15),
        };
        assert_eq!(
            err.to_string(),
            "Indexing timed out after 15 seconds (3 status checks). Try again later."
        );
    }

    #[test]
    fn test_submission_message_carries_status_and_body() {
        let err = SearchError::Submission {
            status: 404,
            body: "repository not found".to_string(),
        };
        assert_eq!(err.to_string(), "Indexing failed: 404 - repository not found");
    }

    #[test]
    fn test_api_error_converts_into_search_error() {
        let api = ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        let err: SearchError = api.into();
        assert!(matches!(err, SearchError::Api(ApiError::Status { status: 502, .. })));
    }
}
