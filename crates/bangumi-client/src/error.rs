//! Error taxonomy for catalog fetches.

use thiserror::Error;

/// Failure of a catalog request or of normalizing its records.
///
/// Any of these aborts the whole collection fetch; no partial collection is
/// ever returned.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A record is missing one of its identity fields
    #[error("Malformed record: missing {field}")]
    MalformedRecord { field: &'static str },

    /// Transport failure (DNS, connection reset, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-2xx response
    #[error("Request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    /// 2xx response whose body is not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A newer request for the dashboard started before this one finished
    #[error("Request for {user_id} was superseded by a newer request")]
    Superseded { user_id: String },
}

impl FetchError {
    /// HTTP status code, for `Http` failures
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_decode() {
            FetchError::Decode(error.to_string())
        } else {
            FetchError::Network(error)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Decode(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let error = FetchError::Http {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(error.status(), Some(404));
        assert_eq!(FetchError::Timeout.status(), None);
    }

    #[test]
    fn test_error_messages() {
        let error = FetchError::MalformedRecord { field: "subject.name" };
        assert_eq!(error.to_string(), "Malformed record: missing subject.name");

        let decode: FetchError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(decode, FetchError::Decode(_)));
    }
}
