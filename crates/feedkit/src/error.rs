//! Error types for FeedKit

use thiserror::Error;

/// Errors that can occur while fetching a single page
///
/// Discovery never surfaces these to the caller: a failed fetch only
/// drops the candidate that was being probed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request or body read exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Response body exceeded the size limit
    #[error("Response too large")]
    TooLarge,

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::RequestError(err.to_string())
        }
    }

    /// True for failures worth retrying under a relaxed TLS policy
    pub fn is_connect(&self) -> bool {
        matches!(self, FetchError::ConnectError(_))
    }
}

/// Errors returned by the crawler and the tool surface
#[derive(Debug, Error)]
pub enum FeedError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// Discovery exhausted every stage without confirming a feed
    #[error("No feed found for {site}")]
    NoFeedFound { site: String },

    /// The discovered feed could not be fetched
    #[error("Failed to fetch feed: {0}")]
    Fetch(#[from] FetchError),

    /// The discovered feed could not be parsed
    #[error("Failed to parse feed: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::MissingUrl.to_string(),
            "Missing required parameter: url"
        );
        assert_eq!(
            FetchError::InvalidUrlScheme.to_string(),
            "Invalid URL: must start with http:// or https://"
        );
        assert_eq!(
            FetchError::BlockedUrl.to_string(),
            "Blocked URL: prefix not allowed"
        );
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
        assert_eq!(FetchError::HttpStatus(404).to_string(), "HTTP status 404");
    }

    #[test]
    fn test_feed_error_messages() {
        let err = FeedError::NoFeedFound {
            site: "https://example.com".to_string(),
        };
        assert_eq!(err.to_string(), "No feed found for https://example.com");

        let err: FeedError = FetchError::Timeout.into();
        assert_eq!(err.to_string(), "Failed to fetch feed: Request timed out");
    }

    #[test]
    fn test_is_connect() {
        assert!(!FetchError::Timeout.is_connect());
        assert!(!FetchError::HttpStatus(500).is_connect());
    }
}
