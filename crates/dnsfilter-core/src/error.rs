use thiserror::Error;

/// Result type alias for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors that can occur while building or refreshing a filter
#[derive(Error, Debug)]
pub enum FilterError {
    /// The HTTP GET for the blocklist failed (DNS, connect, TLS, body I/O)
    #[error("network error refreshing blocklist from {url}: {reason}")]
    HttpRefreshTransport {
        /// Blocklist source URL
        url: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The blocklist source answered with something other than 200
    #[error("bad http status {status} from blocklist source {url}")]
    HttpRefreshStatus {
        /// Blocklist source URL
        url: String,
        /// HTTP status code returned
        status: u16,
    },

    /// A zone could not be recorded in the denylist
    #[error("cannot add zone {zone:?}: {reason}")]
    InvalidZone {
        /// The rejected zone
        zone: String,
        /// Why it was rejected
        reason: String,
    },

    /// Refresh URL is malformed or not http(s)
    #[error("invalid refresh URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP refresh needs a tokio runtime to spawn its worker
    #[error("http refresh requires a running tokio runtime")]
    NoRuntime,
}

impl FilterError {
    /// Returns true if the error came out of a refresh pass
    #[must_use]
    pub const fn is_refresh_error(&self) -> bool {
        matches!(
            self,
            Self::HttpRefreshTransport { .. } | Self::HttpRefreshStatus { .. }
        )
    }

    /// Returns the HTTP status code if the source rejected the request
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpRefreshStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        let err = FilterError::HttpRefreshStatus {
            url: "http://lists.test/zones.txt".into(),
            status: 404,
        };
        assert_eq!(err.status_code(), Some(404));
        assert!(err.is_refresh_error());

        let err = FilterError::Config("bad".into());
        assert_eq!(err.status_code(), None);
        assert!(!err.is_refresh_error());
    }

    #[test]
    fn test_display() {
        let err = FilterError::HttpRefreshTransport {
            url: "http://127.0.0.1:9/zones".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "network error refreshing blocklist from http://127.0.0.1:9/zones: connection refused"
        );
    }
}
