//! Error taxonomy for the analysis pipeline

use thiserror::Error;

/// Every way a single analysis request can fail.
///
/// JSON-LD parse failures are deliberately absent: they are confined to the
/// block that failed and never abort an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("host cannot be resolved: {host}")]
    UnresolvableHost { host: String },

    #[error("address {address} of host {host} is in a reserved range")]
    SsrfBlocked { host: String, address: String },

    #[error("unsupported content type: {0}")]
    UnsupportedMedia(String),

    #[error("upstream responded with status {status}")]
    Upstream { status: u16 },

    #[error("response body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("timed out fetching the page")]
    NetworkTimeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("no markup supplied")]
    EmptyMarkup,
}

impl AnalyzeError {
    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::InvalidAddress(_) => "invalid_address",
            AnalyzeError::UnresolvableHost { .. } => "unresolvable_host",
            AnalyzeError::SsrfBlocked { .. } => "ssrf_blocked",
            AnalyzeError::UnsupportedMedia(_) => "unsupported_media",
            AnalyzeError::Upstream { .. } => "upstream_error",
            AnalyzeError::PayloadTooLarge { .. } => "payload_too_large",
            AnalyzeError::NetworkTimeout => "network_timeout",
            AnalyzeError::Network(_) => "network_error",
            AnalyzeError::EmptyMarkup => "empty_markup",
        }
    }

    /// True for failures caused by the caller's input rather than the target.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyzeError::InvalidAddress(_)
                | AnalyzeError::UnresolvableHost { .. }
                | AnalyzeError::SsrfBlocked { .. }
                | AnalyzeError::EmptyMarkup
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AnalyzeError::NetworkTimeout.kind(), "network_timeout");
        assert_eq!(AnalyzeError::Upstream { status: 404 }.kind(), "upstream_error");
        assert_eq!(
            AnalyzeError::PayloadTooLarge { limit: 10 }.kind(),
            "payload_too_large"
        );
    }

    #[test]
    fn client_errors_are_input_failures() {
        assert!(AnalyzeError::InvalidAddress("ftp://x".into()).is_client_error());
        assert!(
            AnalyzeError::SsrfBlocked {
                host: "localhost".into(),
                address: "127.0.0.1".into()
            }
            .is_client_error()
        );
        assert!(!AnalyzeError::NetworkTimeout.is_client_error());
        assert!(!AnalyzeError::Upstream { status: 500 }.is_client_error());
    }

    #[test]
    fn messages_name_the_cause() {
        let err = AnalyzeError::PayloadTooLarge { limit: 2_621_440 };
        assert_eq!(err.to_string(), "response body exceeds 2621440 bytes");
    }
}
