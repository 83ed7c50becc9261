// src/infra/errors.rs — Error types for dermbench

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DermBenchError {
    // Judge transport errors
    #[error("Network error calling judge: {0}")]
    Network(String),

    #[error("Rate limited by judge endpoint, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Judge HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        retriable: bool,
    },

    // Content policy rejected the prompt or the reply. Retrying will not
    // change a policy decision.
    #[error("Judge blocked content: {reason}")]
    ContentBlocked { reason: String },

    #[error("Judge returned no usable text (finish reason: {finish_reason})")]
    EmptyReply { finish_reason: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DermBenchError {
    /// Transient errors are retried (within budgets) and deferred from manual
    /// review; everything else is a permanent failure surfaced immediately.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            DermBenchError::Network(_)
                | DermBenchError::RateLimited { .. }
                | DermBenchError::Http {
                    retriable: true,
                    ..
                }
        )
    }

    /// True for connection/timeout failures, which use a separate retry
    /// budget from HTTP-level 429/5xx errors.
    pub fn is_network(&self) -> bool {
        matches!(self, DermBenchError::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_is_retriable() {
        assert!(DermBenchError::Network("connection reset".into()).is_retriable());
        assert!(DermBenchError::Network("timeout".into()).is_network());
    }

    #[test]
    fn test_rate_limited_is_retriable() {
        let e = DermBenchError::RateLimited { retry_after_ms: 5000 };
        assert!(e.is_retriable());
        assert!(!e.is_network());
    }

    #[test]
    fn test_server_error_is_retriable() {
        let e = DermBenchError::Http {
            status: 503,
            message: "overloaded".into(),
            retriable: true,
        };
        assert!(e.is_retriable());
    }

    #[test]
    fn test_client_error_is_permanent() {
        let e = DermBenchError::Http {
            status: 400,
            message: "bad request".into(),
            retriable: false,
        };
        assert!(!e.is_retriable());
    }

    #[test]
    fn test_blocked_is_permanent() {
        let e = DermBenchError::ContentBlocked {
            reason: "SAFETY".into(),
        };
        assert!(!e.is_retriable());
    }

    #[test]
    fn test_config_error_is_permanent() {
        assert!(!DermBenchError::Config("missing key".into()).is_retriable());
    }

    #[test]
    fn test_empty_reply_is_permanent() {
        let e = DermBenchError::EmptyReply {
            finish_reason: "STOP".into(),
        };
        assert!(!e.is_retriable());
    }
}
