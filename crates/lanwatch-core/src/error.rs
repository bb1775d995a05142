// Core error types
//
// Consumers of the watcher never see reqwest errors or payload dumps
// directly; the From<lanwatch_api::Error> impl translates the router
// taxonomy into domain variants while keeping the four-way
// classification intact for log and notification wording.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Router failures (one variant per api class) ─────────────────
    #[error("Router authentication failed: {message}")]
    RouterAuth { message: String },

    #[error("Router protocol error: {message}")]
    RouterProtocol { message: String },

    #[error("Router payload malformed: {message}")]
    RouterParse { message: String },

    #[error("Router unreachable: {reason}")]
    RouterTransport { reason: String },

    // ── Collaborator failures ───────────────────────────────────────
    #[error("Throttle endpoint error: {reason}")]
    Throttle { reason: String },

    #[error("Tracking-mode endpoint error: {reason}")]
    Mode { reason: String },

    #[error("Notification delivery failed: {reason}")]
    Notify { reason: String },

    // ── Configuration errors ────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<lanwatch_api::Error> for CoreError {
    fn from(err: lanwatch_api::Error) -> Self {
        match err {
            lanwatch_api::Error::Authentication { message } => Self::RouterAuth { message },
            lanwatch_api::Error::Protocol { message } => Self::RouterProtocol { message },
            lanwatch_api::Error::Parse { message } => Self::RouterParse { message },
            lanwatch_api::Error::Transport(e) => Self::RouterTransport {
                reason: e.to_string(),
            },
            lanwatch_api::Error::Status { status } => Self::RouterTransport {
                reason: format!("HTTP {status}"),
            },
            lanwatch_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid URL: {e}"),
            },
        }
    }
}
