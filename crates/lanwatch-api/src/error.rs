use thiserror::Error;

/// Top-level error type for the `lanwatch-api` crate.
///
/// Every failure a router backend can produce falls into one of four
/// classes: authentication, protocol, transport, or parse. All of them
/// are recoverable -- the caller skips the current poll cycle and tries
/// again at the next interval.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected, or a higher-privilege session is already
    /// active on another device.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Protocol ────────────────────────────────────────────────────
    /// Response was well-formed but reports a router-side failure.
    #[error("Router request error: {message}")]
    Protocol { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status, checked before any body inspection.
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// Payload did not match any expected structured or markup shape.
    #[error("Malformed payload: {message}")]
    Parse { message: String },
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a connectivity-class failure (as opposed
    /// to the router actively rejecting the request).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { .. } => true,
            _ => false,
        }
    }
}
