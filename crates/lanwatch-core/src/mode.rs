// Tracking mode
//
// A small control page exposes the user-selected automation behavior
// as a JSON `value` radio-button setting. The watcher reads it at the
// top of every cycle so the user can flip behavior without restarts.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::CoreError;
use lanwatch_api::TransportConfig;

/// User-selected automation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
    /// Do nothing this cycle.
    Off,
    /// Enable the limit when an unfamiliar device appears.
    Limit,
    /// Additionally lift the limit once only familiar devices remain.
    LimitAndRelease,
}

impl TrackingMode {
    /// Decode the control page's radio-button value. Anything that is
    /// not a known tracking value means "leave the connection alone".
    pub(crate) fn from_value(value: &str) -> Self {
        match value {
            "2" => Self::Limit,
            "3" => Self::LimitAndRelease,
            _ => Self::Off,
        }
    }

    pub fn tracks(self) -> bool {
        !matches!(self, Self::Off)
    }

    pub fn releases(self) -> bool {
        matches!(self, Self::LimitAndRelease)
    }
}

#[derive(Debug, Deserialize)]
struct ModeEnvelope {
    value: String,
}

/// Reads the tracking mode from the control-page endpoint.
pub struct ModeSource {
    http: reqwest::Client,
    endpoint: Url,
}

impl ModeSource {
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, CoreError> {
        Ok(Self {
            http: transport.build_client().map_err(CoreError::from)?,
            endpoint,
        })
    }

    pub async fn fetch(&self) -> Result<TrackingMode, CoreError> {
        debug!("GET {}", self.endpoint);

        let resp = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| CoreError::Mode {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Mode {
                reason: format!("HTTP {status}"),
            });
        }

        let envelope: ModeEnvelope = resp.json().await.map_err(|e| CoreError::Mode {
            reason: e.to_string(),
        })?;
        Ok(TrackingMode::from_value(&envelope.value))
    }
}
