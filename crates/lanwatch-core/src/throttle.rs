// Bandwidth-limit toggle
//
// Two stateless endpoints on the download-client helper: one reports
// whether the alternative speed limit is active ("1" in the body), the
// other flips it. The helper has no idempotent set-on/set-off call,
// only a toggle, which is why the watcher always reads the state first.

use tracing::debug;
use url::Url;

use crate::error::CoreError;
use lanwatch_api::TransportConfig;

pub struct ThrottleClient {
    http: reqwest::Client,
    toggle_endpoint: Url,
    state_endpoint: Url,
}

impl ThrottleClient {
    pub fn new(
        toggle_endpoint: Url,
        state_endpoint: Url,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            http: transport.build_client().map_err(CoreError::from)?,
            toggle_endpoint,
            state_endpoint,
        })
    }

    /// Whether the speed limit is currently active.
    pub async fn state(&self) -> Result<bool, CoreError> {
        debug!("GET {}", self.state_endpoint);

        let resp = self
            .http
            .get(self.state_endpoint.clone())
            .send()
            .await
            .map_err(|e| CoreError::Throttle {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Throttle {
                reason: format!("state endpoint returned HTTP {status}"),
            });
        }

        let body = resp.text().await.map_err(|e| CoreError::Throttle {
            reason: e.to_string(),
        })?;
        Ok(body == "1")
    }

    /// Flip the speed limit.
    pub async fn toggle(&self) -> Result<(), CoreError> {
        debug!("POST {}", self.toggle_endpoint);

        let resp = self
            .http
            .post(self.toggle_endpoint.clone())
            .send()
            .await
            .map_err(|e| CoreError::Throttle {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Throttle {
                reason: format!("toggle endpoint returned HTTP {status}"),
            });
        }
        Ok(())
    }
}
