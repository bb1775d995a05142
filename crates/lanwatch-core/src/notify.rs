// Webhook notification sink
//
// Discord-compatible webhook: POST {content, username}. Strictly
// best-effort -- the watcher logs delivery failures and moves on; a
// missed message never fails a cycle.

use tracing::debug;
use url::Url;

use crate::error::CoreError;
use lanwatch_api::TransportConfig;

pub struct Notifier {
    http: reqwest::Client,
    webhook: Url,
    username: String,
}

impl Notifier {
    pub fn new(
        webhook: Url,
        username: String,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            http: transport.build_client().map_err(CoreError::from)?,
            webhook,
            username,
        })
    }

    pub async fn send(&self, message: &str) -> Result<(), CoreError> {
        let payload = serde_json::json!({
            "content": message,
            "username": self.username,
        });

        let resp = self
            .http
            .post(self.webhook.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| CoreError::Notify {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Notify {
                reason: format!("HTTP {status}"),
            });
        }

        debug!("notification delivered");
        Ok(())
    }
}
