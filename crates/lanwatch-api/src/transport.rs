// Shared transport configuration for building reqwest::Client instances.
//
// Every backend builds its client here so timeout and header policy stay
// in one place. No cookie jar: the ZXHN login threads its cookies
// explicitly through a Session value, and the feed backend is stateless.

use std::time::Duration;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Bounded per-request timeout; expiry surfaces as a transport error
    /// so a poll cycle can never stall indefinitely.
    pub timeout: Duration,
    /// User-Agent sent with every request. The ZXHN login endpoint
    /// inspects it and rejects non-browser agents.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/106.0.0.0 Safari/537.36"
            )
            .to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;
        Ok(client)
    }
}
