use crate::adapter::FeedClient;
use crate::error::Error;
use crate::model::Host;
use crate::zxhn::ZxhnClient;

/// The router backend, selected once at startup from configuration.
///
/// The variant set is closed on purpose: backends are compiled in, not
/// plugged in, and every variant provides the same single operation
/// with the same guarantees (non-empty MACs, unstable ordering, the
/// shared failure taxonomy).
pub enum RouterClient {
    /// ZXHN-family web-admin protocol client.
    Zxhn(ZxhnClient),
    /// Adapter over an external active-hosts capability.
    Feed(FeedClient),
}

impl RouterClient {
    /// List the devices currently online, as seen by the router.
    pub async fn list_active_hosts(&self) -> Result<Vec<Host>, Error> {
        match self {
            Self::Zxhn(client) => client.list_active_hosts().await,
            Self::Feed(client) => client.list_active_hosts().await,
        }
    }
}
