// Adapter backend
//
// Some deployments already have the active-host question answered --
// by a vendor library wrapper or a small helper service -- and only
// need the result mapped onto the common Host shape. The capability is
// a port trait so the source stays a black box; the one concrete
// implementation here reads a JSON array over HTTP.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::model::Host;
use crate::transport::TransportConfig;

/// One record from an external "active hosts" capability.
///
/// Sources are free to report whatever extra fields they like; only
/// `mac`, `name`, and `ip` survive the adaptation, and unknown JSON
/// fields are ignored on deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueriedHost {
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
}

/// An already-solved router-query capability.
#[async_trait]
pub trait HostQuery: Send + Sync {
    async fn query_active_hosts(&self) -> Result<Vec<QueriedHost>, Error>;
}

/// Adapter that maps an external [`HostQuery`] onto the common
/// [`Host`] shape, discarding extra fields and records without a MAC.
pub struct FeedClient {
    source: Box<dyn HostQuery>,
}

impl FeedClient {
    pub fn new(source: impl HostQuery + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub async fn list_active_hosts(&self) -> Result<Vec<Host>, Error> {
        let queried = self.source.query_active_hosts().await?;
        Ok(queried
            .into_iter()
            .filter(|q| !q.mac.is_empty())
            .map(|q| Host {
                mac: q.mac,
                name: q.name,
                ip: q.ip,
            })
            .collect())
    }
}

/// [`HostQuery`] over a helper service that exposes the resolved
/// active-host list as a JSON array at a single URL.
pub struct HttpHostQuery {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpHostQuery {
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            endpoint,
        })
    }
}

#[async_trait]
impl HostQuery for HttpHostQuery {
    async fn query_active_hosts(&self) -> Result<Vec<QueriedHost>, Error> {
        debug!("GET {}", self.endpoint);

        let resp = self.http.get(self.endpoint.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::parse(format!("host feed payload: {e}")))
    }
}
