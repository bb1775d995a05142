// ZXHN HTTP client
//
// Owns the reqwest client and URL construction; the login handshake
// lives in `session`, field extraction in `scan`, and the lease/ARP
// join in `correlate`. Everything the admin interface serves hangs off
// a single path with `_type`/`_tag` query discriminators.

use reqwest::header;
use secrecy::SecretString;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::model::Host;
use crate::zxhn::correlate::correlate;
use crate::zxhn::scan::{ConnectivityRecord, LeaseRecord, parse_connectivity_table, parse_lease_table};
use crate::zxhn::session::{Classification, Session, classify};

/// Client for the ZXHN web-admin interface.
///
/// Holds credentials and transport only -- no session state. Each call
/// to [`list_active_hosts`](Self::list_active_hosts) authenticates from
/// scratch and discards the session at the end, trading a login
/// round-trip per cycle for crash-safety and statelessness.
pub struct ZxhnClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) username: String,
    pub(crate) password: SecretString,
}

impl ZxhnClient {
    /// Create a new client for the admin interface at `base_url`
    /// (e.g. `http://192.168.1.1`).
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &crate::transport::TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            username,
            password,
        })
    }

    /// List the devices that are currently online.
    ///
    /// Logs in, fetches the DHCP lease table and the ARP connectivity
    /// table (strictly in that order -- each fetch depends on the
    /// session cookie), and joins them on IP address.
    pub async fn list_active_hosts(&self) -> Result<Vec<Host>, Error> {
        let session = self.login().await?;
        let leases = self.fetch_lease_table(&session).await?;
        let links = self.fetch_connectivity_table(&session).await?;
        debug!(
            leases = leases.len(),
            links = links.len(),
            "device tables fetched"
        );
        Ok(correlate(&leases, &links))
    }

    async fn fetch_lease_table(&self, session: &Session) -> Result<Vec<LeaseRecord>, Error> {
        self.fetch_view("lanMgrIpv4", session).await?;
        let body = self.fetch_data("dhcp4s_dhcphostinfo_m.lua", session).await?;
        parse_lease_table(&body)
    }

    async fn fetch_connectivity_table(
        &self,
        session: &Session,
    ) -> Result<Vec<ConnectivityRecord>, Error> {
        self.fetch_view("arpTable", session).await?;
        let body = self.fetch_data("arp_arptable_lua.lua", session).await?;
        parse_connectivity_table(&body)
    }

    /// Navigation request for a menu page. The firmware refuses the
    /// matching data request unless the view was visited first within
    /// the same session.
    async fn fetch_view(&self, tag: &str, session: &Session) -> Result<(), Error> {
        let mut url = self.query_url("menuView", tag, session.marker);
        url.query_pairs_mut().append_pair("Menu3Location", "0");
        self.fetch_classified(url, &session.post_auth_cookie)
            .await?;
        Ok(())
    }

    async fn fetch_data(&self, tag: &str, session: &Session) -> Result<String, Error> {
        let url = self.query_url("menuData", tag, session.marker);
        self.fetch_classified(url, &session.post_auth_cookie).await
    }

    /// GET `url` with `cookie` attached, enforce a 2xx status, then run
    /// the dual-format classification before handing the body back.
    async fn fetch_classified(&self, url: Url, cookie: &str) -> Result<String, Error> {
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .header(header::COOKIE, cookie)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        match classify(&body) {
            Classification::StructuredError(message) => Err(Error::Authentication { message }),
            Classification::MarkupError(status) => Err(Error::Protocol {
                message: format!("router reported '{status}'"),
            }),
            Classification::Opaque => Ok(body),
        }
    }

    /// Build `{base}/?_type={qtype}&_tag={tag}&_={marker}`. The marker
    /// defeats the firmware's response caching.
    pub(crate) fn query_url(&self, qtype: &str, tag: &str, marker: i64) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("_type", qtype)
            .append_pair("_tag", tag)
            .append_pair("_", &marker.to_string());
        url
    }
}
