// ZXHN-family web-admin client
//
// Hand-written client for the reverse-engineered admin interface of
// ZTE ZXHN-series home routers. The firmware has no documented API:
// "active hosts" is reconstructed by logging in through the browser
// login flow and correlating the DHCP lease table with the ARP table.
// Endpoints are inconsistent about response shape (JSON vs XML), so
// every authenticated response passes through a dual-format
// classification before it is trusted.

pub mod client;
pub mod correlate;
pub mod scan;
pub mod session;

pub use client::ZxhnClient;
pub use scan::{ConnectivityRecord, LeaseRecord, LinkState};
pub use session::Session;
