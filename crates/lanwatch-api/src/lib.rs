// lanwatch-api: clients for reconstructing the active-host list from
// home-router admin interfaces.

pub mod adapter;
pub mod client;
pub mod error;
pub mod model;
pub mod transport;
pub mod zxhn;

pub use adapter::{FeedClient, HostQuery, HttpHostQuery, QueriedHost};
pub use client::RouterClient;
pub use error::Error;
pub use model::Host;
pub use transport::TransportConfig;
pub use zxhn::ZxhnClient;
