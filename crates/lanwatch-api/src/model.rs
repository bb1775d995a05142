use serde::{Deserialize, Serialize};

/// One active device as reported by a router backend.
///
/// The MAC is the natural key downstream (whitelist comparison) and is
/// always non-empty -- records without one are dropped inside the
/// backend. The name may be an empty string when the router supplied
/// none, and the IP is absent for backends that do not report one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub mac: String,
    pub name: String,
    pub ip: Option<String>,
}
