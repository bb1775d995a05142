// ── Identity types for the whitelist comparison ──

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use lanwatch_api::Host;

/// MAC address, normalized to uppercase colon-separated format
/// (AA:BB:CC:DD:EE:FF).
///
/// The router backends report uppercase colon-separated MACs; the
/// whitelist normalizes both sides so config formatting (lowercase,
/// dashes) never causes a missed match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().to_uppercase().replace('-', ":");
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ── Whitelist ───────────────────────────────────────────────────────

/// The set of MAC addresses exempt from triggering the limit.
#[derive(Debug, Clone, Default)]
pub struct Whitelist(HashSet<MacAddress>);

impl Whitelist {
    pub fn contains(&self, mac: &str) -> bool {
        self.0.contains(&MacAddress::new(mac))
    }

    /// Hosts whose MAC is not on the whitelist.
    pub fn strangers<'a>(&self, hosts: &'a [Host]) -> Vec<&'a Host> {
        hosts
            .iter()
            .filter(|host| !host.mac.is_empty() && !self.contains(&host.mac))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Whitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(MacAddress::new).collect())
    }
}
