// Lease/connectivity join
//
// The firmware reports leases and reachability as two independent
// tables keyed by IP. The join is only meaningful within one poll's
// freshly-fetched pair -- DHCP leases move between cycles.

use crate::model::Host;
use crate::zxhn::scan::{ConnectivityRecord, LeaseRecord, LinkState};

/// Join the two tables into the online host list.
///
/// Online connectivity entries pick up the lease with the same IP; the
/// last lease in table order wins when the firmware repeats an IP.
/// Online entries with no lease, and leases without a MAC, are dropped.
pub(crate) fn correlate(leases: &[LeaseRecord], links: &[ConnectivityRecord]) -> Vec<Host> {
    let mut hosts = Vec::new();
    for link in links.iter().filter(|l| l.state == LinkState::Online) {
        let Some(lease) = leases.iter().rev().find(|lease| lease.ip == link.ip) else {
            continue;
        };
        if lease.mac.is_empty() {
            continue;
        }
        hosts.push(Host {
            mac: lease.mac.to_uppercase(),
            name: lease.name.clone(),
            ip: Some(link.ip.clone()),
        });
    }
    hosts
}
