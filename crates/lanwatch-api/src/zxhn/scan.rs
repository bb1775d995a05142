// Attribute-table parser
//
// The firmware exports device tables as repeated <Instance> blocks of
// flat, alternating elements: a <ParaName> element announces a field by
// its internal name, and the NEXT element (whatever its tag) carries
// that field's value. Nothing structural pairs them -- only adjacency
// in document order -- so extraction is a scan with one pending slot
// per watched field, not a tree walk.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::Error;

/// One opaque device record: the ordered (tag, text) pairs of a single
/// `Instance` block, before field extraction.
pub(crate) type RawInstance = Vec<(String, String)>;

/// One entry of the DHCP lease table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRecord {
    pub ip: String,
    pub mac: String,
    pub name: String,
}

/// Reachability of one IP in the ARP table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Online,
    Offline,
    Unknown,
}

impl LinkState {
    fn from_flag(text: &str) -> Self {
        match text {
            "1" => Self::Online,
            "0" => Self::Offline,
            _ => Self::Unknown,
        }
    }
}

/// One entry of the ARP connectivity table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityRecord {
    pub ip: String,
    pub state: LinkState,
}

const LEASE_FIELDS: [&str; 3] = [
    "OBJ_DHCPHOSTINFO_ID.IPAddr",
    "OBJ_DHCPHOSTINFO_ID.MACAddr",
    "OBJ_DHCPHOSTINFO_ID.HostName",
];

const LINK_FIELDS: [&str; 2] = ["DestIP", "Status"];

pub(crate) fn parse_lease_table(xml: &str) -> Result<Vec<LeaseRecord>, Error> {
    Ok(instances(xml)?
        .iter()
        .map(|instance| {
            let [ip, mac, name] = scan_fields(instance, LEASE_FIELDS);
            LeaseRecord { ip, mac, name }
        })
        .collect())
}

pub(crate) fn parse_connectivity_table(xml: &str) -> Result<Vec<ConnectivityRecord>, Error> {
    Ok(instances(xml)?
        .iter()
        .map(|instance| {
            let [ip, status] = scan_fields(instance, LINK_FIELDS);
            ConnectivityRecord {
                ip,
                state: LinkState::from_flag(&status),
            }
        })
        .collect())
}

/// Collect every `Instance` block as its ordered (tag, text) pairs.
fn instances(xml: &str) -> Result<Vec<RawInstance>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut current: Option<RawInstance> = None;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::parse(format!("bad table markup: {e}")))?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "Instance" {
                    current = Some(Vec::new());
                } else if let Some(instance) = current.as_mut() {
                    instance.push((name, String::new()));
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "Instance" {
                    out.push(Vec::new());
                } else if let Some(instance) = current.as_mut() {
                    instance.push((name, String::new()));
                }
            }
            Event::Text(t) => {
                if let Some(instance) = current.as_mut() {
                    if let Some(last) = instance.last_mut() {
                        last.1 = t
                            .unescape()
                            .map_err(|e| Error::parse(format!("bad table markup: {e}")))?
                            .into_owned();
                    }
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"Instance" {
                    if let Some(instance) = current.take() {
                        out.push(instance);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

/// Extract `watched` fields from one instance by adjacency.
///
/// A `ParaName` element whose text matches a watched name arms that
/// field; the next element visited (of any tag) is captured as its
/// value. Unknown names are skipped; absent fields stay empty.
fn scan_fields<const N: usize>(instance: &RawInstance, watched: [&str; N]) -> [String; N] {
    let mut captured: [String; N] = std::array::from_fn(|_| String::new());
    let mut pending: Option<usize> = None;
    for (tag, text) in instance {
        if let Some(slot) = pending.take() {
            captured[slot] = text.clone();
        }
        if tag == "ParaName" {
            pending = watched.iter().position(|name| *name == text.as_str());
        }
    }
    captured
}
