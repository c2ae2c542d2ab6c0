//! PipeWire link records.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One active link as seen from a port in `pw-link --links` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveConnection {
    /// PipeWire object ID of the link
    pub link_id: u32,
    /// Port ID on the other end of the link
    pub peer_port_id: u32,
    /// Node tag on the other end of the link
    pub connected_tag: String,
    /// Channel label of the peer port
    pub channel: String,
}

/// Links keyed by local port ID, then by link ID.
pub type PortLinks = BTreeMap<u32, BTreeMap<u32, ActiveConnection>>;

/// Parsed result of a link listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTable {
    /// Output port ID -> links leaving it (`|->` lines)
    pub outgoing: PortLinks,
    /// Input port ID -> links arriving at it (`|<-` lines)
    pub incoming: PortLinks,
}

impl LinkTable {
    /// Every link ID present in the table.
    #[must_use]
    pub fn link_ids(&self) -> BTreeSet<u32> {
        self.outgoing
            .values()
            .chain(self.incoming.values())
            .flat_map(|links| links.keys().copied())
            .collect()
    }

    /// Number of distinct links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.link_ids().len()
    }

    /// Check if no links were listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outgoing.values().chain(self.incoming.values()).all(BTreeMap::is_empty)
    }

    /// Find the link between an output port and an input port, if any.
    #[must_use]
    pub fn find_link(&self, output_port: u32, input_port: u32) -> Option<u32> {
        self.outgoing.get(&output_port).and_then(|links| {
            links.values().find(|l| l.peer_port_id == input_port).map(|l| l.link_id)
        })
    }

    /// Compare against a newer listing.
    #[must_use]
    pub fn diff(&self, newer: &LinkTable) -> LinkChanges {
        let before = self.outgoing_by_id();
        let after = newer.outgoing_by_id();

        LinkChanges {
            added: after
                .iter()
                .filter(|(id, _)| !before.contains_key(*id))
                .map(|(_, link)| link.clone())
                .collect(),
            removed: before
                .iter()
                .filter(|(id, _)| !after.contains_key(*id))
                .map(|(_, link)| link.clone())
                .collect(),
        }
    }

    fn outgoing_by_id(&self) -> BTreeMap<u32, LinkEnd> {
        self.outgoing
            .iter()
            .flat_map(|(port, links)| {
                links.values().map(move |conn| {
                    (conn.link_id, LinkEnd { output_port: *port, connection: conn.clone() })
                })
            })
            .collect()
    }
}

/// A link together with the output port it leaves from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEnd {
    /// Output port ID
    pub output_port: u32,
    /// The link as listed under that port
    pub connection: ActiveConnection,
}

/// Links that appeared or disappeared between two listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkChanges {
    pub added: Vec<LinkEnd>,
    pub removed: Vec<LinkEnd>,
}

impl LinkChanges {
    /// Check if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
