//! PipeWire port records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All ports `pw-link` reports for one node.
///
/// Built fresh from every listing; the record has no identity beyond the
/// output it was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortGroup {
    /// Node name as printed before the first `:` of a port line
    pub tag: String,
    /// Underlying hardware path (e.g. "alsa:pcm:0:front:0:playback:0")
    pub device: String,
    /// Human-readable alias of the node
    pub name: String,
    /// Channel label per port ID (e.g. 56 -> "playback_FL")
    pub channels: BTreeMap<u32, String>,
}

impl PortGroup {
    /// Create an empty group for a node tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), ..Self::default() }
    }

    /// Find the port ID carrying a channel label.
    #[must_use]
    pub fn port_for_channel(&self, channel: &str) -> Option<u32> {
        self.channels.iter().find(|(_, ch)| ch.as_str() == channel).map(|(id, _)| *id)
    }

    /// Full `node:port` name accepted by `pw-link` for a port of this group.
    #[must_use]
    pub fn port_name(&self, id: u32) -> Option<String> {
        self.channels.get(&id).map(|ch| format!("{}:{ch}", self.tag))
    }

    /// Check if this group is backed by an ALSA device.
    #[must_use]
    pub fn is_hardware(&self) -> bool {
        self.device.starts_with("alsa:")
    }
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port (receives audio)
    Input,
    /// Output port (sends audio)
    Output,
}

impl PortDirection {
    /// The `pw-link` flag selecting ports of this direction.
    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Self::Input => "--input",
            Self::Output => "--output",
        }
    }
}
