//! PipeWire core information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Core object details as printed by `pw-cli info 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreInfo {
    /// PipeWire object ID (always 0 for the core)
    pub id: u32,
    /// Interface type (e.g. "PipeWire:Interface:Core/4")
    pub kind: Option<String>,
    /// Server version
    pub version: Option<String>,
    /// Core name (e.g. "pipewire-0")
    pub name: Option<String>,
    /// Host the server runs on
    pub host_name: Option<String>,
    /// User owning the server
    pub user_name: Option<String>,
    /// All core properties
    pub properties: BTreeMap<String, String>,
}

impl CoreInfo {
    /// Look up a core property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
