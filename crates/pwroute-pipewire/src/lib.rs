//! pwroute PipeWire - port listing, linking and graph watching.
//!
//! This crate drives the PipeWire command-line tools instead of linking
//! against libpipewire:
//! - `pw-link` to list ports and links and to create or remove links
//! - `pw-cli` to check the server and read core information
//! - `pw-mon` to watch the graph for changes

pub mod client;
pub mod error;
pub mod info;
pub mod link;
pub mod monitor;
pub mod parse;
pub mod port;
pub mod runner;

pub use client::{PipeWire, ToolPaths};
pub use error::{PwError, PwResult};
pub use info::CoreInfo;
pub use link::{ActiveConnection, LinkChanges, LinkEnd, LinkTable};
pub use monitor::GraphWatcher;
pub use port::{PortDirection, PortGroup};
pub use runner::{CommandRunner, SystemRunner};
