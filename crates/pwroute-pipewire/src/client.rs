//! High-level operations on the PipeWire graph.
//!
//! Every call spawns one of the PipeWire command-line tools and parses
//! what it prints. Nothing is cached between calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PwResult;
use crate::info::CoreInfo;
use crate::link::LinkTable;
use crate::parse::{parse_core_info, parse_links, parse_ports};
use crate::port::{PortDirection, PortGroup};
use crate::runner::{CommandRunner, SystemRunner};

/// Locations of the PipeWire tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// `pw-link` binary
    pub pw_link: String,
    /// `pw-cli` binary
    pub pw_cli: String,
    /// `pw-mon` binary
    pub pw_mon: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            pw_link: "pw-link".to_string(),
            pw_cli: "pw-cli".to_string(),
            pw_mon: "pw-mon".to_string(),
        }
    }
}

/// Client for the PipeWire command-line tools.
pub struct PipeWire<R = SystemRunner> {
    runner: R,
    tools: ToolPaths,
}

impl PipeWire<SystemRunner> {
    /// Create a client using the tools found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(SystemRunner::new(), ToolPaths::default())
    }
}

impl Default for PipeWire<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> PipeWire<R> {
    /// Create a client with a custom runner and tool locations.
    #[must_use]
    pub fn with_runner(runner: R, tools: ToolPaths) -> Self {
        Self { runner, tools }
    }

    /// Tool locations used by this client.
    #[must_use]
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Check that the tools are installed and the server answers.
    ///
    /// Any failure, including a missing binary, reports `false`. Only the
    /// exit status counts; what the probes print is not inspected.
    pub fn check_installed(&self) -> bool {
        let checks = [
            ("which", vec![self.tools.pw_cli.clone()]),
            ("which", vec![self.tools.pw_link.clone()]),
            (self.tools.pw_cli.as_str(), core_info_args()),
        ];

        for (program, args) in &checks {
            if let Err(e) = self.runner.run(program, args) {
                warn!(program, error = %e, "PipeWire check failed");
                return false;
            }
        }

        debug!("PipeWire tools available");
        true
    }

    /// List input ports grouped by node tag.
    pub fn list_inputs(&self) -> PwResult<BTreeMap<String, PortGroup>> {
        self.list_ports(PortDirection::Input)
    }

    /// List output ports grouped by node tag.
    pub fn list_outputs(&self) -> PwResult<BTreeMap<String, PortGroup>> {
        self.list_ports(PortDirection::Output)
    }

    /// List ports of one direction grouped by node tag.
    pub fn list_ports(&self, direction: PortDirection) -> PwResult<BTreeMap<String, PortGroup>> {
        let output = self.pw_link(&[direction.flag(), "--verbose", "--id"])?;
        let groups = parse_ports(&output)?;
        debug!(?direction, count = groups.len(), "Listed ports");
        Ok(groups)
    }

    /// List active links.
    pub fn list_links(&self) -> PwResult<LinkTable> {
        let output = self.pw_link(&["--links", "--id"])?;
        let table = parse_links(&output)?;
        debug!(count = table.len(), "Listed links");
        Ok(table)
    }

    /// Link an output port to an input port.
    ///
    /// Ports are given as IDs or `node:port` names. The link lingers after
    /// this process exits.
    pub fn link(&self, output: &str, input: &str) -> PwResult<()> {
        self.pw_link(&["--linger", output, input])?;
        info!(output, input, "Linked ports");
        Ok(())
    }

    /// Remove a link by ID.
    pub fn unlink(&self, link_id: u32) -> PwResult<()> {
        self.pw_link(&["--disconnect", &link_id.to_string()])?;
        info!(link_id, "Removed link");
        Ok(())
    }

    /// Raw `pw-cli info 0` text.
    pub fn info_raw(&self) -> PwResult<String> {
        self.runner.run(&self.tools.pw_cli, &core_info_args())
    }

    /// Parsed core information.
    pub fn core_info(&self) -> PwResult<CoreInfo> {
        parse_core_info(&self.info_raw()?)
    }

    fn pw_link(&self, args: &[&str]) -> PwResult<String> {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.runner.run(&self.tools.pw_link, &args)
    }
}

fn core_info_args() -> Vec<String> {
    vec!["info".to_string(), "0".to_string()]
}
