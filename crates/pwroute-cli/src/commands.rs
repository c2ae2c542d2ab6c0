//! One-shot commands and their text output.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use pwroute_pipewire::{
    CommandRunner, CoreInfo, LinkChanges, LinkEnd, LinkTable, PipeWire, PortDirection, PortGroup,
};
use serde::Serialize;
use tracing::debug;

/// Check that the PipeWire tools work.
pub fn check<R: CommandRunner>(pw: &PipeWire<R>) -> Result<()> {
    if !pw.check_installed() {
        bail!("PipeWire tools are not available (need pw-cli and pw-link and a running server)");
    }
    println!("PipeWire tools available");
    Ok(())
}

/// Print core information.
pub fn info<R: CommandRunner>(pw: &PipeWire<R>, raw: bool, json: bool) -> Result<()> {
    if raw {
        println!("{}", pw.info_raw().context("Failed to query PipeWire core")?);
        return Ok(());
    }

    let info = pw.core_info().context("Failed to query PipeWire core")?;
    if json {
        return print_json(&info);
    }
    print!("{}", format_core_info(&info));
    Ok(())
}

/// Print ports of one direction.
pub fn ports<R: CommandRunner>(pw: &PipeWire<R>, direction: PortDirection, json: bool) -> Result<()> {
    let groups = pw
        .list_ports(direction)
        .with_context(|| format!("Failed to list {direction:?} ports"))?;
    debug!(count = groups.len(), "Printing port groups");

    if json {
        return print_json(&groups);
    }
    print!("{}", format_ports(&groups));
    Ok(())
}

/// Print active links.
pub fn links<R: CommandRunner>(pw: &PipeWire<R>, json: bool) -> Result<()> {
    let table = pw.list_links().context("Failed to list links")?;

    if json {
        return print_json(&table);
    }
    print!("{}", format_links(&table));
    Ok(())
}

/// Link an output port to an input port unless they are already linked.
pub fn link<R: CommandRunner>(pw: &PipeWire<R>, output: &str, input: &str) -> Result<()> {
    let outputs = pw.list_outputs().context("Failed to list output ports")?;
    let inputs = pw.list_inputs().context("Failed to list input ports")?;

    if let (Some(out_id), Some(in_id)) = (resolve_port(&outputs, output), resolve_port(&inputs, input)) {
        let links = pw.list_links().context("Failed to list links")?;
        if let Some(link_id) = links.find_link(out_id, in_id) {
            println!(
                "Already linked: {} -> {} (link {link_id})",
                port_label(&outputs, out_id),
                port_label(&inputs, in_id)
            );
            return Ok(());
        }
    }

    pw.link(output, input).with_context(|| format!("Failed to link {output} to {input}"))?;
    println!("Linked {output} -> {input}");
    Ok(())
}

/// Resolve a port given as an ID or a `node:channel` name.
///
/// Ports that are not in the listing resolve to `None` and are left for
/// `pw-link` to judge.
fn resolve_port(groups: &BTreeMap<String, PortGroup>, port: &str) -> Option<u32> {
    if let Ok(id) = port.parse::<u32>() {
        return groups.values().any(|g| g.channels.contains_key(&id)).then_some(id);
    }
    let (tag, channel) = port.split_once(':')?;
    groups.get(tag)?.port_for_channel(channel)
}

fn port_label(groups: &BTreeMap<String, PortGroup>, id: u32) -> String {
    groups.values().find_map(|g| g.port_name(id)).unwrap_or_else(|| id.to_string())
}

/// Remove a link.
pub fn unlink<R: CommandRunner>(pw: &PipeWire<R>, link_id: u32) -> Result<()> {
    pw.unlink(link_id).with_context(|| format!("Failed to remove link {link_id}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to encode JSON")?);
    Ok(())
}

/// Render port groups, one block per node.
pub fn format_ports(groups: &BTreeMap<String, PortGroup>) -> String {
    let mut out = String::new();
    for group in groups.values() {
        let _ = write!(out, "{}", group.tag);
        if !group.name.is_empty() {
            let _ = write!(out, " ({})", group.name);
        }
        if group.is_hardware() {
            out.push_str(" [hardware]");
        }
        out.push('\n');
        if !group.device.is_empty() {
            let _ = writeln!(out, "    device: {}", group.device);
        }
        for (id, channel) in &group.channels {
            let _ = writeln!(out, "  {id:>5}  {channel}");
        }
    }
    out
}

/// Render links leaving each output port.
pub fn format_links(table: &LinkTable) -> String {
    let mut out = String::new();
    for (port, links) in &table.outgoing {
        for conn in links.values() {
            let _ = writeln!(
                out,
                "{:>5}  {port:>5} -> {:>5} {}:{}",
                conn.link_id, conn.peer_port_id, conn.connected_tag, conn.channel
            );
        }
    }
    out
}

/// Render link changes as `+`/`-` lines.
pub fn format_changes(changes: &LinkChanges) -> Vec<String> {
    let line = |sign: char, end: &LinkEnd| {
        let conn = &end.connection;
        format!(
            "{sign} link {}: {} -> {} {}:{}",
            conn.link_id, end.output_port, conn.peer_port_id, conn.connected_tag, conn.channel
        )
    };

    changes
        .removed
        .iter()
        .map(|end| line('-', end))
        .chain(changes.added.iter().map(|end| line('+', end)))
        .collect()
}

fn format_core_info(info: &CoreInfo) -> String {
    let mut out = String::new();
    let fields = [
        ("name", &info.name),
        ("version", &info.version),
        ("type", &info.kind),
        ("host", &info.host_name),
        ("user", &info.user_name),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "{label:>8}: {value}");
        }
    }
    if let Some(rate) = info.property("default.clock.rate") {
        let _ = writeln!(out, "{:>8}: {rate} Hz", "rate");
    }
    let _ = writeln!(out, "{:>8}: {}", "props", info.properties.len());
    out
}
