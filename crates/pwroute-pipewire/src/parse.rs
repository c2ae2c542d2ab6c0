//! Scanners for the text printed by `pw-link` and `pw-cli`.
//!
//! `pw-link --id` prints every port as `%4d node:port`, so the ID sits in
//! the first five columns while detail lines are indented further. The
//! scanners rely on that layout and stop at the first blank line.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PwError, PwResult};
use crate::info::CoreInfo;
use crate::link::{ActiveConnection, LinkTable};
use crate::port::PortGroup;

/// `  47 alsa_output.pci-0000_00_1f.3.analog-stereo:playback_FL`
static PORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,4}(\d+)\s+(\S.*)$").expect("port line pattern"));

/// ` 104   |->   47 alsa_output.pci-0000_00_1f.3.analog-stereo:playback_FL`
static LINK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s{0,4}(\d+)\s+\|(->|<-)\s*(\d+)\s+(\S.*)$").expect("link line pattern")
});

/// Parse `pw-link --input|--output --verbose --id` output into groups keyed by node tag.
///
/// The first indented line under a port is its device path; later lines
/// are `alias:channel`. A port without an alias keeps the channel from
/// its own `node:port` name.
pub fn parse_ports(output: &str) -> PwResult<BTreeMap<String, PortGroup>> {
    let mut groups: BTreeMap<String, PortGroup> = BTreeMap::new();
    let mut current: Option<(String, u32)> = None;
    let mut detail_lines = 0;

    for (idx, line) in output.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            break;
        }

        if let Some(caps) = PORT_LINE.captures(line) {
            let id = parse_id(&caps[1], line_no, line)?;
            let (tag, port) = split_tag(&caps[2]);

            let group = groups.entry(tag.to_string()).or_insert_with(|| PortGroup::new(tag));
            if let Some(port) = port {
                group.channels.insert(id, port.to_string());
            }

            current = Some((tag.to_string(), id));
            detail_lines = 0;
            continue;
        }

        let Some((tag, id)) = &current else {
            return Err(PwError::parse(line_no, line, "detail line before any port"));
        };
        let Some(group) = groups.get_mut(tag) else {
            return Err(PwError::parse(line_no, line, "detail line for unknown port"));
        };

        detail_lines += 1;
        let detail = line.trim();

        if detail_lines == 1 {
            group.device = detail.to_string();
        } else {
            let (name, channel) = detail
                .rsplit_once(':')
                .ok_or_else(|| PwError::parse(line_no, line, "expected alias:channel"))?;
            group.name = name.to_string();
            group.channels.insert(*id, channel.to_string());
        }
    }

    Ok(groups)
}

/// Parse `pw-link --links --id` output.
pub fn parse_links(output: &str) -> PwResult<LinkTable> {
    let mut table = LinkTable::default();
    let mut current: Option<u32> = None;

    for (idx, line) in output.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            break;
        }

        if let Some(caps) = LINK_LINE.captures(line) {
            let port = current.ok_or_else(|| PwError::parse(line_no, line, "link before its port"))?;
            let link_id = parse_id(&caps[1], line_no, line)?;
            let peer_port_id = parse_id(&caps[3], line_no, line)?;
            let (tag, channel) = caps[4]
                .split_once(':')
                .ok_or_else(|| PwError::parse(line_no, line, "expected node:port"))?;

            let links = if &caps[2] == "->" { &mut table.outgoing } else { &mut table.incoming };
            links.entry(port).or_default().insert(
                link_id,
                ActiveConnection {
                    link_id,
                    peer_port_id,
                    connected_tag: tag.to_string(),
                    channel: channel.to_string(),
                },
            );
        } else if line.contains("|->") || line.contains("|<-") {
            return Err(PwError::parse(line_no, line, "malformed link line"));
        } else if let Some(caps) = PORT_LINE.captures(line) {
            current = Some(parse_id(&caps[1], line_no, line)?);
        } else {
            return Err(PwError::parse(line_no, line, "expected a port or link line"));
        }
    }

    Ok(table)
}

/// Parse `pw-cli info 0` output.
///
/// Lines may carry a leading `*` marking fields that changed since the
/// last update; it is ignored. Unrecognised lines are skipped.
pub fn parse_core_info(output: &str) -> PwResult<CoreInfo> {
    let mut info = CoreInfo::default();
    let mut seen_id = false;

    for (idx, line) in output.lines().enumerate() {
        let entry = line.trim_start_matches('*').trim();
        if entry.is_empty() {
            continue;
        }

        if let Some((key, value)) = entry.split_once(" = ") {
            info.properties.insert(key.trim().to_string(), unquote(value).to_string());
            continue;
        }

        let Some((key, value)) = entry.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        let field = match key.trim() {
            "id" => {
                info.id = parse_id(value, idx + 1, line)?;
                seen_id = true;
                continue;
            }
            "type" => &mut info.kind,
            "version" => &mut info.version,
            "name" => &mut info.name,
            "host-name" => &mut info.host_name,
            "user-name" => &mut info.user_name,
            _ => continue,
        };
        *field = Some(value.to_string());
    }

    if !seen_id {
        return Err(PwError::parse(0, output.lines().next().unwrap_or_default(), "missing id"));
    }
    Ok(info)
}

fn parse_id(digits: &str, line_no: usize, line: &str) -> PwResult<u32> {
    digits.parse().map_err(|_| PwError::parse(line_no, line, "object id out of range"))
}

/// Split `node:port` at the first colon.
fn split_tag(name: &str) -> (&str, Option<&str>) {
    match name.split_once(':') {
        Some((tag, port)) => (tag, Some(port)),
        None => (name, None),
    }
}

fn unquote(value: &str) -> &str {
    value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value)
}
