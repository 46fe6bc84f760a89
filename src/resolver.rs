// Interface discovery: groups a host's traffic-counter items by interface name.
//
// Direction and name are both derived from item naming conventions, so the
// rules live in tables below; new naming schemes are added there.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::models::{Direction, Interface, ItemRef};
use crate::source::{HistoryChannel, MetricsSource, MonitoredItem, SourceError};

/// Item key searches sent to the source: agent/SNMP keys under `net.if`, and
/// standalone SNMP counter keys (`ifHCInOctets.7`). Results are merged by item id.
pub const TRAFFIC_KEY_PATTERNS: &[&str] = &["net.if", "Octets"];

/// Ordered (key substring, direction) rules; first match wins.
///
/// Covers the generic agent scheme (`net.if.in[eth0]`) and the SNMP counter
/// scheme (`net.if.in[ifHCInOctets.2]`, `ifInOctets.2`). The trailing `[`
/// keeps `net.if.in.errors[...]` and `net.if.in.discards[...]` out.
pub const DIRECTION_RULES: &[(&str, Direction)] = &[
    ("net.if.in[", Direction::Download),
    ("InOctets", Direction::Download),
    ("net.if.out[", Direction::Upload),
    ("OutOctets", Direction::Upload),
];

/// SNMP counter prefixes stripped from a key parameter to get the interface index.
const COUNTER_PREFIXES: &[&str] = &[
    "ifHCInOctets.",
    "ifHCOutOctets.",
    "ifInOctets.",
    "ifOutOctets.",
];

/// Display names look like `Interface eth0(WAN): Bits received`.
const NAME_PREFIX: &str = "Interface ";

/// Direction of a traffic item, or `None` if the key is not a byte/bit counter.
pub fn classify_key(key: &str) -> Option<Direction> {
    if !counts_bytes(key) {
        return None;
    }
    DIRECTION_RULES
        .iter()
        .find(|(pattern, _)| key.contains(pattern))
        .map(|(_, direction)| *direction)
}

/// Agent keys take an optional mode (`net.if.in[eth0,packets]`); only byte counters are traffic.
fn counts_bytes(key: &str) -> bool {
    match key_params(key).get(1).map(|m| m.trim()) {
        None | Some("") | Some("bytes") => true,
        Some(_) => false,
    }
}

fn key_params(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return Vec::new();
    };
    let inner = &key[open + 1..];
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner.split(',').map(|p| p.trim_matches('"')).collect()
}

/// Interface name for an item: from the display name when it follows the
/// `Interface <name>(...)` / `Interface <name>: <metric>` convention, else from
/// the key's first parameter with any SNMP counter prefix removed.
///
/// The name ends at the first `(`, or without one at the last `": "`, so
/// channelized names such as `Serial0/0/0:1` stay intact.
pub fn interface_name(display_name: &str, key: &str) -> Option<String> {
    if let Some(pos) = display_name.rfind(NAME_PREFIX) {
        let rest = &display_name[pos + NAME_PREFIX.len()..];
        let end = rest
            .find('(')
            .or_else(|| rest.rfind(": "))
            .unwrap_or(rest.len());
        let name = rest[..end].trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    // Bare SNMP keys (`ifHCInOctets.7`) carry the index after the counter prefix.
    let Some(first) = key_params(key).into_iter().next() else {
        let index = COUNTER_PREFIXES
            .iter()
            .find_map(|prefix| key.trim().strip_prefix(prefix))?;
        return (!index.is_empty()).then(|| index.to_string());
    };
    let first = first.trim();
    let name = COUNTER_PREFIXES
        .iter()
        .find_map(|prefix| first.strip_prefix(prefix))
        .unwrap_or(first);
    (!name.is_empty()).then(|| name.to_string())
}

/// Groups items into interfaces. Items that are not traffic counters, have no
/// derivable name, or have a non-numeric value type are skipped. When two
/// items claim the same interface and direction the first one listed wins.
pub fn build_interfaces(items: &[MonitoredItem]) -> BTreeMap<String, Interface> {
    let mut interfaces: BTreeMap<String, Interface> = BTreeMap::new();
    for item in items {
        let Some(direction) = classify_key(&item.key) else {
            continue;
        };
        let Ok(channel) = HistoryChannel::try_from(item.value_type) else {
            debug!(item_id = %item.item_id, value_type = item.value_type, "skipping non-numeric traffic item");
            continue;
        };
        let Some(name) = interface_name(&item.display_name, &item.key) else {
            debug!(item_id = %item.item_id, key = %item.key, "no interface name in item");
            continue;
        };
        let slot = interfaces
            .entry(name.clone())
            .or_insert_with(|| Interface::new(name))
            .slot_mut(direction);
        if slot.is_none() {
            *slot = Some(ItemRef {
                item_id: item.item_id.clone(),
                name: item.display_name.clone(),
                key: item.key.clone(),
                channel,
            });
        }
    }
    interfaces
}

/// Discover the interfaces on `host_id`. A blank host id yields an empty map.
#[instrument(skip(source), fields(operation = "resolve_interfaces"))]
pub async fn resolve_interfaces(
    source: &dyn MetricsSource,
    host_id: &str,
) -> Result<BTreeMap<String, Interface>, SourceError> {
    if host_id.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let mut items: Vec<MonitoredItem> = Vec::new();
    for pattern in TRAFFIC_KEY_PATTERNS {
        for item in source.list_items(host_id, pattern).await? {
            if !items.iter().any(|i| i.item_id == item.item_id) {
                items.push(item);
            }
        }
    }
    let interfaces = build_interfaces(&items);
    debug!(
        items = items.len(),
        interfaces = interfaces.len(),
        "interfaces resolved"
    );
    Ok(interfaces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_both_naming_schemes() {
        assert_eq!(classify_key("net.if.in[eth0]"), Some(Direction::Download));
        assert_eq!(classify_key("net.if.out[eth0]"), Some(Direction::Upload));
        assert_eq!(
            classify_key("net.if.in[ifHCInOctets.2]"),
            Some(Direction::Download)
        );
        assert_eq!(
            classify_key("net.if.out[ifHCOutOctets.2]"),
            Some(Direction::Upload)
        );
        assert_eq!(classify_key("ifInOctets.7"), Some(Direction::Download));
        assert_eq!(classify_key("ifHCOutOctets.7"), Some(Direction::Upload));
    }

    #[test]
    fn ignores_non_traffic_counters() {
        assert_eq!(classify_key("net.if.in.errors[ifInErrors.2]"), None);
        assert_eq!(classify_key("net.if.out.discards[ifOutDiscards.2]"), None);
        assert_eq!(classify_key("net.if.in[eth0,packets]"), None);
        assert_eq!(classify_key("net.if.speed[ifHighSpeed.2]"), None);
        assert_eq!(
            classify_key("net.if.in[eth0,bytes]"),
            Some(Direction::Download)
        );
    }

    #[test]
    fn name_from_display_name() {
        assert_eq!(
            interface_name("Interface enp0s3(): Bits received", "net.if.in[x]").as_deref(),
            Some("enp0s3")
        );
        assert_eq!(
            interface_name("Interface Gi0/1(uplink): Bits sent", "net.if.out[x]").as_deref(),
            Some("Gi0/1")
        );
        assert_eq!(
            interface_name("Interface eth1: Incoming network traffic", "net.if.in[x]").as_deref(),
            Some("eth1")
        );
    }

    #[test]
    fn channelized_names_keep_their_suffix() {
        assert_eq!(
            interface_name("Interface Serial0/0/0:1(T1-B): Bits received", "net.if.in[x]").as_deref(),
            Some("Serial0/0/0:1")
        );
        assert_eq!(
            interface_name("Interface Serial0/0/0:0: Bits sent", "net.if.out[x]").as_deref(),
            Some("Serial0/0/0:0")
        );
    }

    #[test]
    fn name_falls_back_to_key_parameter() {
        assert_eq!(
            interface_name("Bits received", "net.if.in[ifHCInOctets.2]").as_deref(),
            Some("2")
        );
        assert_eq!(
            interface_name("Incoming traffic", "net.if.in[\"eth0\",bytes]").as_deref(),
            Some("eth0")
        );
        assert_eq!(interface_name("Traffic", "net.if.in"), None);
        assert_eq!(interface_name("Bits received", "ifHCInOctets.7").as_deref(), Some("7"));
        assert_eq!(interface_name("Bits received", "ifInOctets."), None);
    }
}
