//! Connection derivation: explicit lists and role-based inference

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::device::DeviceCategory;
use crate::document::ConnectionRecord;
use crate::registry::DeviceRegistry;

/// Role tiers joined by the inferred topology, upstream first
const ROLE_CHAIN: [DeviceCategory; 5] = [
    DeviceCategory::Firewall,
    DeviceCategory::Router,
    DeviceCategory::Switch,
    DeviceCategory::AccessPoint,
    DeviceCategory::Endpoint,
];

/// An unordered link between two registered devices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub bandwidth: Option<f64>,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            bandwidth: None,
        }
    }

    /// Direction-independent identity
    pub fn key(&self) -> (String, String) {
        if self.from <= self.to {
            (self.from.clone(), self.to.clone())
        } else {
            (self.to.clone(), self.from.clone())
        }
    }

    pub fn touches(&self, name: &str) -> bool {
        self.from == name || self.to == name
    }
}

/// Resolve explicit connection records against the registry.
///
/// Pairs referencing an unknown device name are skipped and logged,
/// never fatal; duplicates (in either direction) collapse to one
/// link. The returned count reflects only the valid pairs.
pub fn resolve_connections(
    records: &[ConnectionRecord],
    registry: &DeviceRegistry,
) -> Vec<Connection> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for record in records {
        let (Some(from), Some(to)) = (record.from.as_deref(), record.to.as_deref()) else {
            tracing::warn!("Skipping connection with missing endpoint name");
            continue;
        };
        if from == to {
            tracing::warn!(name = from, "Skipping self-connection");
            continue;
        }
        if !registry.contains(from) || !registry.contains(to) {
            tracing::warn!(from, to, "Skipping connection with unknown endpoint");
            continue;
        }

        let connection = Connection {
            from: from.to_string(),
            to: to.to_string(),
            bandwidth: record.bandwidth,
        };
        if seen.insert(connection.key()) {
            out.push(connection);
        }
    }

    out
}

/// Derive a topology from device roles: a complete bipartite join
/// between each adjacent pair of role tiers (firewalls to switches,
/// switches to access points, ...). Empty tiers are bridged so the
/// graph stays connected on sparse topologies; unknown-category
/// devices are left unlinked.
pub fn infer_connections(registry: &DeviceRegistry) -> Vec<Connection> {
    let tiers: Vec<Vec<&str>> = ROLE_CHAIN
        .iter()
        .map(|&category| {
            registry
                .by_category(category)
                .map(|e| e.descriptor.name.as_str())
                .collect::<Vec<_>>()
        })
        .filter(|tier| !tier.is_empty())
        .collect();

    let mut out = Vec::new();
    for pair in tiers.windows(2) {
        for &upstream in &pair[0] {
            for &downstream in &pair[1] {
                out.push(Connection::new(upstream, downstream));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceDescriptor;

    fn registry_with(devices: &[(&str, DeviceCategory)]) -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        registry.load(
            devices
                .iter()
                .map(|(name, category)| DeviceDescriptor::new(*name, *category))
                .collect(),
        );
        registry
    }

    fn record(from: &str, to: &str) -> ConnectionRecord {
        ConnectionRecord {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            bandwidth: None,
        }
    }

    #[test]
    fn test_resolve_skips_unknown_endpoints() {
        let registry = registry_with(&[
            ("fw-1", DeviceCategory::Firewall),
            ("sw-1", DeviceCategory::Switch),
        ]);
        let records = vec![
            record("fw-1", "sw-1"),
            record("fw-1", "ghost"),
            record("ghost", "sw-1"),
        ];
        let connections = resolve_connections(&records, &registry);
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].from, "fw-1");
        assert_eq!(connections[0].to, "sw-1");
    }

    #[test]
    fn test_resolve_collapses_duplicates_and_self_links() {
        let registry = registry_with(&[
            ("a", DeviceCategory::Switch),
            ("b", DeviceCategory::Switch),
        ]);
        let records = vec![record("a", "b"), record("b", "a"), record("a", "a")];
        let connections = resolve_connections(&records, &registry);
        assert_eq!(connections.len(), 1);
    }

    #[test]
    fn test_infer_bipartite_join() {
        let registry = registry_with(&[
            ("fw-1", DeviceCategory::Firewall),
            ("sw-1", DeviceCategory::Switch),
            ("sw-2", DeviceCategory::Switch),
            ("ap-1", DeviceCategory::AccessPoint),
        ]);
        let connections = infer_connections(&registry);
        // 1 firewall x 2 switches + 2 switches x 1 access point
        assert_eq!(connections.len(), 4);
        assert!(connections.contains(&Connection::new("fw-1", "sw-1")));
        assert!(connections.contains(&Connection::new("fw-1", "sw-2")));
        assert!(connections.contains(&Connection::new("sw-1", "ap-1")));
        assert!(connections.contains(&Connection::new("sw-2", "ap-1")));
    }

    #[test]
    fn test_infer_bridges_empty_tiers() {
        // No switch tier: firewalls connect straight to access points
        let registry = registry_with(&[
            ("fw-1", DeviceCategory::Firewall),
            ("ap-1", DeviceCategory::AccessPoint),
            ("ap-2", DeviceCategory::AccessPoint),
        ]);
        let connections = infer_connections(&registry);
        assert_eq!(connections.len(), 2);
        assert!(connections.contains(&Connection::new("fw-1", "ap-1")));
        assert!(connections.contains(&Connection::new("fw-1", "ap-2")));
    }

    #[test]
    fn test_infer_leaves_unknown_unlinked() {
        let registry = registry_with(&[
            ("fw-1", DeviceCategory::Firewall),
            ("sw-1", DeviceCategory::Switch),
            ("odd", DeviceCategory::Unknown),
        ]);
        let connections = infer_connections(&registry);
        assert!(!connections.iter().any(|c| c.touches("odd")));
    }

    #[test]
    fn test_connection_key_is_unordered() {
        assert_eq!(
            Connection::new("a", "b").key(),
            Connection::new("b", "a").key()
        );
    }
}
