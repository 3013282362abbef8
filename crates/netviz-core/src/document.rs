//! Topology document parsing with built-in sample fallback

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::device::{DeviceCategory, DeviceDescriptor, DeviceStatus};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A topology document as exported by a discovery backend.
///
/// Both the `models`/`devices` and `from,to`/`source,target` field
/// spellings are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, alias = "devices")]
    pub models: Vec<ModelRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

/// One device record in the document.
///
/// Every field is optional at the wire level; records missing the
/// required name or category are skipped during conversion, they do
/// not fail the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(default, alias = "id")]
    pub name: Option<String>,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    #[serde(default)]
    pub position: Option<PositionRecord>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub vlan: Option<String>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    /// Nested property bag used by some exporters; fills gaps in the
    /// top-level fields
    #[serde(default)]
    pub properties: Option<PropertiesRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertiesRecord {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub vlan: Option<String>,
}

/// Position as either `[x, y, z]` or `{ "x": .., "y": .., "z": .. }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionRecord {
    Array([f32; 3]),
    Object { x: f32, y: f32, z: f32 },
}

impl PositionRecord {
    pub fn to_array(&self) -> [f32; 3] {
        match *self {
            PositionRecord::Array(a) => a,
            PositionRecord::Object { x, y, z } => [x, y, z],
        }
    }
}

/// One connection record in the document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(default, alias = "source")]
    pub from: Option<String>,
    #[serde(default, alias = "target")]
    pub to: Option<String>,
    #[serde(default)]
    pub bandwidth: Option<f64>,
}

impl ModelRecord {
    /// Convert to a descriptor; `None` when the record is malformed
    /// (missing name or category)
    pub fn to_descriptor(&self) -> Option<DeviceDescriptor> {
        let name = self.name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        let category = DeviceCategory::parse(self.category.as_deref()?);

        let props = self.properties.clone().unwrap_or_default();
        Some(DeviceDescriptor {
            name: name.to_string(),
            display_name: self.display_name.clone(),
            category,
            mac: self.mac.clone().or(props.mac),
            position: self.position.as_ref().map(PositionRecord::to_array),
            ip: self.ip.clone().or(props.ip),
            status: self.status.as_deref().map(DeviceStatus::parse),
            model: self.model.clone().or(props.model),
            serial: self.serial.clone().or(props.serial),
            vlan: self.vlan.clone().or(props.vlan),
            last_seen: self.last_seen,
        })
    }
}

impl TopologyDocument {
    /// Parse a document from JSON text
    pub fn from_json(content: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Convert records to descriptors, skipping malformed ones.
    ///
    /// A single bad record never aborts the batch; it is logged and
    /// the remaining records are converted.
    pub fn descriptors(&self) -> Vec<DeviceDescriptor> {
        let mut out = Vec::with_capacity(self.models.len());
        for record in &self.models {
            match record.to_descriptor() {
                Some(desc) => out.push(desc),
                None => {
                    tracing::warn!(
                        name = record.name.as_deref().unwrap_or("<missing>"),
                        "Skipping malformed device record"
                    );
                }
            }
        }
        out
    }
}

/// Load a topology document, falling back to the built-in sample when
/// the file is missing or malformed. The scene is always populated.
pub fn load_or_sample(path: &Path) -> TopologyDocument {
    match std::fs::read_to_string(path) {
        Ok(content) => match TopologyDocument::from_json(&content) {
            Ok(doc) => {
                tracing::info!(
                    path = %path.display(),
                    devices = doc.models.len(),
                    connections = doc.connections.len(),
                    "Loaded topology document"
                );
                doc
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Malformed topology document, using sample topology");
                sample_topology()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Topology document not found, using sample topology");
            sample_topology()
        }
    }
}

/// Built-in sample topology: 5 devices, 4 connections
pub fn sample_topology() -> TopologyDocument {
    fn model(
        name: &str,
        display: &str,
        category: &str,
        ip: &str,
        model: Option<&str>,
    ) -> ModelRecord {
        ModelRecord {
            name: Some(name.to_string()),
            display_name: Some(display.to_string()),
            category: Some(category.to_string()),
            ip: Some(ip.to_string()),
            status: Some("online".to_string()),
            model: model.map(str::to_string),
            ..Default::default()
        }
    }

    fn link(from: &str, to: &str, bandwidth: f64) -> ConnectionRecord {
        ConnectionRecord {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            bandwidth: Some(bandwidth),
        }
    }

    let mut edge = model(
        "edge-firewall",
        "Edge Firewall",
        "firewall",
        "192.168.0.254",
        Some("FG-61E"),
    );
    edge.serial = Some("FG61E0000000001".to_string());

    let mut phone = model("guest-phone", "Guest Phone", "endpoint", "192.168.0.112", None);
    phone.mac = Some("8c:f5:a3:12:34:56".to_string());

    TopologyDocument {
        version: Some("2.0".to_string()),
        models: vec![
            edge,
            model("core-switch", "Core Switch", "switch", "192.168.0.2", Some("S124E")),
            model("office-ap", "Office AP", "access_point", "192.168.0.3", Some("AP-231F")),
            model("dev-laptop", "Dev Laptop", "endpoint", "192.168.0.101", None),
            phone,
        ],
        connections: vec![
            link("edge-firewall", "core-switch", 1000.0),
            link("core-switch", "office-ap", 1000.0),
            link("core-switch", "dev-laptop", 1000.0),
            link("office-ap", "guest-phone", 300.0),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exporter_format() {
        let json = r#"{
            "version": "2.0",
            "models": [
                {
                    "name": "fortigate_main",
                    "displayName": "FortiGate-61E",
                    "category": "firewall",
                    "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                    "properties": {"ip": "192.168.0.254", "serial": "FG6000"}
                }
            ],
            "connections": [
                {"source": "fortigate_main", "target": "sw_1", "bandwidth": 1000}
            ]
        }"#;
        let doc = TopologyDocument::from_json(json).unwrap();
        let descriptors = doc.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].category, DeviceCategory::Firewall);
        assert_eq!(descriptors[0].display_name.as_deref(), Some("FortiGate-61E"));
        assert_eq!(descriptors[0].ip.as_deref(), Some("192.168.0.254"));
        assert_eq!(descriptors[0].serial.as_deref(), Some("FG6000"));
        assert_eq!(descriptors[0].position, Some([0.0, 0.0, 0.0]));
        assert_eq!(doc.connections[0].from.as_deref(), Some("fortigate_main"));
        assert_eq!(doc.connections[0].to.as_deref(), Some("sw_1"));
    }

    #[test]
    fn test_parse_devices_alias_and_array_position() {
        let json = r#"{
            "devices": [
                {"name": "sw-1", "type": "switch", "position": [1.0, 2.0, 0.5]}
            ],
            "connections": [{"from": "a", "to": "b"}]
        }"#;
        let doc = TopologyDocument::from_json(json).unwrap();
        let descriptors = doc.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].category, DeviceCategory::Switch);
        assert_eq!(descriptors[0].position, Some([1.0, 2.0, 0.5]));
    }

    #[test]
    fn test_malformed_record_skipped_batch_continues() {
        let json = r#"{
            "models": [
                {"name": "fw-1", "category": "firewall"},
                {"name": "no-category-here"},
                {"category": "switch"},
                {"name": "sw-1", "category": "switch"}
            ]
        }"#;
        let doc = TopologyDocument::from_json(json).unwrap();
        let descriptors = doc.descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "fw-1");
        assert_eq!(descriptors[1].name, "sw-1");
    }

    #[test]
    fn test_unknown_category_is_not_malformed() {
        let json = r#"{"models": [{"name": "x", "category": "mainframe"}]}"#;
        let doc = TopologyDocument::from_json(json).unwrap();
        let descriptors = doc.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].category, DeviceCategory::Unknown);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_sample() {
        let doc = load_or_sample(Path::new("/nonexistent/topology.json"));
        assert_eq!(doc.models.len(), 5);
        assert_eq!(doc.connections.len(), 4);
    }

    #[test]
    fn test_load_malformed_file_falls_back_to_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.json");
        std::fs::write(&path, "{ not json").unwrap();

        let doc = load_or_sample(&path);
        assert_eq!(doc.models.len(), 5);
        assert_eq!(doc.connections.len(), 4);
    }

    #[test]
    fn test_sample_topology_is_valid() {
        let doc = sample_topology();
        let descriptors = doc.descriptors();
        assert_eq!(descriptors.len(), 5);
        // Every connection endpoint resolves against the sample devices
        for conn in &doc.connections {
            for end in [conn.from.as_deref().unwrap(), conn.to.as_deref().unwrap()] {
                assert!(descriptors.iter().any(|d| d.name == end), "unknown endpoint {end}");
            }
        }
    }
}
