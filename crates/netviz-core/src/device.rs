//! Device descriptors and category/endpoint classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role a device plays in the network topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Firewall,
    Router,
    Switch,
    AccessPoint,
    Endpoint,
    Unknown,
}

impl DeviceCategory {
    /// All categories in upstream-to-downstream order
    pub const ALL: [DeviceCategory; 6] = [
        DeviceCategory::Firewall,
        DeviceCategory::Router,
        DeviceCategory::Switch,
        DeviceCategory::AccessPoint,
        DeviceCategory::Endpoint,
        DeviceCategory::Unknown,
    ];

    /// Parse a category string from a topology document.
    ///
    /// Total: unrecognized strings map to `Unknown`, never an error.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "firewall" => Self::Firewall,
            "router" | "gateway" => Self::Router,
            "switch" => Self::Switch,
            "access_point" | "accesspoint" | "ap" => Self::AccessPoint,
            "endpoint" | "device" | "host" => Self::Endpoint,
            _ => Self::Unknown,
        }
    }

    /// Stable key used for asset manifest lookups
    pub fn key(&self) -> &'static str {
        match self {
            Self::Firewall => "firewall",
            Self::Router => "router",
            Self::Switch => "switch",
            Self::AccessPoint => "access_point",
            Self::Endpoint => "endpoint",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label for UI display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Firewall => "Firewall",
            Self::Router => "Router",
            Self::Switch => "Switch",
            Self::AccessPoint => "Access Point",
            Self::Endpoint => "Endpoint",
            Self::Unknown => "Unknown",
        }
    }
}

/// Current status of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// Device is online and responding
    Online,
    /// Device was seen but is not currently responding
    Offline,
    /// Device status is unknown
    #[default]
    Unknown,
}

impl DeviceStatus {
    /// Parse a status string from a topology document (total)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "online" | "up" | "connected" => Self::Online,
            "offline" | "down" | "disconnected" => Self::Offline,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }
}

/// Shape class for endpoint devices, derived from descriptor hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Desktop,
    Laptop,
    Mobile,
}

/// MAC vendor prefixes with a known device class.
///
/// Prefix match is checked before name keywords; coverage is
/// intentionally small, unmatched prefixes fall through.
const VENDOR_PREFIXES: [(&str, EndpointKind); 7] = [
    ("f0:18:98", EndpointKind::Laptop),  // Apple
    ("a4:83:e7", EndpointKind::Laptop),  // Apple
    ("d8:bb:2c", EndpointKind::Mobile),  // Apple
    ("8c:f5:a3", EndpointKind::Mobile),  // Samsung
    ("d4:be:d9", EndpointKind::Desktop), // Dell
    ("b8:27:eb", EndpointKind::Desktop), // Raspberry Pi
    ("00:50:56", EndpointKind::Desktop), // VMware
];

/// Classify an endpoint device from its descriptor hints.
///
/// Priority: hardware-address vendor prefix, then name keywords, then
/// `Desktop`. Deterministic and total.
pub fn detect_endpoint_kind(name: &str, mac: Option<&str>) -> EndpointKind {
    if let Some(mac) = mac {
        let mac = mac.to_lowercase();
        for (prefix, kind) in VENDOR_PREFIXES {
            if mac.starts_with(prefix) {
                return kind;
            }
        }
    }

    let name = name.to_lowercase();
    for keyword in ["laptop", "notebook", "macbook"] {
        if name.contains(keyword) {
            return EndpointKind::Laptop;
        }
    }
    for keyword in ["desktop", "pc", "tower"] {
        if name.contains(keyword) {
            return EndpointKind::Desktop;
        }
    }
    for keyword in ["phone", "mobile", "iphone", "android"] {
        if name.contains(keyword) {
            return EndpointKind::Mobile;
        }
    }

    EndpointKind::Desktop
}

/// A device as described by the topology document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Unique key across the registry
    pub name: String,
    /// Human-readable name shown on labels and in the detail panel
    pub display_name: Option<String>,
    pub category: DeviceCategory,
    /// Hardware address (endpoint classification hint)
    pub mac: Option<String>,
    /// Explicit position; auto-layout applies when absent
    pub position: Option<[f32; 3]>,
    pub ip: Option<String>,
    pub status: Option<DeviceStatus>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub vlan: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>, category: DeviceCategory) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            category,
            mac: None,
            position: None,
            ip: None,
            status: None,
            model: None,
            serial: None,
            vlan: None,
            last_seen: None,
        }
    }

    /// Label text: display name when present, else the unique name
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Endpoint shape class; meaningful for `Endpoint` devices, where
    /// the classifier inspects the display name and hardware address
    pub fn endpoint_kind(&self) -> EndpointKind {
        detect_endpoint_kind(self.label(), self.mac.as_deref())
    }

    /// Check if the device has not been seen recently
    pub fn is_stale(&self, timeout_secs: i64) -> bool {
        match self.last_seen {
            Some(seen) => (Utc::now() - seen).num_seconds() > timeout_secs,
            None => false,
        }
    }

    /// Detail rows for the click payload: present fields only, in
    /// display order. Name and category are carried separately.
    pub fn detail_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(ip) = &self.ip {
            fields.push(("IP", ip.clone()));
        }
        if let Some(status) = &self.status {
            fields.push(("Status", status.label().to_string()));
        }
        if let Some(model) = &self.model {
            fields.push(("Model", model.clone()));
        }
        if let Some(serial) = &self.serial {
            fields.push(("Serial", serial.clone()));
        }
        if let Some(vlan) = &self.vlan {
            fields.push(("VLAN", vlan.clone()));
        }
        if let Some(mac) = &self.mac {
            fields.push(("MAC", mac.clone()));
        }
        if let Some(seen) = &self.last_seen {
            fields.push(("Last seen", seen.to_rfc3339()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_known_and_unknown() {
        assert_eq!(DeviceCategory::parse("firewall"), DeviceCategory::Firewall);
        assert_eq!(DeviceCategory::parse("Access_Point"), DeviceCategory::AccessPoint);
        assert_eq!(DeviceCategory::parse("ap"), DeviceCategory::AccessPoint);
        assert_eq!(DeviceCategory::parse("toaster"), DeviceCategory::Unknown);
        assert_eq!(DeviceCategory::parse(""), DeviceCategory::Unknown);
    }

    #[test]
    fn test_endpoint_kind_mac_beats_name() {
        // Apple laptop prefix wins even though the name says phone
        let kind = detect_endpoint_kind("bobs-phone", Some("F0:18:98:AA:BB:CC"));
        assert_eq!(kind, EndpointKind::Laptop);
    }

    #[test]
    fn test_endpoint_kind_name_keywords() {
        assert_eq!(detect_endpoint_kind("dev-macbook-3", None), EndpointKind::Laptop);
        assert_eq!(detect_endpoint_kind("office-tower", None), EndpointKind::Desktop);
        assert_eq!(detect_endpoint_kind("android-guest", None), EndpointKind::Mobile);
    }

    #[test]
    fn test_endpoint_kind_default_and_deterministic() {
        assert_eq!(detect_endpoint_kind("srv-042", None), EndpointKind::Desktop);
        // Same input, same answer
        for _ in 0..3 {
            assert_eq!(
                detect_endpoint_kind("srv-042", Some("12:34:56:78:9a:bc")),
                EndpointKind::Desktop
            );
        }
    }

    #[test]
    fn test_endpoint_kind_prefix_case_insensitive() {
        assert_eq!(
            detect_endpoint_kind("x", Some("8C:F5:A3:00:11:22")),
            EndpointKind::Mobile
        );
        assert_eq!(
            detect_endpoint_kind("x", Some("8c:f5:a3:00:11:22")),
            EndpointKind::Mobile
        );
    }

    #[test]
    fn test_detail_fields_present_only() {
        let mut desc = DeviceDescriptor::new("fw-1", DeviceCategory::Firewall);
        assert!(desc.detail_fields().is_empty());

        desc.ip = Some("192.168.0.254".to_string());
        desc.vlan = Some("10".to_string());
        let fields = desc.detail_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("IP", "192.168.0.254".to_string()));
        assert_eq!(fields[1], ("VLAN", "10".to_string()));
    }
}
