//! Asset manifest: category/subtype keys mapped to model file paths

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::device::{DeviceCategory, DeviceDescriptor};

/// Maps visual keys ("firewall", "endpoint_laptop", ...) to asset
/// paths relative to the asset root.
///
/// A missing manifest file is not an error: it yields an empty
/// manifest and every device falls back to its procedural shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default, flatten)]
    pub entries: HashMap<String, String>,
}

impl AssetManifest {
    /// Load the manifest, or return an empty one when the file is
    /// missing or malformed
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(manifest) => {
                    tracing::info!(path = %path.display(), "Loaded asset manifest");
                    manifest
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Malformed asset manifest, using procedural models");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "No asset manifest, using procedural models");
                Self::default()
            }
        }
    }

    /// Asset path for a visual key, if one is declared
    pub fn model_path(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Visual key for a device: the category key, refined by endpoint
/// kind so a laptop and a phone can carry different assets.
pub fn asset_key(descriptor: &DeviceDescriptor) -> String {
    match descriptor.category {
        DeviceCategory::Endpoint => {
            format!("endpoint_{:?}", descriptor.endpoint_kind()).to_lowercase()
        }
        other => other.key().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceCategory;

    #[test]
    fn test_manifest_lookup() {
        let json = r#"{"firewall": "models/firewall.glb", "switch": "models/switch.glb"}"#;
        let manifest: AssetManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.model_path("firewall"), Some("models/firewall.glb"));
        assert_eq!(manifest.model_path("access_point"), None);
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let manifest = AssetManifest::load_or_default(Path::new("/nonexistent/models.json"));
        assert!(manifest.entries.is_empty());
    }

    #[test]
    fn test_asset_key_refines_endpoints() {
        let fw = DeviceDescriptor::new("fw", DeviceCategory::Firewall);
        assert_eq!(asset_key(&fw), "firewall");

        let laptop = DeviceDescriptor::new("dev-laptop", DeviceCategory::Endpoint);
        assert_eq!(asset_key(&laptop), "endpoint_laptop");
    }
}
