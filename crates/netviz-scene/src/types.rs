//! Shared resources and messages for the scene session
//!
//! All state lives in owned resources created per session; nothing is
//! ambient or static.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

use netviz_core::{
    AssetManifest, CategoryFilter, Connection, DeviceCategory, DeviceDescriptor, DeviceRegistry,
};

/// The device registry driving the scene
#[derive(Debug, Clone, Resource, Default, Deref, DerefMut)]
pub struct NetworkRegistry(pub DeviceRegistry);

/// Resolved connection list consumed by the link renderer
#[derive(Debug, Clone, Resource, Default, Deref, DerefMut)]
pub struct SceneConnections(pub Vec<Connection>);

/// Asset manifest mapping visual keys to model paths
#[derive(Debug, Clone, Resource, Default, Deref)]
pub struct ModelManifest(pub AssetManifest);

/// Currently selected device
#[derive(Debug, Clone, Resource, Default)]
pub struct SelectedDevice(pub Option<String>);

/// Device currently under the cursor
#[derive(Debug, Clone, Resource, Default)]
pub struct HoveredDevice(pub Option<String>);

/// Scene-wide view toggles
#[derive(Debug, Clone, Resource)]
pub struct ViewSettings {
    pub show_labels: bool,
    pub show_links: bool,
    pub show_grid: bool,
    pub idle_animation: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_links: true,
            show_grid: true,
            idle_animation: false,
        }
    }
}

/// UI-side category selection; `all` is the wildcard
#[derive(Debug, Clone, Resource)]
pub struct CategoryFilterState {
    pub all: bool,
    pub selected: HashSet<DeviceCategory>,
}

impl Default for CategoryFilterState {
    fn default() -> Self {
        Self {
            all: true,
            selected: DeviceCategory::ALL.into_iter().collect(),
        }
    }
}

impl CategoryFilterState {
    pub fn to_filter(&self) -> CategoryFilter {
        if self.all {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(self.selected.clone())
        }
    }
}

/// Structured payload delivered on device click: name and category
/// always, optional fields only when present on the descriptor.
/// Serializable so embedding hosts can forward it as-is.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDetail {
    pub name: String,
    pub label: String,
    pub category: DeviceCategory,
    pub fields: Vec<(&'static str, String)>,
}

impl DeviceDetail {
    pub fn from_descriptor(descriptor: &DeviceDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            label: descriptor.label().to_string(),
            category: descriptor.category,
            fields: descriptor.detail_fields(),
        }
    }
}

/// Published when a device is clicked. The detail panel is one
/// consumer; hosts embedding the scene can add their own reader.
#[derive(Debug, Clone, Message)]
pub struct DeviceClicked {
    pub detail: DeviceDetail,
}

/// UI panel layout state
#[derive(Debug, Clone, Resource)]
pub struct UiLayout {
    pub show_left_panel: bool,
    pub show_right_panel: bool,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            show_left_panel: true,
            show_right_panel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netviz_core::DeviceStatus;

    #[test]
    fn test_filter_state_wildcard() {
        let state = CategoryFilterState::default();
        assert_eq!(state.to_filter(), CategoryFilter::All);

        let state = CategoryFilterState {
            all: false,
            selected: [DeviceCategory::Firewall].into_iter().collect(),
        };
        match state.to_filter() {
            CategoryFilter::Only(set) => assert_eq!(set.len(), 1),
            CategoryFilter::All => panic!("expected Only"),
        }
    }

    #[test]
    fn test_detail_payload_present_fields_only() {
        let mut descriptor = DeviceDescriptor::new("fw-1", DeviceCategory::Firewall);
        descriptor.display_name = Some("Edge Firewall".to_string());
        descriptor.ip = Some("10.0.0.1".to_string());
        descriptor.status = Some(DeviceStatus::Online);

        let detail = DeviceDetail::from_descriptor(&descriptor);
        assert_eq!(detail.label, "Edge Firewall");
        assert_eq!(detail.category, DeviceCategory::Firewall);
        assert_eq!(detail.fields.len(), 2);
        assert!(detail.fields.iter().all(|(_, v)| !v.is_empty()));
    }
}
