//! Screen-space name tags for device entities
//!
//! Labels are UI text nodes re-projected from the device's world
//! position every frame, so they always face the viewer. A label's
//! effective visibility is `labels_enabled && device.visible` - never
//! independently true while its device is hidden.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::camera::MainCamera;
use crate::models::DeviceNode;
use crate::types::{NetworkRegistry, ViewSettings};

/// World-space offset above the device origin where the tag anchors
const LABEL_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 0.05);

pub struct LabelsPlugin;

impl Plugin for LabelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                sync_labels.after(crate::models::sync_device_entities),
                update_labels.after(sync_labels),
            ),
        );
    }
}

/// Marker component for device label entities
#[derive(Component)]
pub struct DeviceLabel {
    pub device: String,
}

/// The effective visibility rule for labels
pub fn label_visible(labels_enabled: bool, device_visible: bool) -> bool {
    labels_enabled && device_visible
}

/// Keep one label per live device entity: spawn tags for new devices,
/// drop tags whose device is gone. Labels attach only after the
/// device visual exists.
fn sync_labels(
    mut commands: Commands,
    registry: Res<NetworkRegistry>,
    devices: Query<&DeviceNode>,
    labels: Query<(Entity, &DeviceLabel)>,
) {
    let device_names: HashSet<&str> = devices.iter().map(|node| node.name.as_str()).collect();
    let mut labeled: HashSet<&str> = HashSet::new();

    for (entity, label) in labels.iter() {
        if device_names.contains(label.device.as_str()) {
            labeled.insert(label.device.as_str());
        } else {
            commands.entity(entity).despawn();
        }
    }

    for name in device_names {
        if labeled.contains(name) {
            continue;
        }
        let Some(entry) = registry.get(name) else {
            continue;
        };

        commands.spawn((
            Text::new(entry.descriptor.label().to_string()),
            TextFont {
                font_size: 12.0,
                ..default()
            },
            TextColor(Color::srgba(0.88, 0.92, 1.0, 0.92)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
            Visibility::Hidden,
            DeviceLabel {
                device: name.to_string(),
            },
        ));
    }
}

/// Re-project each label to its device and apply the effective
/// visibility rule
fn update_labels(
    settings: Res<ViewSettings>,
    registry: Res<NetworkRegistry>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    devices: Query<(&DeviceNode, &GlobalTransform)>,
    mut labels: Query<(&DeviceLabel, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let positions: HashMap<&str, Vec3> = devices
        .iter()
        .map(|(node, transform)| (node.name.as_str(), transform.translation()))
        .collect();

    for (label, mut node, mut visibility) in labels.iter_mut() {
        let device_visible = registry
            .get(&label.device)
            .map(|entry| entry.visible)
            .unwrap_or(false);

        let world_pos = positions.get(label.device.as_str()).copied();
        let shown = label_visible(settings.show_labels, device_visible);
        let Some(world_pos) = world_pos.filter(|_| shown) else {
            *visibility = Visibility::Hidden;
            continue;
        };

        match camera.world_to_viewport(camera_transform, world_pos + LABEL_OFFSET) {
            Ok(screen) => {
                node.left = Val::Px(screen.x - 30.0);
                node.top = Val::Px(screen.y - 10.0);
                *visibility = Visibility::Visible;
            }
            Err(_) => {
                // Behind the camera
                *visibility = Visibility::Hidden;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_never_visible_when_device_hidden() {
        assert!(!label_visible(true, false));
        assert!(!label_visible(false, false));
    }

    #[test]
    fn test_label_toggle_round_trip() {
        for device_visible in [true, false] {
            let before = label_visible(true, device_visible);
            let off = label_visible(false, device_visible);
            let after = label_visible(true, device_visible);
            assert!(!off);
            assert_eq!(before, after);
        }
    }
}
