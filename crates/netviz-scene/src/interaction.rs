//! Pointer interaction: hover highlighting and click selection
//!
//! Each device visual runs a two-state machine, Idle and Hovered,
//! driven by a cursor ray test against the live device entities. On
//! enter the visual scales up and its materials gain an emissive
//! tint; on leave both are restored. Clicks publish a `DeviceClicked`
//! message with the descriptor's present fields.

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use std::collections::HashMap;

use crate::camera::{CameraSettings, MainCamera};
use crate::models::DeviceNode;
use crate::types::{DeviceClicked, DeviceDetail, HoveredDevice, NetworkRegistry, SelectedDevice};

/// Scale factor applied to a hovered visual
const HOVER_SCALE: f32 = 1.15;
/// Emissive brightness applied to a hovered visual's materials
const HOVER_EMISSIVE: f32 = 0.45;
/// Hit radius around a device origin, in meters
const HIT_RADIUS: f32 = 0.08;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HoveredDevice>()
            .add_message::<DeviceClicked>()
            .add_systems(
                Update,
                (
                    update_hovered_device,
                    apply_hover_highlight.after(update_hovered_device),
                    handle_click.after(update_hovered_device),
                    handle_deselect,
                ),
            );
    }
}

/// Original material state captured before highlighting, so leaving
/// the Hovered state restores it exactly
struct OriginalMaterial {
    handle: Handle<StandardMaterial>,
    emissive: LinearRgba,
}

/// Cast a ray through the cursor and find the nearest device within
/// the hit radius
fn update_hovered_device(
    mut hovered: ResMut<HoveredDevice>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    devices: Query<(&DeviceNode, &GlobalTransform, &Visibility)>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
) {
    let over_ui = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if over_ui {
        if hovered.0.is_some() {
            hovered.0 = None;
        }
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        if hovered.0.is_some() {
            hovered.0 = None;
        }
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor_pos) else {
        return;
    };

    let mut closest: Option<(f32, &str)> = None;
    for (node, transform, visibility) in devices.iter() {
        if *visibility == Visibility::Hidden {
            continue;
        }

        let to_device = transform.translation() - ray.origin;
        let t = to_device.dot(*ray.direction);
        if t < 0.0 {
            continue;
        }

        let closest_point = ray.origin + *ray.direction * t;
        let distance_sq = (closest_point - transform.translation()).length_squared();
        if distance_sq < HIT_RADIUS * HIT_RADIUS {
            if closest.is_none() || t < closest.as_ref().unwrap().0 {
                closest = Some((t, node.name.as_str()));
            }
        }
    }

    let new_hover = closest.map(|(_, name)| name.to_string());
    if hovered.0 != new_hover {
        hovered.0 = new_hover;
    }
}

/// Apply Idle/Hovered transitions: scale and emissive on enter,
/// restore on leave. Material captures are keyed by mesh entity, so
/// re-running the sync replaces state instead of stacking it.
fn apply_hover_highlight(
    mut commands: Commands,
    hovered: Res<HoveredDevice>,
    mut prev: Local<Option<String>>,
    mut devices: Query<(Entity, &DeviceNode, &mut Transform)>,
    children_query: Query<&Children>,
    material_query: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut captured: Local<HashMap<Entity, OriginalMaterial>>,
) {
    if *prev == hovered.0 {
        return;
    }

    // Leave: restore the previously hovered device
    if let Some(prev_name) = prev.as_deref() {
        for (entity, node, mut transform) in devices.iter_mut() {
            if node.name != prev_name {
                continue;
            }
            transform.scale = Vec3::ONE;
            for mesh_entity in collect_material_entities(entity, &children_query, &material_query) {
                if let Some(original) = captured.get(&mesh_entity) {
                    if let Some(material) = materials.get_mut(&original.handle) {
                        material.emissive = original.emissive;
                    }
                }
            }
            break;
        }
    }

    // Enter: highlight the newly hovered device
    if let Some(name) = hovered.0.as_deref() {
        for (entity, node, mut transform) in devices.iter_mut() {
            if node.name != name {
                continue;
            }
            transform.scale = Vec3::splat(HOVER_SCALE);
            for mesh_entity in collect_material_entities(entity, &children_query, &material_query) {
                let handle = match captured.get(&mesh_entity) {
                    Some(original) => original.handle.clone(),
                    None => {
                        // First hover over this mesh: clone the material
                        // so shared templates are not tinted globally
                        let Ok(current) = material_query.get(mesh_entity) else {
                            continue;
                        };
                        let Some(material) = materials.get(&current.0) else {
                            continue;
                        };
                        let emissive = material.emissive;
                        let cloned = material.clone();
                        let clone = materials.add(cloned);
                        commands
                            .entity(mesh_entity)
                            .insert(MeshMaterial3d(clone.clone()));
                        captured.insert(
                            mesh_entity,
                            OriginalMaterial {
                                handle: clone.clone(),
                                emissive,
                            },
                        );
                        clone
                    }
                };
                if let Some(material) = materials.get_mut(&handle) {
                    material.emissive = material.base_color.to_linear() * HOVER_EMISSIVE;
                }
            }
            break;
        }
    }

    *prev = hovered.0.clone();
}

/// Mesh entities with a standard material in a device's hierarchy,
/// the root included
fn collect_material_entities(
    root: Entity,
    children_query: &Query<&Children>,
    material_query: &Query<&MeshMaterial3d<StandardMaterial>>,
) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if material_query.get(entity).is_ok() {
            out.push(entity);
        }
        if let Ok(children) = children_query.get(entity) {
            stack.extend(children.iter());
        }
    }
    out
}

/// Click selects the hovered device: publish the detail payload,
/// record the selection, and refocus the camera on it
fn handle_click(
    hovered: Res<HoveredDevice>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    registry: Res<NetworkRegistry>,
    mut selected: ResMut<SelectedDevice>,
    mut camera_settings: ResMut<CameraSettings>,
    mut clicks: MessageWriter<DeviceClicked>,
    devices: Query<(&DeviceNode, &GlobalTransform)>,
    mut contexts: EguiContexts,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    let over_ui = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if over_ui {
        return;
    }

    let Some(name) = hovered.0.as_deref() else {
        return;
    };
    let Some(entry) = registry.get(name) else {
        return;
    };

    selected.0 = Some(name.to_string());
    clicks.write(DeviceClicked {
        detail: DeviceDetail::from_descriptor(&entry.descriptor),
    });

    if let Some((_, transform)) = devices.iter().find(|(node, _)| node.name == name) {
        camera_settings.target_focus = transform.translation();
    }
}

/// Escape clears the current selection
fn handle_deselect(mut selected: ResMut<SelectedDevice>, keyboard: Res<ButtonInput<KeyCode>>) {
    if keyboard.just_pressed(KeyCode::Escape) && selected.0.is_some() {
        selected.0 = None;
    }
}
