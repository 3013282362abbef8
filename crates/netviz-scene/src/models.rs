//! Model resolution and device entity management
//!
//! Devices resolve to a visual in two steps: the model cache tries the
//! asset declared in the manifest (one load per key, outcome memoized
//! for the process lifetime), and on `Unavailable` the procedural
//! factory supplies a substitute shape.

use bevy::asset::LoadState;
use bevy::prelude::*;
use std::collections::HashMap;

use netviz_core::asset_key;

use crate::procedural;
use crate::types::{ModelManifest, NetworkRegistry};

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelCache>().add_systems(
            Update,
            (
                poll_loads,
                sync_device_entities.after(poll_loads),
                apply_registry_state.after(sync_device_entities),
            ),
        );
    }
}

/// Marker component for device root entities
#[derive(Component)]
pub struct DeviceNode {
    pub name: String,
    /// Registry revision this visual was built from; a mismatch means
    /// the entry was replaced and the visual must be rebuilt
    pub revision: u64,
    /// Resting position from the registry; the animation tick bobs
    /// around it
    pub home: Vec3,
    /// Deterministic per-device animation phase
    pub phase: f32,
}

/// Resolution outcome for one visual key
pub enum ResolveState {
    /// Load in flight; holding the handle de-duplicates resolution of
    /// the same key
    Loading(Handle<Gltf>),
    Loaded(Handle<Scene>),
    /// No asset declared, or the load failed. Expected outcome: the
    /// caller falls back to the procedural model.
    Unavailable,
}

/// Memoized per-key model resolution.
///
/// Append-only after first resolution per key: at most one load is
/// issued per key per process lifetime, and failures are cached
/// rather than retried on every device.
#[derive(Resource, Default)]
pub struct ModelCache {
    states: HashMap<String, ResolveState>,
}

impl ModelCache {
    pub fn resolve(
        &mut self,
        key: &str,
        manifest: &ModelManifest,
        asset_server: &AssetServer,
    ) -> &ResolveState {
        self.states.entry(key.to_string()).or_insert_with(|| {
            match manifest.model_path(key) {
                Some(path) => {
                    tracing::info!(key, path, "Loading device model");
                    ResolveState::Loading(asset_server.load(path.to_string()))
                }
                None => ResolveState::Unavailable,
            }
        })
    }

    /// Memoized outcome without side effects (None until first resolve)
    pub fn peek(&self, key: &str) -> Option<&ResolveState> {
        self.states.get(key)
    }

    pub fn loads_issued(&self) -> usize {
        self.states
            .values()
            .filter(|s| !matches!(s, ResolveState::Unavailable))
            .count()
    }
}

/// Check in-flight loads and settle their outcome
pub(crate) fn poll_loads(
    mut cache: ResMut<ModelCache>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
) {
    let loading_keys: Vec<String> = cache
        .states
        .iter()
        .filter(|(_, s)| matches!(s, ResolveState::Loading(_)))
        .map(|(k, _)| k.clone())
        .collect();

    for key in loading_keys {
        let Some(ResolveState::Loading(handle)) = cache.states.get(&key) else {
            continue;
        };

        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {
                let scene = gltf_assets.get(handle).and_then(|gltf| {
                    gltf.default_scene
                        .clone()
                        .or_else(|| gltf.scenes.first().cloned())
                });
                match scene {
                    Some(scene_handle) => {
                        tracing::info!(key, "Model loaded");
                        cache.states.insert(key, ResolveState::Loaded(scene_handle));
                    }
                    None => {
                        tracing::warn!(key, "Model has no scenes, using procedural fallback");
                        cache.states.insert(key, ResolveState::Unavailable);
                    }
                }
            }
            Some(LoadState::Failed(_)) => {
                tracing::warn!(key, "Model load failed, using procedural fallback");
                cache.states.insert(key, ResolveState::Unavailable);
            }
            _ => {
                // Still loading
            }
        }
    }
}

/// Sync device entities with the registry.
///
/// Devices spawn in registry order; a device waiting on an in-flight
/// asset load is skipped until the outcome settles. Entities whose
/// name left the registry, or whose entry was replaced (revision
/// bump), are despawned so a name never owns two visuals.
pub(crate) fn sync_device_entities(
    mut commands: Commands,
    registry: Res<NetworkRegistry>,
    manifest: Res<ModelManifest>,
    mut cache: ResMut<ModelCache>,
    asset_server: Res<AssetServer>,
    existing: Query<(Entity, &DeviceNode)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let existing_nodes: HashMap<&str, (Entity, u64)> = existing
        .iter()
        .map(|(entity, node)| (node.name.as_str(), (entity, node.revision)))
        .collect();

    // Remove visuals for dropped or replaced entries
    for (name, (entity, revision)) in &existing_nodes {
        match registry.get(name) {
            Some(entry) if entry.revision == *revision => {}
            _ => commands.entity(*entity).despawn(),
        }
    }

    for entry in registry.devices() {
        if let Some((_, revision)) = existing_nodes.get(entry.descriptor.name.as_str()) {
            if *revision == entry.revision {
                continue;
            }
        }

        let key = asset_key(&entry.descriptor);
        let position = Vec3::from(entry.position);
        let node = DeviceNode {
            name: entry.descriptor.name.clone(),
            revision: entry.revision,
            home: position,
            phase: animation_phase(&entry.descriptor.name),
        };
        let visibility = if entry.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        match cache.resolve(&key, &manifest, &asset_server) {
            ResolveState::Loading(_) => {
                // Spawn once the load settles
                continue;
            }
            ResolveState::Loaded(scene_handle) => {
                commands.spawn((
                    SceneRoot(scene_handle.clone()),
                    Transform::from_translation(position),
                    visibility,
                    node,
                ));
            }
            ResolveState::Unavailable => {
                let root = commands
                    .spawn((Transform::from_translation(position), visibility, node))
                    .id();
                procedural::spawn_model(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    root,
                    &entry.descriptor,
                );
            }
        }
    }
}

/// Propagate registry visibility and position to live entities.
///
/// Writes are guarded so change detection only fires on real moves;
/// the link renderer keys its rebuilds off `Changed<Transform>`.
fn apply_registry_state(
    registry: Res<NetworkRegistry>,
    mut nodes: Query<(&mut DeviceNode, &mut Transform, &mut Visibility)>,
) {
    for (mut node, mut transform, mut visibility) in nodes.iter_mut() {
        let Some(entry) = registry.get(&node.name) else {
            continue;
        };

        let home = Vec3::from(entry.position);
        if node.home != home {
            node.home = home;
            transform.translation = home;
        }

        let desired = if entry.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != desired {
            *visibility = desired;
        }
    }
}

/// Deterministic phase offset so idle motion is not in lockstep
fn animation_phase(name: &str) -> f32 {
    let hash = name.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    (hash % 628) as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_phase_deterministic() {
        assert_eq!(animation_phase("fw-1"), animation_phase("fw-1"));
        assert!(animation_phase("fw-1") >= 0.0);
        assert!(animation_phase("fw-1") < std::f32::consts::TAU);
    }

    #[test]
    fn test_cache_memoizes_unavailable() {
        let mut cache = ModelCache::default();
        cache
            .states
            .insert("firewall".to_string(), ResolveState::Unavailable);
        assert!(matches!(
            cache.peek("firewall"),
            Some(ResolveState::Unavailable)
        ));
        assert_eq!(cache.loads_issued(), 0);
    }
}
