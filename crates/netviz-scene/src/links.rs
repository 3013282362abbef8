//! Visual links between connected devices
//!
//! Each connection renders as a 3-point polyline: endpoint A, a
//! midpoint lifted above the ground plane, endpoint B. Geometry is
//! rewritten in place whenever an endpoint's transform changes, so
//! links follow devices through animation drift.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;
use bevy::render::render_resource::PrimitiveTopology;
use std::collections::{HashMap, HashSet};

use crate::models::DeviceNode;
use crate::types::{SceneConnections, ViewSettings};

/// Height of the polyline midpoint above the endpoints' midpoint
const LINK_LIFT: f32 = 0.04;

pub struct LinksPlugin;

impl Plugin for LinksPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (sync_links, update_links.after(sync_links)));
    }
}

/// Marker component for connection line entities
#[derive(Component)]
pub struct LinkLine {
    pub from: String,
    pub to: String,
}

/// Polyline control points for a link between two device positions
pub fn link_points(a: Vec3, b: Vec3) -> [[f32; 3]; 3] {
    let mid = (a + b) * 0.5 + Vec3::Z * LINK_LIFT;
    [a.to_array(), mid.to_array(), b.to_array()]
}

fn polyline_mesh(points: [[f32; 3]; 3]) -> Mesh {
    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, points.to_vec())
}

/// Keep one line entity per resolved connection
fn sync_links(
    mut commands: Commands,
    connections: Res<SceneConnections>,
    links: Query<(Entity, &LinkLine)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let desired: HashSet<(String, String)> = connections.iter().map(|c| c.key()).collect();

    let mut existing: HashSet<(String, String)> = HashSet::new();
    for (entity, link) in links.iter() {
        let key = link_key(&link.from, &link.to);
        if desired.contains(&key) {
            existing.insert(key);
        } else {
            commands.entity(entity).despawn();
        }
    }

    for connection in connections.iter() {
        if existing.contains(&connection.key()) {
            continue;
        }

        let material = materials.add(StandardMaterial {
            base_color: Color::srgba(0.35, 0.72, 1.0, 0.8),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });

        // Real geometry lands on the next update pass, once the
        // endpoint entities exist
        commands.spawn((
            Mesh3d(meshes.add(polyline_mesh(link_points(Vec3::ZERO, Vec3::ZERO)))),
            MeshMaterial3d(material),
            Transform::IDENTITY,
            Visibility::Hidden,
            LinkLine {
                from: connection.from.clone(),
                to: connection.to.clone(),
            },
        ));
    }
}

/// Rewrite link geometry when endpoints move and apply the uniform
/// visibility toggle
fn update_links(
    settings: Res<ViewSettings>,
    moved: Query<(), (With<DeviceNode>, Changed<Transform>)>,
    devices: Query<(&DeviceNode, &Transform)>,
    mut links: Query<(&LinkLine, &Mesh3d, &mut Visibility)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let rebuild = !moved.is_empty();
    let positions: HashMap<&str, Vec3> = if rebuild {
        devices
            .iter()
            .map(|(node, transform)| (node.name.as_str(), transform.translation))
            .collect()
    } else {
        HashMap::new()
    };

    for (link, mesh_handle, mut visibility) in links.iter_mut() {
        let desired = if settings.show_links {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        if *visibility != desired {
            *visibility = desired;
        }

        if !rebuild {
            continue;
        }
        let (Some(&a), Some(&b)) = (
            positions.get(link.from.as_str()),
            positions.get(link.to.as_str()),
        ) else {
            continue;
        };
        if let Some(mesh) = meshes.get_mut(&mesh_handle.0) {
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, link_points(a, b).to_vec());
        }
    }
}

fn link_key(from: &str, to: &str) -> (String, String) {
    if from <= to {
        (from.to_string(), to.to_string())
    } else {
        (to.to_string(), from.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_points_midpoint_is_lifted() {
        let a = Vec3::new(0.0, 0.0, 0.02);
        let b = Vec3::new(0.3, 0.0, 0.02);
        let points = link_points(a, b);
        assert_eq!(points[0], a.to_array());
        assert_eq!(points[2], b.to_array());
        assert_eq!(points[1][2], 0.02 + LINK_LIFT);
    }

    #[test]
    fn test_link_points_idempotent() {
        let a = Vec3::new(-0.1, 0.2, 0.0);
        let b = Vec3::new(0.4, -0.3, 0.1);
        assert_eq!(link_points(a, b), link_points(a, b));
    }

    #[test]
    fn test_link_key_unordered() {
        assert_eq!(link_key("a", "b"), link_key("b", "a"));
    }
}
