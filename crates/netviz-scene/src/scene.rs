//! Scene setup: camera, lighting, ground grid, and the idle
//! animation tick

use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;

use crate::camera::MainCamera;
use crate::models::DeviceNode;
use crate::types::ViewSettings;

const GRID_SIZE: i32 = 10;
const GRID_SPACING: f32 = 0.1;
const GRID_LINE_THICKNESS: f32 = 0.0004;

/// Vertical amplitude of the idle bob, in meters
const BOB_AMPLITUDE: f32 = 0.006;
const BOB_SPEED: f32 = 1.4;
/// Idle yaw drift, radians per second
const SPIN_SPEED: f32 = 0.25;

pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene).add_systems(
            Update,
            (update_grid_visibility, animate_devices, pulse_fill_light),
        );
    }
}

/// Marker for grid lines
#[derive(Component)]
pub struct GridLine;

/// Fill light whose intensity breathes with the idle animation
#[derive(Component)]
pub struct FillLight {
    pub base_intensity: f32,
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewSettings>,
) {
    // ENU coordinate system: X=East, Y=North, Z=Up
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.001,
            far: 1000.0,
            ..default()
        }),
        Transform::from_xyz(0.5, -0.5, 0.4).looking_at(Vec3::ZERO, Vec3::Z),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.95, 1.0),
        brightness: 200.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 5000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 2.0, 4.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    let fill_intensity = 100_000.0;
    commands.spawn((
        PointLight {
            intensity: fill_intensity,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            ..default()
        },
        Transform::from_xyz(-1.0, -1.0, 2.0),
        FillLight {
            base_intensity: fill_intensity,
        },
    ));

    // Ground grid on the X-Y plane
    let grid_extent = GRID_SIZE as f32 * GRID_SPACING;
    let initial_visibility = if settings.show_grid {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };

    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.4, 0.4, 0.4, 0.5),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    let line_mesh_x = meshes.add(Cuboid::new(
        grid_extent * 2.0,
        GRID_LINE_THICKNESS,
        GRID_LINE_THICKNESS,
    ));
    let line_mesh_y = meshes.add(Cuboid::new(
        GRID_LINE_THICKNESS,
        grid_extent * 2.0,
        GRID_LINE_THICKNESS,
    ));

    for i in -GRID_SIZE..=GRID_SIZE {
        let y = i as f32 * GRID_SPACING;
        commands.spawn((
            Mesh3d(line_mesh_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(0.0, y, 0.0)),
            GridLine,
            initial_visibility,
        ));
    }

    for i in -GRID_SIZE..=GRID_SIZE {
        let x = i as f32 * GRID_SPACING;
        commands.spawn((
            Mesh3d(line_mesh_y.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(x, 0.0, 0.0)),
            GridLine,
            initial_visibility,
        ));
    }
}

fn update_grid_visibility(
    settings: Res<ViewSettings>,
    mut grid_query: Query<&mut Visibility, With<GridLine>>,
) {
    if !settings.is_changed() {
        return;
    }

    let visibility = if settings.show_grid {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    for mut vis in grid_query.iter_mut() {
        *vis = visibility;
    }
}

/// Idle animation tick: bob and slowly rotate live devices around
/// their resting pose. O(n) in device count, mutates existing
/// transforms only, never allocates entities.
fn animate_devices(
    settings: Res<ViewSettings>,
    time: Res<Time>,
    mut devices: Query<(&DeviceNode, &mut Transform)>,
) {
    let t = time.elapsed_secs();
    for (node, mut transform) in devices.iter_mut() {
        if settings.idle_animation {
            let bob = BOB_AMPLITUDE * (t * BOB_SPEED + node.phase).sin();
            transform.translation = node.home + Vec3::Z * bob;
            transform.rotation = Quat::from_rotation_z(t * SPIN_SPEED + node.phase);
        } else {
            // Settle back to the resting pose; guard the writes so
            // change detection stays quiet once settled
            if transform.translation != node.home {
                transform.translation = node.home;
            }
            if transform.rotation != Quat::IDENTITY {
                transform.rotation = Quat::IDENTITY;
            }
        }
    }
}

/// Breathe the fill light while the idle animation runs
fn pulse_fill_light(
    settings: Res<ViewSettings>,
    time: Res<Time>,
    mut lights: Query<(&FillLight, &mut PointLight)>,
) {
    for (fill, mut light) in lights.iter_mut() {
        let target = if settings.idle_animation {
            fill.base_intensity * (1.0 + 0.15 * (time.elapsed_secs() * 0.8).sin())
        } else {
            fill.base_intensity
        };
        if light.intensity != target {
            light.intensity = target;
        }
    }
}
