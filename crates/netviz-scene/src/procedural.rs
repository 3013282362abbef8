//! Procedural substitute models for devices without an asset
//!
//! Each category maps to a distinct primitive composition and a fixed
//! tint. Building is total: unknown categories get a neutral gray
//! sphere, never an error.

use bevy::prelude::*;

use netviz_core::{DeviceCategory, DeviceDescriptor, EndpointKind};

/// Fixed tint per category. Endpoint kinds share the category tint
/// and differ by shape.
pub fn category_tint(category: DeviceCategory) -> Color {
    match category {
        DeviceCategory::Firewall => Color::srgb(0.85, 0.28, 0.2),
        DeviceCategory::Router => Color::srgb(0.6, 0.32, 0.8),
        DeviceCategory::Switch => Color::srgb(0.22, 0.45, 0.85),
        DeviceCategory::AccessPoint => Color::srgb(0.2, 0.72, 0.4),
        DeviceCategory::Endpoint => Color::srgb(0.82, 0.68, 0.25),
        DeviceCategory::Unknown => Color::srgb(0.5, 0.5, 0.5),
    }
}

/// One primitive part of a procedural model, in device-local space
pub struct ModelPart {
    pub mesh: Mesh,
    pub transform: Transform,
}

impl ModelPart {
    fn new(mesh: impl Into<Mesh>, transform: Transform) -> Self {
        Self {
            mesh: mesh.into(),
            transform,
        }
    }

    fn at(mesh: impl Into<Mesh>, x: f32, y: f32, z: f32) -> Self {
        Self::new(mesh, Transform::from_xyz(x, y, z))
    }

    /// Rotate a Y-aligned primitive (cylinder, cone) to stand on Z
    fn pointing_up(mut self) -> Self {
        self.transform.rotation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        self
    }
}

/// Primitive composition for a device. Z is up; parts sit on the
/// device origin so the registry elevation keeps them above the grid.
pub fn build_parts(descriptor: &DeviceDescriptor) -> Vec<ModelPart> {
    match descriptor.category {
        DeviceCategory::Firewall => vec![
            // Rack appliance with a raised top fin
            ModelPart::at(Cuboid::new(0.06, 0.04, 0.02), 0.0, 0.0, 0.0),
            ModelPart::at(Cuboid::new(0.05, 0.006, 0.008), 0.0, 0.0, 0.014),
        ],
        DeviceCategory::Router => vec![
            ModelPart::at(Cuboid::new(0.05, 0.05, 0.015), 0.0, 0.0, 0.0),
            ModelPart::at(Cylinder::new(0.0015, 0.03), -0.015, -0.022, 0.02)
                .pointing_up(),
            ModelPart::at(Cylinder::new(0.0015, 0.03), 0.015, -0.022, 0.02).pointing_up(),
        ],
        DeviceCategory::Switch => vec![ModelPart::at(Cuboid::new(0.08, 0.035, 0.012), 0.0, 0.0, 0.0)],
        DeviceCategory::AccessPoint => vec![
            ModelPart::at(Cylinder::new(0.025, 0.01), 0.0, 0.0, 0.0).pointing_up(),
            ModelPart::at(Sphere::new(0.004), 0.0, 0.0, 0.008),
        ],
        DeviceCategory::Endpoint => match descriptor.endpoint_kind() {
            EndpointKind::Desktop => {
                vec![ModelPart::at(Cuboid::new(0.02, 0.03, 0.045), 0.0, 0.0, 0.01)]
            }
            EndpointKind::Laptop => vec![
                ModelPart::at(Cuboid::new(0.04, 0.028, 0.004), 0.0, 0.0, 0.0),
                ModelPart::new(
                    Cuboid::new(0.04, 0.002, 0.026),
                    Transform::from_xyz(0.0, 0.014, 0.012)
                        .with_rotation(Quat::from_rotation_x(-0.35)),
                ),
            ],
            EndpointKind::Mobile => {
                vec![ModelPart::at(Cuboid::new(0.012, 0.004, 0.024), 0.0, 0.0, 0.004)]
            }
        },
        DeviceCategory::Unknown => vec![ModelPart::at(Sphere::new(0.02), 0.0, 0.0, 0.0)],
    }
}

/// Spawn a procedural model under the given device root entity.
///
/// All parts share one material instance tinted for the category, so
/// hover highlighting affects the whole device.
pub fn spawn_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    root: Entity,
    descriptor: &DeviceDescriptor,
) {
    let material = materials.add(StandardMaterial {
        base_color: category_tint(descriptor.category),
        metallic: 0.2,
        perceptual_roughness: 0.7,
        ..default()
    });

    for part in build_parts(descriptor) {
        let child = commands
            .spawn((
                Mesh3d(meshes.add(part.mesh)),
                MeshMaterial3d(material.clone()),
                part.transform,
            ))
            .id();
        commands.entity(root).add_child(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netviz_core::DeviceDescriptor;

    #[test]
    fn test_every_category_builds_a_model() {
        for category in DeviceCategory::ALL {
            let descriptor = DeviceDescriptor::new("probe", category);
            let parts = build_parts(&descriptor);
            assert!(!parts.is_empty(), "no parts for {category:?}");
        }
    }

    #[test]
    fn test_tints_are_deterministic_and_distinct() {
        for category in DeviceCategory::ALL {
            assert_eq!(category_tint(category), category_tint(category));
        }
        let tints: Vec<_> = DeviceCategory::ALL.iter().map(|&c| category_tint(c)).collect();
        for (i, a) in tints.iter().enumerate() {
            for b in tints.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_unknown_is_neutral_gray() {
        let tint = category_tint(DeviceCategory::Unknown);
        assert_eq!(tint, Color::srgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_endpoint_kinds_have_distinct_shapes() {
        let mut laptop = DeviceDescriptor::new("dev-laptop", DeviceCategory::Endpoint);
        laptop.display_name = Some("dev-laptop".to_string());
        let mut phone = DeviceDescriptor::new("guest-phone", DeviceCategory::Endpoint);
        phone.display_name = Some("guest-phone".to_string());

        assert_ne!(
            build_parts(&laptop).len(),
            build_parts(&phone).len()
        );
    }
}
