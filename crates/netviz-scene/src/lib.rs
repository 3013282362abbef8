//! netviz Scene - 3D scene composition for network topologies
//!
//! This crate turns a populated device registry and connection list
//! into an interactive Bevy scene: device visuals resolved through the
//! model cache with procedural fallback, name labels, hover/click
//! interaction, connection links, and the egui control panels.

pub mod camera;
pub mod interaction;
pub mod labels;
pub mod links;
pub mod models;
pub mod procedural;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

/// Plugin bundle that sets up the full scene: add it to an `App`
/// after inserting `NetworkRegistry`, `SceneConnections`, and
/// `ModelManifest` (defaults apply when absent).
pub struct NetvizScenePlugin;

impl Plugin for NetvizScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<types::NetworkRegistry>()
            .init_resource::<types::SceneConnections>()
            .init_resource::<types::ModelManifest>()
            .init_resource::<types::SelectedDevice>()
            .init_resource::<types::ViewSettings>()
            .init_resource::<types::CategoryFilterState>()
            .add_plugins(EguiPlugin::default())
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(labels::LabelsPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(links::LinksPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use camera::CameraSettings;
pub use types::*;
