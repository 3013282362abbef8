//! netviz Viewer - Main entry point
//!
//! Loads the topology document (or the built-in sample), populates
//! the registry and connection list, and runs the 3D scene.

mod config;

use anyhow::Result;
use bevy::prelude::*;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use netviz_core::{
    document, infer_connections, manifest::AssetManifest, resolve_connections, DeviceRegistry,
};
use netviz_scene::{
    ModelManifest, NetvizScenePlugin, NetworkRegistry, SceneConnections, ViewSettings,
};

#[derive(Parser, Debug)]
#[command(name = "netviz")]
#[command(about = "Interactive 3D network topology viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "netviz.toml")]
    config: PathBuf,

    /// Topology document path (overrides the config file)
    #[arg(short, long)]
    topology: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("netviz v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;
    if let Some(topology) = args.topology {
        config.topology.path = topology.display().to_string();
    }

    // Whole-batch fallback: a missing or malformed document yields the
    // built-in sample so the scene is always populated
    let doc = document::load_or_sample(Path::new(&config.topology.path));

    let mut registry = DeviceRegistry::new();
    let committed = registry.load(doc.descriptors());

    // Explicit connection list when the document carries one, else a
    // role-derived topology
    let connections = if doc.connections.is_empty() {
        infer_connections(&registry)
    } else {
        resolve_connections(&doc.connections, &registry)
    };

    info!(
        devices = committed,
        connections = connections.len(),
        "Topology ready"
    );

    let manifest = AssetManifest::load_or_default(Path::new(&config.assets.manifest));

    let view_settings = ViewSettings {
        show_labels: config.view.show_labels,
        show_links: config.view.show_links,
        show_grid: config.view.show_grid,
        idle_animation: config.view.idle_animation,
    };

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: config.window.title.clone(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(NetworkRegistry(registry))
        .insert_resource(SceneConnections(connections))
        .insert_resource(ModelManifest(manifest))
        .insert_resource(view_settings)
        .add_plugins(NetvizScenePlugin)
        .run();

    Ok(())
}
