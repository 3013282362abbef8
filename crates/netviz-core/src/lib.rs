//! netviz Core - Data model and registry for network topology scenes
//!
//! This crate provides the foundational types for the netviz system:
//! - Device descriptors, categories, and endpoint classification
//! - Topology document parsing with a built-in sample fallback
//! - Asset manifest for category-to-model mapping
//! - Device registry with auto-layout and category filtering
//! - Connection derivation (explicit lists and role-based inference)

pub mod device;
pub mod document;
pub mod manifest;
pub mod registry;
pub mod topology;

pub use device::{detect_endpoint_kind, DeviceCategory, DeviceDescriptor, DeviceStatus, EndpointKind};
pub use document::{load_or_sample, sample_topology, DocumentError, TopologyDocument};
pub use manifest::{asset_key, AssetManifest};
pub use registry::{CategoryFilter, DeviceRegistry, RegistryEntry};
pub use topology::{infer_connections, resolve_connections, Connection};
