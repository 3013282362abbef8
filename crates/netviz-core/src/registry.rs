//! Device registry: owned entry set, auto-layout, and filtering

use std::collections::HashSet;

use crate::device::{DeviceCategory, DeviceDescriptor};

/// Horizontal distance between auto-layout grid cells, in meters
pub const GRID_SPACING: f32 = 0.15;
/// Resting height of auto-placed devices above the ground plane
pub const GRID_ELEVATION: f32 = 0.02;

/// Category selection for visibility filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Wildcard: every device is shown
    All,
    /// A device is shown iff its category is in the set
    Only(HashSet<DeviceCategory>),
}

impl CategoryFilter {
    pub fn matches(&self, category: DeviceCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(set) => set.contains(&category),
        }
    }
}

/// A live device owned by the registry
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub descriptor: DeviceDescriptor,
    /// Resolved position: explicit from the descriptor, else assigned
    /// by the grid layout
    pub position: [f32; 3],
    /// Current filter state
    pub visible: bool,
    /// Bumped when a same-name load replaces this entry, so the scene
    /// layer tears down the old visual
    pub revision: u64,
    auto_placed: bool,
}

/// Owned set of live devices, keyed by unique name.
///
/// No ambient state: one registry per scene session, passed by
/// reference to every consumer.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    entries: Vec<RegistryEntry>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a batch of descriptors, in input order. Returns the
    /// number of committed devices.
    ///
    /// A descriptor with an empty name is logged and skipped; the
    /// batch continues. Loading a name that already exists replaces
    /// the prior entry atomically (revision bump) rather than leaving
    /// two entries alive under one name.
    pub fn load(&mut self, descriptors: Vec<DeviceDescriptor>) -> usize {
        let mut committed = 0;
        for descriptor in descriptors {
            if descriptor.name.trim().is_empty() {
                tracing::warn!("Skipping device with empty name");
                continue;
            }

            let position = descriptor.position;
            let auto_placed = position.is_none();

            if let Some(entry) = self.entries.iter_mut().find(|e| e.descriptor.name == descriptor.name)
            {
                tracing::debug!(name = %descriptor.name, "Replacing existing device");
                entry.revision += 1;
                entry.position = position.unwrap_or(entry.position);
                entry.auto_placed = auto_placed;
                entry.descriptor = descriptor;
            } else {
                self.entries.push(RegistryEntry {
                    descriptor,
                    position: position.unwrap_or([0.0, 0.0, GRID_ELEVATION]),
                    visible: true,
                    revision: 0,
                    auto_placed,
                });
            }
            committed += 1;
        }

        self.relayout();
        committed
    }

    /// Assign grid positions to auto-placed entries.
    ///
    /// The grid side is the smallest integer whose square holds every
    /// device plus one spare cell; rows and columns come from the
    /// entry's insertion index, so placement is deterministic in
    /// insertion order and auto-placed devices never collide. All
    /// auto entries are re-laid-out together when the grid grows;
    /// explicit positions are never touched.
    fn relayout(&mut self) {
        let side = grid_side(self.entries.len());
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.auto_placed {
                entry.position = grid_position(index, side);
            }
        }
    }

    /// All entries, in insertion order
    pub fn devices(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entries whose resolved category matches exactly
    pub fn by_category(&self, category: DeviceCategory) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter().filter(move |e| e.descriptor.category == category)
    }

    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|e| e.visible).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute every entry's visibility from the selection.
    ///
    /// Total and idempotent: applying the same selection twice yields
    /// the same visible set. Label visibility follows the device (the
    /// scene layer ANDs its own label toggle with `visible`).
    pub fn filter_by_categories(&mut self, filter: &CategoryFilter) {
        for entry in &mut self.entries {
            entry.visible = filter.matches(entry.descriptor.category);
        }
    }
}

/// Smallest grid side whose cell count covers `count + 1` devices
pub fn grid_side(count: usize) -> usize {
    let mut side = 1;
    while side * side < count + 1 {
        side += 1;
    }
    side
}

/// Cell position for an insertion index on a grid of the given side,
/// centered on the origin at a fixed elevation
pub fn grid_position(index: usize, side: usize) -> [f32; 3] {
    let col = (index % side) as f32;
    let row = (index / side) as f32;
    let origin = -((side as f32 - 1.0) * GRID_SPACING) / 2.0;
    [origin + col * GRID_SPACING, origin + row * GRID_SPACING, GRID_ELEVATION]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceStatus;

    fn descriptor(name: &str, category: DeviceCategory) -> DeviceDescriptor {
        DeviceDescriptor::new(name, category)
    }

    #[test]
    fn test_load_commits_in_order() {
        let mut registry = DeviceRegistry::new();
        let count = registry.load(vec![
            descriptor("fw-1", DeviceCategory::Firewall),
            descriptor("sw-1", DeviceCategory::Switch),
            descriptor("ap-1", DeviceCategory::AccessPoint),
        ]);
        assert_eq!(count, 3);
        let names: Vec<_> = registry.devices().map(|e| e.descriptor.name.as_str()).collect();
        assert_eq!(names, ["fw-1", "sw-1", "ap-1"]);
    }

    #[test]
    fn test_load_skips_empty_name_and_continues() {
        let mut registry = DeviceRegistry::new();
        let count = registry.load(vec![
            descriptor("fw-1", DeviceCategory::Firewall),
            descriptor("", DeviceCategory::Switch),
            descriptor("sw-1", DeviceCategory::Switch),
        ]);
        assert_eq!(count, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_replaces_atomically() {
        let mut registry = DeviceRegistry::new();
        registry.load(vec![descriptor("fw-1", DeviceCategory::Firewall)]);
        assert_eq!(registry.get("fw-1").unwrap().revision, 0);

        let mut updated = descriptor("fw-1", DeviceCategory::Firewall);
        updated.status = Some(DeviceStatus::Offline);
        registry.load(vec![updated]);

        assert_eq!(registry.len(), 1);
        let entry = registry.get("fw-1").unwrap();
        assert_eq!(entry.revision, 1);
        assert_eq!(entry.descriptor.status, Some(DeviceStatus::Offline));
    }

    #[test]
    fn test_auto_layout_positions_are_distinct() {
        let mut registry = DeviceRegistry::new();
        let descriptors: Vec<_> = (0..12)
            .map(|i| descriptor(&format!("ep-{i}"), DeviceCategory::Endpoint))
            .collect();
        registry.load(descriptors);

        let positions: Vec<_> = registry.devices().map(|e| e.position).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_auto_layout_distinct_across_batches() {
        // Grid growth across load calls must not produce collisions
        let mut registry = DeviceRegistry::new();
        for i in 0..9 {
            registry.load(vec![descriptor(&format!("ep-{i}"), DeviceCategory::Endpoint)]);
        }
        let positions: Vec<_> = registry.devices().map(|e| e.position).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_explicit_position_is_never_moved() {
        let mut registry = DeviceRegistry::new();
        let mut pinned = descriptor("fw-1", DeviceCategory::Firewall);
        pinned.position = Some([1.0, 2.0, 3.0]);
        registry.load(vec![pinned]);
        registry.load(
            (0..8)
                .map(|i| descriptor(&format!("ep-{i}"), DeviceCategory::Endpoint))
                .collect(),
        );
        assert_eq!(registry.get("fw-1").unwrap().position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_layout_deterministic() {
        let build = || {
            let mut registry = DeviceRegistry::new();
            registry.load(
                (0..7)
                    .map(|i| descriptor(&format!("d-{i}"), DeviceCategory::Endpoint))
                    .collect(),
            );
            registry.devices().map(|e| e.position).collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_filter_all_and_subset() {
        let mut registry = DeviceRegistry::new();
        registry.load(vec![
            descriptor("fw-1", DeviceCategory::Firewall),
            descriptor("fw-2", DeviceCategory::Firewall),
            descriptor("sw-1", DeviceCategory::Switch),
            descriptor("sw-2", DeviceCategory::Switch),
            descriptor("sw-3", DeviceCategory::Switch),
        ]);

        registry.filter_by_categories(&CategoryFilter::All);
        assert_eq!(registry.visible_count(), 5);

        let only_firewalls =
            CategoryFilter::Only([DeviceCategory::Firewall].into_iter().collect());
        registry.filter_by_categories(&only_firewalls);
        assert_eq!(registry.visible_count(), 2);

        // Idempotent: same selection, same visible set
        registry.filter_by_categories(&only_firewalls);
        assert_eq!(registry.visible_count(), 2);

        registry.filter_by_categories(&CategoryFilter::All);
        assert_eq!(registry.visible_count(), 5);
    }

    #[test]
    fn test_by_category_exact_match() {
        let mut registry = DeviceRegistry::new();
        registry.load(vec![
            descriptor("fw-1", DeviceCategory::Firewall),
            descriptor("sw-1", DeviceCategory::Switch),
            descriptor("odd", DeviceCategory::Unknown),
        ]);
        assert_eq!(registry.by_category(DeviceCategory::Firewall).count(), 1);
        assert_eq!(registry.by_category(DeviceCategory::Router).count(), 0);
        assert_eq!(registry.by_category(DeviceCategory::Unknown).count(), 1);
    }

    #[test]
    fn test_grid_side() {
        assert_eq!(grid_side(0), 1);
        assert_eq!(grid_side(3), 2);
        assert_eq!(grid_side(4), 3);
        assert_eq!(grid_side(8), 3);
        assert_eq!(grid_side(9), 4);
    }
}
