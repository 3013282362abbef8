//! UI overlays using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use crate::camera::CameraSettings;
use crate::types::{
    CategoryFilterState, DeviceClicked, NetworkRegistry, SceneConnections, SelectedDevice,
    UiLayout, ViewSettings,
};
use netviz_core::{DeviceCategory, DeviceStatus};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiLayout>()
            .add_systems(Update, open_details_on_click)
            // Main UI runs in EguiPrimaryContextPass for proper input
            // handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Clicking a device opens the detail panel
fn open_details_on_click(
    mut clicks: MessageReader<DeviceClicked>,
    mut ui_layout: ResMut<UiLayout>,
) {
    for click in clicks.read() {
        tracing::debug!(device = %click.detail.name, "Device clicked");
        ui_layout.show_right_panel = true;
    }
}

fn status_color(status: Option<DeviceStatus>) -> egui::Color32 {
    match status {
        Some(DeviceStatus::Online) => egui::Color32::GREEN,
        Some(DeviceStatus::Offline) => egui::Color32::RED,
        _ => egui::Color32::GRAY,
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    mut registry: ResMut<NetworkRegistry>,
    connections: Res<SceneConnections>,
    mut selected: ResMut<SelectedDevice>,
    mut settings: ResMut<ViewSettings>,
    mut filter_state: ResMut<CategoryFilterState>,
    mut camera_settings: ResMut<CameraSettings>,
    mut ui_layout: ResMut<UiLayout>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    // Status bar: counts and view toggles
    egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui
                .button(if ui_layout.show_left_panel { "☰" } else { "☰ Devices" })
                .clicked()
            {
                ui_layout.show_left_panel = !ui_layout.show_left_panel;
            }
            ui.separator();
            ui.label(format!(
                "{} / {} devices visible",
                registry.visible_count(),
                registry.len()
            ));
            ui.separator();
            ui.label(format!("{} connections", connections.len()));
            ui.separator();
            ui.checkbox(&mut settings.show_labels, "Labels");
            ui.checkbox(&mut settings.show_links, "Links");
            ui.checkbox(&mut settings.show_grid, "Grid");
            ui.checkbox(&mut settings.idle_animation, "Animate");
        });
    });

    // Device list and category filters (left side)
    if ui_layout.show_left_panel {
        egui::SidePanel::left("devices_panel")
            .default_width(250.0)
            .show(ctx, |ui| {
                ui.heading("Devices");
                ui.separator();

                let mut filter_changed = false;
                egui::CollapsingHeader::new("Filter")
                    .default_open(true)
                    .show(ui, |ui| {
                        if ui.checkbox(&mut filter_state.all, "All").changed() {
                            filter_changed = true;
                        }
                        for category in DeviceCategory::ALL {
                            let count = registry.by_category(category).count();
                            let mut checked = filter_state.selected.contains(&category);
                            let label = format!("{} ({})", category.label(), count);
                            if ui
                                .add_enabled(!filter_state.all, egui::Checkbox::new(&mut checked, label))
                                .changed()
                            {
                                if checked {
                                    filter_state.selected.insert(category);
                                } else {
                                    filter_state.selected.remove(&category);
                                }
                                filter_changed = true;
                            }
                        }
                    });
                if filter_changed {
                    registry.filter_by_categories(&filter_state.to_filter());
                }

                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let entries: Vec<_> = registry
                        .devices()
                        .map(|e| {
                            (
                                e.descriptor.name.clone(),
                                e.descriptor.label().to_string(),
                                e.descriptor.status,
                                e.visible,
                                e.position,
                            )
                        })
                        .collect();

                    for (name, label, status, visible, position) in entries {
                        ui.horizontal(|ui| {
                            ui.colored_label(status_color(status), "●");
                            let is_selected = selected.0.as_deref() == Some(name.as_str());
                            let text = if visible {
                                egui::RichText::new(label)
                            } else {
                                egui::RichText::new(label).weak()
                            };
                            if ui.selectable_label(is_selected, text).clicked() {
                                selected.0 = Some(name.clone());
                                camera_settings.target_focus = Vec3::from(position);
                                ui_layout.show_right_panel = true;
                            }
                        });
                    }
                });
            });
    }

    // Detail panel (right side): present fields only
    if ui_layout.show_right_panel {
        if let Some(name) = selected.0.clone() {
            if let Some(entry) = registry.get(&name) {
                let descriptor = entry.descriptor.clone();
                egui::SidePanel::right("details_panel")
                    .default_width(260.0)
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            ui.heading(descriptor.label());
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.button("✕").clicked() {
                                        ui_layout.show_right_panel = false;
                                    }
                                },
                            );
                        });
                        ui.separator();

                        egui::Grid::new("device_details").num_columns(2).show(ui, |ui| {
                            ui.label("Category");
                            ui.label(descriptor.category.label());
                            ui.end_row();

                            for (key, value) in descriptor.detail_fields() {
                                ui.label(key);
                                ui.label(value);
                                ui.end_row();
                            }
                        });
                    });
            }
        }
    }
}
