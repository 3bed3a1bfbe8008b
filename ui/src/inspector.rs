use busnet_core::{DeviceId, EventLog, Simulation};
use eframe::egui;

use crate::theme::*;

pub fn render_inspector(ui: &mut egui::Ui, simulation: &Simulation, focused: Option<DeviceId>) {
    ui.add_space(15.0);
    ui.heading("Properties");
    ui.add_space(10.0);

    ui.label(format!("Bus: {}", simulation.bus_status()));
    match simulation.active_transmission() {
        Some(active) => ui.label(format!("On air: Device {} ({})", active.sender, active.id)),
        None => ui.label(egui::RichText::new("On air: -").color(COLOR_TEXT_DIM)),
    };
    ui.label(format!(
        "Working devices: {} / {}",
        simulation.working_devices().len(),
        simulation.devices().len()
    ));

    ui.separator();

    let Some(device) = focused.and_then(|id| simulation.device(id)) else {
        ui.label(egui::RichText::new("Hover or click a device\nto see its counters").color(COLOR_TEXT_DIM));
        return;
    };

    let status_color = if device.failed { COLOR_CRITICAL } else { COLOR_SUCCESS };
    ui.label(egui::RichText::new(format!("Device {}", device.id)).strong());
    egui::Grid::new("device_stats").num_columns(2).show(ui, |ui| {
        ui.label("Status");
        ui.label(egui::RichText::new(device.status.to_string()).color(status_color));
        ui.end_row();
        ui.label("Sent");
        ui.label(device.stats.sent.to_string());
        ui.end_row();
        ui.label("Received");
        ui.label(device.stats.received.to_string());
        ui.end_row();
        ui.label("Collisions");
        ui.label(device.stats.collisions.to_string());
        ui.end_row();
    });
}

/// Retained entries, newest on top.
pub fn render_event_log(ui: &mut egui::Ui, log: &EventLog) {
    ui.add_space(20.0);
    ui.separator();
    ui.label(egui::RichText::new("EVENT LOG").small().strong().color(COLOR_WARN));
    ui.add_space(6.0);

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for entry in log.newest_first() {
            ui.label(
                egui::RichText::new(entry.to_string())
                    .monospace()
                    .size(11.0)
                    .color(level_color(entry.level())),
            );
        }
    });
}
