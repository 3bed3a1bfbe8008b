use crate::app::BusnetApp;
use crate::theme::*;
use eframe::egui;

fn action_button(ui: &mut egui::Ui, label: &str, color: egui::Color32) -> bool {
    ui.add_sized(
        [ui.available_width(), 32.0],
        egui::Button::new(egui::RichText::new(label).color(color)).fill(color.gamma_multiply(0.15)),
    )
    .clicked()
}

pub fn render_controls(ui: &mut egui::Ui, app: &mut BusnetApp) {
    ui.add_space(15.0);
    ui.heading("Network");
    ui.add_space(10.0);

    let bus_down = app.simulation.bus().failed;
    if action_button(ui, "Start Transmission", COLOR_SUCCESS) {
        app.simulation.start_transmission();
    }
    ui.add_space(6.0);
    if action_button(ui, "Simulate Collision", COLOR_WARN) {
        app.simulation.simulate_collision(None);
    }

    ui.add_space(20.0);
    ui.label(egui::RichText::new("FAILURE INJECTION").small().strong().color(COLOR_WARN));
    ui.add_space(6.0);
    if action_button(ui, "Fail Device", COLOR_CRITICAL) {
        app.simulation.inject_device_failure();
    }
    ui.add_space(6.0);
    let bus_label = if bus_down { "Bus Failed" } else { "Fail Bus" };
    if action_button(ui, bus_label, COLOR_CRITICAL) {
        app.simulation.inject_bus_failure();
    }

    ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
        ui.add_space(15.0);
        if ui.button(egui::RichText::new("Reset Simulation").color(COLOR_CRITICAL)).clicked() {
            app.reset();
        }

        ui.add_space(10.0);
        let btn = if app.is_running { "⏸ Pause" } else { "▶ Run" };
        if ui
            .add_sized([ui.available_width(), 35.0], egui::Button::new(btn).fill(COLOR_ACCENT.gamma_multiply(0.2)))
            .clicked()
        {
            app.is_running = !app.is_running;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);
        ui.add(egui::Slider::new(&mut app.sim_speed, 0.1..=10.0).suffix("x").logarithmic(true));
        ui.label("Time Speed:");
        ui.label(egui::RichText::new("SIMULATION").small().color(COLOR_TEXT_DIM));
    });
}
