use busnet_core::LogLevel;
use eframe::egui;

pub const COLOR_BG: egui::Color32 = egui::Color32::from_rgb(0, 0, 0);
pub const COLOR_PANEL: egui::Color32 = egui::Color32::from_rgb(0, 20, 0);
pub const COLOR_ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 255, 0);
pub const COLOR_TEXT: egui::Color32 = egui::Color32::from_rgb(200, 255, 200);
pub const COLOR_TEXT_DIM: egui::Color32 = egui::Color32::from_rgb(0, 140, 0);
pub const COLOR_WARN: egui::Color32 = egui::Color32::from_rgb(255, 255, 0);
pub const COLOR_CRITICAL: egui::Color32 = egui::Color32::from_rgb(255, 0, 0);
pub const COLOR_SUCCESS: egui::Color32 = egui::Color32::from_rgb(0, 255, 0);
pub const COLOR_DEVICE_FILL: egui::Color32 = egui::Color32::from_rgb(0, 32, 0);
pub const COLOR_DEVICE_FAILED_FILL: egui::Color32 = egui::Color32::from_rgb(64, 0, 0);

pub fn level_color(level: LogLevel) -> egui::Color32 {
    match level {
        LogLevel::Info => COLOR_TEXT,
        LogLevel::Success => COLOR_SUCCESS,
        LogLevel::Warning => COLOR_WARN,
        LogLevel::Error => COLOR_CRITICAL,
    }
}
