use crate::analytics::SparklineWidget;
use crate::inspector::{render_event_log, render_inspector};
use crate::palette::render_controls;
use crate::theme::*;
use busnet_core::{AnalyticsError, DeviceId, MetricPoint, MetricsCollector, SimConfig, Simulation};
use eframe::egui;

/// Catch-up cap so a stalled frame does not replay seconds of ticks at once.
const MAX_TICKS_PER_FRAME: u32 = 10;

pub struct BusnetApp {
    pub simulation: Simulation,
    pub metrics: MetricsCollector,
    pub is_running: bool,
    pub sim_speed: f32,
    pub hovered_device: Option<DeviceId>,
    pub selected_device: Option<DeviceId>,
    pub pan: egui::Vec2,
    pub zoom: f32,
    pending_ticks: f64,
    last_frame_time: f64,
}

impl BusnetApp {
    pub fn new(config: SimConfig) -> Result<Self, AnalyticsError> {
        Ok(Self {
            simulation: Simulation::new(config),
            metrics: MetricsCollector::new(120)?,
            is_running: true,
            sim_speed: 1.0,
            hovered_device: None,
            selected_device: None,
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            pending_ticks: 0.0,
            last_frame_time: 0.0,
        })
    }

    pub fn reset(&mut self) {
        self.simulation.reset();
        self.metrics.reset();
        self.selected_device = None;
        self.pending_ticks = 0.0;
    }

    /// Converts elapsed wall time into whole ticks at the configured rate.
    fn advance(&mut self, dt: f64) {
        let hz = f64::from(self.simulation.config().tick_rate_hz);
        self.pending_ticks += dt * hz * f64::from(self.sim_speed);
        let mut processed = 0;
        while self.pending_ticks >= 1.0 && processed < MAX_TICKS_PER_FRAME {
            self.simulation.tick();
            self.metrics.update(&self.simulation);
            self.pending_ticks -= 1.0;
            processed += 1;
        }
        if processed == MAX_TICKS_PER_FRAME {
            self.pending_ticks = 0.0;
        }
    }
}

impl eframe::App for BusnetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let current_real_time = ctx.input(|i| i.time);
        let dt = (current_real_time - self.last_frame_time).max(0.0);
        self.last_frame_time = current_real_time;

        if self.is_running {
            self.advance(dt);
            ctx.request_repaint();
        }

        egui::TopBottomPanel::bottom("bottom_dashboard")
            .frame(egui::Frame::none().fill(COLOR_PANEL).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let history: Vec<MetricPoint> = self.metrics.history.iter().copied().collect();

                    let cur_sent = history.last().map(|m| m.sent_per_s).unwrap_or(0.0);
                    ui.add(SparklineWidget::new(
                        "DELIVERED",
                        &history,
                        |m| m.sent_per_s,
                        COLOR_SUCCESS,
                        format!("{:.2} /s", cur_sent),
                    ));

                    ui.add_space(8.0);

                    let cur_collisions = history.last().map(|m| m.collisions_per_s).unwrap_or(0.0);
                    ui.add(SparklineWidget::new(
                        "COLLISIONS",
                        &history,
                        |m| m.collisions_per_s,
                        COLOR_CRITICAL,
                        format!("{:.2} /s", cur_collisions),
                    ));

                    ui.add_space(8.0);

                    let working = history.last().map(|m| m.working_devices).unwrap_or(0);
                    ui.add(SparklineWidget::new(
                        "WORKING",
                        &history,
                        |m| m.working_devices as f32,
                        COLOR_WARN,
                        format!("{working} / {}", busnet_core::DEVICE_COUNT),
                    ));

                    ui.add_space(15.0);

                    let airtime = match (
                        self.metrics.airtime_percentile(50.0),
                        self.metrics.airtime_percentile(99.0),
                    ) {
                        (Some(p50), Some(p99)) => format!("{p50} / {p99} ticks"),
                        _ => "-".to_string(),
                    };
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(airtime).strong().color(COLOR_TEXT));
                        ui.label(
                            egui::RichText::new(format!(
                                "AIRTIME P50/P99  ({} ok, {} aborted)",
                                self.metrics.completed(),
                                self.metrics.aborted()
                            ))
                            .small()
                            .color(COLOR_TEXT_DIM),
                        );
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.vertical(|ui| {
                            let hz = self.simulation.config().tick_rate_hz.max(1);
                            ui.label(
                                egui::RichText::new(format!(
                                    "{:.1}s",
                                    self.simulation.current_tick() as f32 / hz as f32
                                ))
                                .strong()
                                .color(COLOR_TEXT),
                            );
                            ui.label(egui::RichText::new("V-CLOCK").small().color(COLOR_TEXT_DIM));
                        });
                    });
                });
            });

        egui::SidePanel::left("controls")
            .default_width(200.0)
            .show(ctx, |ui| {
                render_controls(ui, self);
            });
        egui::SidePanel::right("inspector")
            .default_width(320.0)
            .show(ctx, |ui| {
                render_inspector(
                    ui,
                    &self.simulation,
                    self.selected_device.or(self.hovered_device),
                );
                render_event_log(ui, self.simulation.log());
            });
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(COLOR_BG))
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });
    }
}
