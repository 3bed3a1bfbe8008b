use crate::theme::*;
use busnet_core::MetricPoint;
use eframe::egui;

const SIZE: egui::Vec2 = egui::Vec2::new(180.0, 45.0);
const HEADER_HEIGHT: f32 = 18.0;

/// Trend line over the once-per-second samples of one metric.
pub struct SparklineWidget {
    label: &'static str,
    values: Vec<f32>,
    color: egui::Color32,
    readout: String,
    /// Lowest top-of-scale value, so near-zero rates do not fill the box.
    floor: f32,
}

impl SparklineWidget {
    pub fn new(
        label: &'static str,
        history: &[MetricPoint],
        metric: impl Fn(&MetricPoint) -> f32,
        color: egui::Color32,
        readout: String,
    ) -> Self {
        Self {
            label,
            values: history.iter().map(metric).collect(),
            color,
            readout,
            floor: 0.05,
        }
    }

    fn plot(&self, area: egui::Rect) -> Vec<egui::Pos2> {
        let top = self.values.iter().copied().fold(self.floor, f32::max);
        let last = (self.values.len() - 1).max(1) as f32;
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = area.left() + area.width() * i as f32 / last;
                let y = area.bottom() - 2.0 - (v / top) * area.height() * 0.8;
                egui::pos2(x, y)
            })
            .collect()
    }
}

impl egui::Widget for SparklineWidget {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(SIZE, egui::Sense::hover());
        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter();
        painter.rect_filled(rect, 2.0, COLOR_PANEL);
        painter.rect_stroke(rect, 2.0, egui::Stroke::new(1.0, COLOR_TEXT_DIM));

        let area = egui::Rect::from_min_max(rect.left_top() + egui::vec2(0.0, HEADER_HEIGHT), rect.right_bottom());
        if self.values.len() < 2 {
            painter.text(
                area.center(),
                egui::Align2::CENTER_CENTER,
                "WAITING FOR SAMPLES",
                egui::FontId::proportional(10.0),
                COLOR_TEXT_DIM,
            );
        } else {
            let line = self.plot(area);
            let mut fill = line.clone();
            fill.push(area.right_bottom());
            fill.push(area.left_bottom());
            painter.add(egui::Shape::convex_polygon(fill, self.color.gamma_multiply(0.15), egui::Stroke::NONE));
            painter.add(egui::Shape::line(line, egui::Stroke::new(1.5, self.color)));
        }

        painter.text(
            rect.left_top() + egui::vec2(8.0, 4.0),
            egui::Align2::LEFT_TOP,
            self.label,
            egui::FontId::proportional(10.0),
            COLOR_TEXT_DIM,
        );
        painter.text(
            rect.right_top() + egui::vec2(-8.0, 4.0),
            egui::Align2::RIGHT_TOP,
            &self.readout,
            egui::FontId::proportional(13.0),
            self.color,
        );
        response
    }
}
