use crate::app::BusnetApp;
use crate::theme::*;
use busnet_core::network::{tap_point, BUS_MARGIN};
use busnet_core::{Device, DeviceStatus, Phase, Point, BUS_Y, CANVAS_HEIGHT, CANVAS_WIDTH};
use eframe::egui;

const DEVICE_SIZE: egui::Vec2 = egui::Vec2::new(60.0, 40.0);
const PACKET_RADIUS: f32 = 5.0;

impl BusnetApp {
    fn world_to_screen(&self, pos: Point) -> egui::Pos2 {
        egui::pos2(pos.x * self.zoom + self.pan.x, pos.y * self.zoom + self.pan.y)
    }

    fn screen_to_world(&self, pos: egui::Pos2) -> Point {
        Point::new((pos.x - self.pan.x) / self.zoom, (pos.y - self.pan.y) / self.zoom)
    }

    /// Scales the fixed layout to fit the panel, centred.
    fn fit_to_view(&mut self, rect: egui::Rect) {
        self.zoom = (rect.width() / CANVAS_WIDTH).min(rect.height() / CANVAS_HEIGHT).max(0.1);
        let world = egui::vec2(CANVAS_WIDTH, CANVAS_HEIGHT) * self.zoom;
        self.pan = rect.center().to_vec2() - world * 0.5;
    }

    pub fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
        self.fit_to_view(response.rect);

        let pointer = response.hover_pos();
        self.hovered_device = pointer
            .map(|pos| self.screen_to_world(pos))
            .and_then(|world| self.simulation.device_at(world))
            .map(|d| d.id);
        if response.clicked() {
            self.selected_device = self.hovered_device;
        }

        let bus = self.simulation.bus();
        let bus_color = if bus.failed { COLOR_CRITICAL } else { COLOR_SUCCESS };
        painter.line_segment(
            [
                self.world_to_screen(Point::new(BUS_MARGIN, BUS_Y)),
                self.world_to_screen(Point::new(CANVAS_WIDTH - BUS_MARGIN, BUS_Y)),
            ],
            egui::Stroke::new(4.0 * self.zoom, bus_color),
        );

        for device in self.simulation.devices() {
            self.draw_device(&painter, device);
        }

        for packet in self.simulation.packets() {
            let color = if packet.is_collision { COLOR_CRITICAL } else { COLOR_SUCCESS };
            if packet.phase == Phase::Ascending {
                for (_, at) in self.simulation.receiver_positions(packet) {
                    painter.circle_filled(self.world_to_screen(at), PACKET_RADIUS * self.zoom, color);
                }
            }
            painter.circle_filled(self.world_to_screen(packet.position()), PACKET_RADIUS * self.zoom, color);
        }

        for ring in self.simulation.collisions() {
            let alpha = ring.alpha.clamp(0.0, 255.0) as u8;
            painter.circle_filled(
                self.world_to_screen(ring.position),
                ring.size * 0.5 * self.zoom,
                egui::Color32::from_rgba_unmultiplied(255, 0, 0, alpha),
            );
        }

        painter.text(
            self.world_to_screen(Point::new(BUS_MARGIN, 30.0)),
            egui::Align2::LEFT_CENTER,
            format!("Bus Status: {}", self.simulation.bus_status()),
            egui::FontId::proportional(14.0 * self.zoom),
            COLOR_ACCENT,
        );

        if let (Some(id), Some(pos)) = (self.hovered_device, pointer) {
            if let Some(device) = self.simulation.device(id) {
                draw_details_card(&painter, device, pos);
            }
        }
    }

    fn draw_device(&self, painter: &egui::Painter, device: &Device) {
        let line_color = if device.failed { COLOR_CRITICAL } else { COLOR_SUCCESS };
        painter.line_segment(
            [self.world_to_screen(device.anchor), self.world_to_screen(tap_point(device.anchor))],
            egui::Stroke::new(2.0 * self.zoom, line_color),
        );

        let center = self.world_to_screen(device.anchor);
        let rect = egui::Rect::from_center_size(center, DEVICE_SIZE * self.zoom);
        let fill = if device.failed { COLOR_DEVICE_FAILED_FILL } else { COLOR_DEVICE_FILL };
        painter.rect_filled(rect, 0.0, fill);
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0 * self.zoom, line_color));

        painter.text(
            center - egui::vec2(0.0, 8.0 * self.zoom),
            egui::Align2::CENTER_CENTER,
            device.id.to_string(),
            egui::FontId::proportional(14.0 * self.zoom),
            COLOR_ACCENT,
        );
        painter.text(
            center + egui::vec2(0.0, 8.0 * self.zoom),
            egui::Align2::CENTER_CENTER,
            device.status.to_string(),
            egui::FontId::proportional(10.0 * self.zoom),
            COLOR_ACCENT,
        );

        if device.status == DeviceStatus::Sending {
            // Indicator sits on the bus-facing side of the box.
            let dy = if device.anchor.y < BUS_Y { 25.0 } else { -25.0 };
            let at = Point::new(device.anchor.x + 35.0, device.anchor.y + dy);
            painter.circle_filled(self.world_to_screen(at), 5.0 * self.zoom, COLOR_WARN);
        }
    }
}

fn draw_details_card(painter: &egui::Painter, device: &Device, pointer: egui::Pos2) {
    let card = egui::Rect::from_min_size(pointer + egui::vec2(10.0, 10.0), egui::vec2(160.0, 88.0));
    painter.rect_filled(card, 4.0, egui::Color32::WHITE);

    let lines = [
        format!("Device ID: {}", device.id),
        format!("Status: {}", device.status),
        format!("Packets Sent: {}", device.stats.sent),
        format!("Packets Received: {}", device.stats.received),
        format!("Collisions: {}", device.stats.collisions),
    ];
    for (i, line) in lines.iter().enumerate() {
        painter.text(
            card.left_top() + egui::vec2(6.0, 8.0 + i as f32 * 15.0),
            egui::Align2::LEFT_TOP,
            line,
            egui::FontId::proportional(12.0),
            egui::Color32::BLACK,
        );
    }
}
