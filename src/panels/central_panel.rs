use egui::{Align2, Color32, CursorIcon, FontId, Sense, Stroke, load::SizedTexture};

use crate::SketchApp;

pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Drawing Canvas");

        let texture = app.canvas_texture(ctx);
        let surface = app.canvas().surface();
        let size = egui::vec2(surface.width() as f32, surface.height() as f32);

        let response = ui.add(egui::Image::from_texture(SizedTexture::new(texture, size)).sense(Sense::drag()));
        let canvas_rect = response.rect;
        ui.painter()
            .rect_stroke(canvas_rect, 0.0, Stroke::new(1.0, Color32::from_gray(180)));

        // Current tool in the corner, like a status badge
        ui.painter().text(
            canvas_rect.right_top() + egui::vec2(-8.0, 8.0),
            Align2::RIGHT_TOP,
            format!("Tool: {}", app.canvas().tool().name()),
            FontId::proportional(12.0),
            Color32::from_gray(110),
        );

        if response.hovered() {
            ctx.set_cursor_icon(CursorIcon::Crosshair);
        }

        // Modal prompts own the pointer while they are open
        if app.show_clear_confirm || app.canvas().pending_text().is_some() {
            app.input.cancel();
            return;
        }

        app.input.set_canvas_rect(canvas_rect);
        let events = app.input.process_input(ctx);
        app.handle_canvas_input(events);
    });
}
