use egui::{Color32, Response, Sense, Stroke, Ui};

const SWATCH_SIZE: f32 = 32.0;
const SELECTED_RING: Color32 = Color32::from_rgb(31, 41, 55);

/// Square palette button filled with its color
pub struct ColorSwatch {
    pub color: Color32,
    pub selected: bool,
}

impl ColorSwatch {
    pub fn new(color: Color32, selected: bool) -> Self {
        Self { color, selected }
    }

    pub fn show(&self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), Sense::click());

        if ui.is_rect_visible(rect) {
            let rect = if response.hovered() { rect } else { rect.shrink(1.0) };
            ui.painter().rect_filled(rect, 6.0, self.color);

            let border = if self.selected {
                Stroke::new(2.5, SELECTED_RING)
            } else {
                Stroke::new(1.0, Color32::from_gray(200))
            };
            ui.painter().rect_stroke(rect, 6.0, border);
        }

        response
    }
}
