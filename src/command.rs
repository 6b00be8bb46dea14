use egui::{Color32, Pos2};

use crate::surface::DrawingSurface;

/// A single drawing instruction, consumed as soon as it is applied.
///
/// Only the pixels it produces are kept; undo works on surface snapshots, not
/// on these.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Continuous pen path through the points, in order
    Freehand { points: Vec<Pos2>, color: Color32 },
    Rectangle { start: Pos2, end: Pos2, color: Color32 },
    Circle { center: Pos2, edge: Pos2, color: Color32 },
    Text { position: Pos2, text: String, color: Color32 },
}

impl DrawCommand {
    pub fn execute(&self, surface: &mut DrawingSurface) {
        match self {
            DrawCommand::Freehand { points, color } => surface.draw_freehand(points, *color),
            DrawCommand::Rectangle { start, end, color } => {
                surface.draw_rectangle(*start, *end, *color)
            }
            DrawCommand::Circle { center, edge, color } => {
                surface.draw_circle(*center, *edge, *color)
            }
            DrawCommand::Text {
                position,
                text,
                color,
            } => surface.draw_text(*position, text, *color),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DrawCommand::Freehand { .. } => "Freehand",
            DrawCommand::Rectangle { .. } => "Rectangle",
            DrawCommand::Circle { .. } => "Circle",
            DrawCommand::Text { .. } => "Text",
        }
    }
}
