use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::command::DrawCommand;

mod pen_tool;
mod shape_tool;
mod text_tool;

pub use pen_tool::PenTool;
pub use shape_tool::{ShapeKind, ShapeTool};
pub use text_tool::TextTool;

/// Identity of a tool, stable across restarts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Pen,
    Rectangle,
    Circle,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Pen,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Text => "text",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Pen => "✏ Pen",
            ToolKind::Rectangle => "⬜ Rectangle",
            ToolKind::Circle => "⭕ Circle",
            ToolKind::Text => "🔤 Text",
        }
    }

    pub fn tooltip(self) -> &'static str {
        match self {
            ToolKind::Pen => "Freehand drawing",
            ToolKind::Rectangle => "Draw rectangles (Deployments)",
            ToolKind::Circle => "Draw circles (Services)",
            ToolKind::Text => "Add text labels",
        }
    }
}

/// What the canvas should do in response to a pointer event
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    None,
    /// Paint now; the gesture continues
    Draw(DrawCommand),
    /// Paint now; the gesture is over and the result belongs in history
    Commit(DrawCommand),
    /// The gesture is over and its ink is already on the surface
    Finish,
    /// Ask the user for a label to place at the position
    RequestText(Pos2),
}

/// Interface shared by all drawing tools.
///
/// Positions are in surface coordinates.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Drop any gesture in progress
    fn reset(&mut self);

    /// True while a pointer gesture is in progress
    fn is_active(&self) -> bool;

    fn on_pointer_down(&mut self, pos: Pos2, color: Color32) -> ToolAction;

    fn on_pointer_move(&mut self, pos: Pos2, color: Color32) -> ToolAction;

    fn on_pointer_up(&mut self, pos: Pos2, color: Color32) -> ToolAction;
}

/// Enum over all tools so the active one can be held by value
#[derive(Debug, Clone)]
pub enum ToolType {
    Pen(PenTool),
    Shape(ShapeTool),
    Text(TextTool),
}

impl ToolType {
    pub fn new(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Pen => Self::Pen(PenTool::new()),
            ToolKind::Rectangle => Self::Shape(ShapeTool::new(ShapeKind::Rectangle)),
            ToolKind::Circle => Self::Shape(ShapeTool::new(ShapeKind::Circle)),
            ToolKind::Text => Self::Text(TextTool::new()),
        }
    }
}

impl Default for ToolType {
    fn default() -> Self {
        Self::new(ToolKind::default())
    }
}

impl Tool for ToolType {
    fn kind(&self) -> ToolKind {
        match self {
            Self::Pen(tool) => tool.kind(),
            Self::Shape(tool) => tool.kind(),
            Self::Text(tool) => tool.kind(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Pen(tool) => tool.reset(),
            Self::Shape(tool) => tool.reset(),
            Self::Text(tool) => tool.reset(),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Self::Pen(tool) => tool.is_active(),
            Self::Shape(tool) => tool.is_active(),
            Self::Text(tool) => tool.is_active(),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, color: Color32) -> ToolAction {
        match self {
            Self::Pen(tool) => tool.on_pointer_down(pos, color),
            Self::Shape(tool) => tool.on_pointer_down(pos, color),
            Self::Text(tool) => tool.on_pointer_down(pos, color),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, color: Color32) -> ToolAction {
        match self {
            Self::Pen(tool) => tool.on_pointer_move(pos, color),
            Self::Shape(tool) => tool.on_pointer_move(pos, color),
            Self::Text(tool) => tool.on_pointer_move(pos, color),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, color: Color32) -> ToolAction {
        match self {
            Self::Pen(tool) => tool.on_pointer_up(pos, color),
            Self::Shape(tool) => tool.on_pointer_up(pos, color),
            Self::Text(tool) => tool.on_pointer_up(pos, color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_the_requested_tool() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolType::new(kind).kind(), kind);
        }
    }

    #[test]
    fn tool_kind_round_trips_through_serde() {
        let json = serde_json::to_string(&ToolKind::Circle).unwrap();
        assert_eq!(json, "\"Circle\"");
        assert_eq!(serde_json::from_str::<ToolKind>(&json).unwrap(), ToolKind::Circle);
    }
}
