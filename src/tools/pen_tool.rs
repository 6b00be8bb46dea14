use egui::{Color32, Pos2};

use super::{Tool, ToolAction, ToolKind};
use crate::command::DrawCommand;

/// Freehand pen: paints segment by segment while the pointer moves
#[derive(Debug, Clone, Default)]
pub struct PenTool {
    // Transient state: last point of the stroke being drawn
    last_point: Option<Pos2>,
}

impl PenTool {
    pub fn new() -> Self {
        Self { last_point: None }
    }
}

impl Tool for PenTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pen
    }

    fn reset(&mut self) {
        self.last_point = None;
    }

    fn is_active(&self) -> bool {
        self.last_point.is_some()
    }

    fn on_pointer_down(&mut self, pos: Pos2, _color: Color32) -> ToolAction {
        // Nothing is painted until the pointer moves
        self.last_point = Some(pos);
        ToolAction::None
    }

    fn on_pointer_move(&mut self, pos: Pos2, color: Color32) -> ToolAction {
        let Some(last) = self.last_point else {
            return ToolAction::None;
        };
        if last == pos {
            return ToolAction::None;
        }
        self.last_point = Some(pos);
        ToolAction::Draw(DrawCommand::Freehand {
            points: vec![last, pos],
            color,
        })
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _color: Color32) -> ToolAction {
        match self.last_point.take() {
            Some(_) => ToolAction::Finish,
            None => ToolAction::None,
        }
    }
}
