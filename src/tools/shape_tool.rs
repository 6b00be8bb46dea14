use egui::{Color32, Pos2};

use super::{Tool, ToolAction, ToolKind};
use crate::command::DrawCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// Rectangle and circle tools: one commit on release, from press to release
#[derive(Debug, Clone)]
pub struct ShapeTool {
    shape: ShapeKind,
    start: Option<Pos2>,
}

impl ShapeTool {
    pub fn new(shape: ShapeKind) -> Self {
        Self { shape, start: None }
    }
}

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        match self.shape {
            ShapeKind::Rectangle => ToolKind::Rectangle,
            ShapeKind::Circle => ToolKind::Circle,
        }
    }

    fn reset(&mut self) {
        self.start = None;
    }

    fn is_active(&self) -> bool {
        self.start.is_some()
    }

    fn on_pointer_down(&mut self, pos: Pos2, _color: Color32) -> ToolAction {
        self.start = Some(pos);
        ToolAction::None
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _color: Color32) -> ToolAction {
        ToolAction::None
    }

    fn on_pointer_up(&mut self, pos: Pos2, color: Color32) -> ToolAction {
        let Some(start) = self.start.take() else {
            return ToolAction::None;
        };
        let command = match self.shape {
            ShapeKind::Rectangle => DrawCommand::Rectangle {
                start,
                end: pos,
                color,
            },
            ShapeKind::Circle => DrawCommand::Circle {
                center: start,
                edge: pos,
                color,
            },
        };
        ToolAction::Commit(command)
    }
}
