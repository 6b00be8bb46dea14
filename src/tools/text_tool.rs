use egui::{Color32, Pos2};

use super::{Tool, ToolAction, ToolKind};

/// Places a label where the pointer goes down; the text itself comes from a
/// prompt owned by the UI.
#[derive(Debug, Clone, Default)]
pub struct TextTool;

impl TextTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn reset(&mut self) {}

    fn is_active(&self) -> bool {
        false
    }

    fn on_pointer_down(&mut self, pos: Pos2, _color: Color32) -> ToolAction {
        ToolAction::RequestText(pos)
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _color: Color32) -> ToolAction {
        ToolAction::None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _color: Color32) -> ToolAction {
        ToolAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn press_requests_text_and_the_rest_is_ignored() {
        let mut tool = TextTool::new();
        let pos = pos2(42.0, 24.0);
        assert_eq!(tool.on_pointer_down(pos, Color32::BLACK), ToolAction::RequestText(pos));
        assert_eq!(tool.on_pointer_move(pos, Color32::BLACK), ToolAction::None);
        assert_eq!(tool.on_pointer_up(pos, Color32::BLACK), ToolAction::None);
    }
}
