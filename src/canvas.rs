//! Pointer gestures in, pixels and history out.
//!
//! [`Canvas`] ties the active tool to the drawing surface and the snapshot
//! history: tools turn pointer events into draw commands, the canvas applies
//! them and schedules snapshots when a gesture commits.

use std::time::Instant;

use egui::{Color32, Pos2};

use crate::command::DrawCommand;
use crate::config::{HistoryConfig, SurfaceConfig};
use crate::history::SnapshotHistory;
use crate::error::SurfaceError;
use crate::surface::{self, DrawingSurface};
use crate::tools::{Tool, ToolAction, ToolKind, ToolType};

#[derive(Debug)]
pub struct Canvas {
    surface: DrawingSurface,
    history: SnapshotHistory,
    tool: ToolType,
    /// Where a label goes once the user has typed it
    pending_text: Option<Pos2>,
    /// The gesture in progress has painted pixels that are not in history yet
    unrecorded_ink: bool,
}

impl Canvas {
    /// A blank surface whose blank state is the first history entry
    pub fn new(surface: SurfaceConfig, history: HistoryConfig) -> Self {
        let surface = DrawingSurface::new(surface);
        let mut history = SnapshotHistory::new(history);
        history.snapshot(&surface);
        Self {
            surface,
            history,
            tool: ToolType::default(),
            pending_text: None,
            unrecorded_ink: false,
        }
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn tool(&self) -> ToolKind {
        self.tool.kind()
    }

    /// Switch tools, abandoning any gesture in progress
    pub fn set_tool(&mut self, kind: ToolKind) {
        if self.tool.kind() == kind {
            return;
        }
        log::info!("Tool selected: {}", kind.name());
        self.end_gesture();
        self.pending_text = None;
        self.tool = ToolType::new(kind);
    }

    /// Position waiting for text entry, if the text tool asked for one
    pub fn pending_text(&self) -> Option<Pos2> {
        self.pending_text
    }

    pub fn is_gesture_active(&self) -> bool {
        self.tool.is_active()
    }

    pub fn pointer_down(&mut self, pos: Pos2, color: Color32, now: Instant) {
        // Settle any undo/redo first so its decode cannot land on top of new ink.
        self.history.wait_restore(&mut self.surface);
        let action = self.tool.on_pointer_down(pos, color);
        self.apply(action, now);
    }

    pub fn pointer_move(&mut self, pos: Pos2, color: Color32, now: Instant) {
        let action = self.tool.on_pointer_move(pos, color);
        self.apply(action, now);
    }

    pub fn pointer_up(&mut self, pos: Pos2, color: Color32, now: Instant) {
        let action = self.tool.on_pointer_up(pos, color);
        self.apply(action, now);
    }

    /// Place the label requested by the text tool; empty text is dropped
    pub fn commit_text(&mut self, text: &str, color: Color32, now: Instant) {
        let Some(position) = self.pending_text.take() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        self.apply(
            ToolAction::Commit(DrawCommand::Text {
                position,
                text: text.to_owned(),
                color,
            }),
            now,
        );
    }

    pub fn cancel_text(&mut self) {
        self.pending_text = None;
    }

    fn apply(&mut self, action: ToolAction, now: Instant) {
        match action {
            ToolAction::None => {}
            ToolAction::Draw(command) => {
                command.execute(&mut self.surface);
                self.unrecorded_ink = true;
            }
            ToolAction::Commit(command) => {
                log::debug!("Committing {}", command.name());
                command.execute(&mut self.surface);
                self.unrecorded_ink = false;
                self.history.request_snapshot(now);
            }
            ToolAction::Finish => {
                self.unrecorded_ink = false;
                self.history.request_snapshot(now);
            }
            ToolAction::RequestText(pos) => self.pending_text = Some(pos),
        }
    }

    /// Abandon the gesture in progress. Ink it already painted becomes a
    /// history entry of its own, so a following undo removes exactly that ink.
    fn end_gesture(&mut self) {
        self.tool.reset();
        if std::mem::take(&mut self.unrecorded_ink) {
            self.history.snapshot(&self.surface);
        }
    }

    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        self.history.undo(&self.surface)
    }

    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        self.history.redo(&self.surface)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Per-frame housekeeping: apply finished restores and take due snapshots.
    /// Returns true when the surface changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let restored = self.history.poll_restore(&mut self.surface);
        self.history.tick(now, &self.surface);
        restored
    }

    /// Block until any undo/redo in flight is on the surface
    pub fn settle(&mut self) -> bool {
        self.history.wait_restore(&mut self.surface)
    }

    /// Blank the surface; the blank state enters history after a short delay
    pub fn clear(&mut self, now: Instant) {
        self.tool.reset();
        self.unrecorded_ink = false;
        self.pending_text = None;
        self.history.clear(&mut self.surface, now);
    }

    pub fn export_image(&self) -> Result<Vec<u8>, SurfaceError> {
        self.surface.export_image()
    }

    /// Replace the surface with a previously exported image and record it
    pub fn load_image(&mut self, png: &[u8], now: Instant) -> Result<(), SurfaceError> {
        let image = surface::decode(png)?;
        self.history.wait_restore(&mut self.surface);
        self.tool.reset();
        self.unrecorded_ink = false;
        self.pending_text = None;
        self.surface.restore_from(&image);
        self.history.request_snapshot(now);
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(SurfaceConfig::default(), HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use std::time::Duration;

    #[test]
    fn starts_with_the_blank_state_recorded() {
        let canvas = Canvas::default();
        assert_eq!(canvas.history().len(), 1);
        assert!(!canvas.can_undo());
        assert!(canvas.surface().is_blank());
    }

    #[test]
    fn pen_paints_while_moving_and_snapshots_after_release() {
        let mut canvas = Canvas::default();
        let t0 = Instant::now();

        canvas.pointer_down(pos2(10.0, 10.0), Color32::BLACK, t0);
        assert!(canvas.surface().is_blank());
        canvas.pointer_move(pos2(60.0, 10.0), Color32::BLACK, t0);
        assert!(!canvas.surface().is_blank());
        assert!(!canvas.history().has_pending_snapshot());

        canvas.pointer_up(pos2(60.0, 10.0), Color32::BLACK, t0);
        assert!(canvas.history().has_pending_snapshot());
        canvas.tick(t0 + Duration::from_millis(100));
        assert_eq!(canvas.history().len(), 2);
        assert!(canvas.can_undo());
    }

    #[test]
    fn text_waits_for_entry() {
        let mut canvas = Canvas::default();
        let now = Instant::now();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(pos2(40.0, 40.0), Color32::BLACK, now);
        assert_eq!(canvas.pending_text(), Some(pos2(40.0, 40.0)));
        assert!(canvas.surface().is_blank());

        canvas.commit_text("api", Color32::BLACK, now);
        assert_eq!(canvas.pending_text(), None);
        assert!(!canvas.surface().is_blank());
        assert!(canvas.history().has_pending_snapshot());
    }

    #[test]
    fn cancelled_text_draws_nothing() {
        let mut canvas = Canvas::default();
        let now = Instant::now();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(pos2(40.0, 40.0), Color32::BLACK, now);
        canvas.cancel_text();
        canvas.commit_text("late", Color32::BLACK, now);
        assert!(canvas.surface().is_blank());
    }

    #[test]
    fn switching_tools_drops_the_gesture() {
        let mut canvas = Canvas::default();
        let now = Instant::now();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(pos2(10.0, 10.0), Color32::BLACK, now);
        assert!(canvas.is_gesture_active());
        canvas.set_tool(ToolKind::Circle);
        canvas.pointer_up(pos2(50.0, 50.0), Color32::BLACK, now);
        assert!(canvas.surface().is_blank());
    }

    #[test]
    fn undo_mid_stroke_removes_only_that_stroke() {
        let mut canvas = Canvas::new(
            SurfaceConfig::default(),
            HistoryConfig {
                encoding: crate::config::SnapshotEncoding::Png,
                ..Default::default()
            },
        );
        let t0 = Instant::now();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(pos2(20.0, 20.0), Color32::BLACK, t0);
        canvas.pointer_up(pos2(80.0, 80.0), Color32::BLACK, t0);
        let t1 = t0 + Duration::from_millis(100);
        canvas.tick(t1);
        let committed = canvas.surface().pixels().clone();

        canvas.set_tool(ToolKind::Pen);
        canvas.pointer_down(pos2(200.0, 200.0), Color32::BLACK, t1);
        canvas.pointer_move(pos2(300.0, 200.0), Color32::BLACK, t1);
        let partial = canvas.surface().pixels().clone();

        // Undo with the button still held
        assert!(canvas.undo());
        canvas.settle();
        assert_eq!(canvas.surface().pixels(), &committed);
        assert!(!canvas.is_gesture_active());

        // The rest of the drag paints nothing
        canvas.pointer_move(pos2(350.0, 250.0), Color32::BLACK, t1);
        canvas.pointer_up(pos2(350.0, 250.0), Color32::BLACK, t1);
        assert_eq!(canvas.surface().pixels(), &committed);

        assert!(canvas.redo());
        canvas.settle();
        assert_eq!(canvas.surface().pixels(), &partial);
    }

    #[test]
    fn undo_with_an_untouched_press_does_not_add_history() {
        let mut canvas = Canvas::default();
        let now = Instant::now();
        canvas.pointer_down(pos2(10.0, 10.0), Color32::BLACK, now);
        assert!(!canvas.undo());
        assert_eq!(canvas.history().len(), 1);
    }

    #[test]
    fn loading_an_export_reproduces_it() {
        let mut drawn = Canvas::default();
        let now = Instant::now();
        drawn.set_tool(ToolKind::Rectangle);
        drawn.pointer_down(pos2(20.0, 20.0), Color32::BLACK, now);
        drawn.pointer_up(pos2(120.0, 90.0), Color32::BLACK, now);
        let png = drawn.export_image().unwrap();

        let mut loaded = Canvas::default();
        loaded.load_image(&png, now).unwrap();
        assert_eq!(loaded.surface().pixels(), drawn.surface().pixels());
        assert!(loaded.history().has_pending_snapshot());
    }
}
