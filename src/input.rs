use egui::{Context, Key, Modifiers, Pos2, Rect};

/// Pointer events already mapped into surface pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasInput {
    PointerDown(Pos2),
    PointerMove(Pos2),
    PointerUp(Pos2),
}

/// Keyboard shortcuts the app reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Ctrl+Z undoes; Ctrl+Shift+Z and Ctrl+Y redo (Cmd on macOS)
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        if !modifiers.command {
            return None;
        }
        match key {
            Key::Z if modifiers.shift => Some(Shortcut::Redo),
            Key::Z => Some(Shortcut::Undo),
            Key::Y => Some(Shortcut::Redo),
            _ => None,
        }
    }
}

/// One frame of primary-button pointer state, in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerFrame {
    pub hover: Option<Pos2>,
    pub pressed: bool,
    pub released: bool,
}

/// Turns raw egui pointer input over the canvas image into [`CanvasInput`]s.
///
/// A gesture starts only when the button goes down inside the canvas. Leaving
/// the canvas while the button is held ends the gesture as if it were released
/// at the last position seen inside.
#[derive(Debug)]
pub struct InputHandler {
    /// Where the canvas image is drawn on screen
    canvas_rect: Rect,
    /// Surface size in pixels
    surface_size: [u32; 2],
    last_pos: Option<Pos2>,
    dragging: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Rect::NOTHING, [1, 1])
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect, surface_size: [u32; 2]) -> Self {
        Self {
            canvas_rect,
            surface_size,
            last_pos: None,
            dragging: false,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Screen position to surface pixel position
    pub fn to_surface(&self, screen: Pos2) -> Pos2 {
        let rect = self.canvas_rect;
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return screen;
        }
        let [w, h] = self.surface_size;
        Pos2::new(
            (screen.x - rect.min.x) * w as f32 / rect.width(),
            (screen.y - rect.min.y) * h as f32 / rect.height(),
        )
    }

    /// Read this frame's pointer state from egui and translate it
    pub fn process_input(&mut self, ctx: &Context) -> Vec<CanvasInput> {
        let frame = ctx.input(|input| PointerFrame {
            hover: input.pointer.hover_pos(),
            pressed: input.pointer.primary_pressed(),
            released: input.pointer.primary_released(),
        });
        self.process_frame(frame)
    }

    pub fn process_frame(&mut self, frame: PointerFrame) -> Vec<CanvasInput> {
        let mut events = Vec::new();
        let inside = frame.hover.filter(|pos| self.canvas_rect.contains(*pos));

        if frame.pressed && !self.dragging {
            if let Some(pos) = inside {
                self.dragging = true;
                self.last_pos = Some(pos);
                events.push(CanvasInput::PointerDown(self.to_surface(pos)));
            }
        }

        if !self.dragging {
            return events;
        }

        match inside {
            Some(pos) => {
                if Some(pos) != self.last_pos {
                    events.push(CanvasInput::PointerMove(self.to_surface(pos)));
                    self.last_pos = Some(pos);
                }
                if frame.released {
                    events.push(CanvasInput::PointerUp(self.to_surface(pos)));
                    self.end_gesture();
                }
            }
            None => {
                // Left the canvas (or the window) mid-gesture.
                let pos = self.last_pos.unwrap_or(self.canvas_rect.min);
                events.push(CanvasInput::PointerUp(self.to_surface(pos)));
                self.end_gesture();
            }
        }

        events
    }

    /// Keyboard shortcuts pressed this frame
    pub fn shortcuts(ctx: &Context) -> Vec<Shortcut> {
        ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Shortcut::from_key(*key, *modifiers),
                    _ => None,
                })
                .collect()
        })
    }

    /// Drop the gesture in progress without reporting a release.
    /// Used when a prompt takes the pointer away from the canvas.
    pub fn cancel(&mut self) {
        self.end_gesture();
    }

    fn end_gesture(&mut self) {
        self.dragging = false;
        self.last_pos = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn handler() -> InputHandler {
        // Drawn at half size: 300x200 on screen for a 600x400 surface
        InputHandler::new(
            Rect::from_min_size(pos2(100.0, 50.0), egui::vec2(300.0, 200.0)),
            [600, 400],
        )
    }

    fn frame(hover: Option<Pos2>, pressed: bool, released: bool) -> PointerFrame {
        PointerFrame {
            hover,
            pressed,
            released,
        }
    }

    #[test]
    fn positions_are_scaled_into_surface_pixels() {
        assert_eq!(handler().to_surface(pos2(250.0, 150.0)), pos2(300.0, 200.0));
    }

    #[test]
    fn press_drag_release() {
        let mut input = handler();
        let down = input.process_frame(frame(Some(pos2(100.0, 50.0)), true, false));
        assert_eq!(down, vec![CanvasInput::PointerDown(pos2(0.0, 0.0))]);

        let moved = input.process_frame(frame(Some(pos2(110.0, 60.0)), false, false));
        assert_eq!(moved, vec![CanvasInput::PointerMove(pos2(20.0, 20.0))]);

        let up = input.process_frame(frame(Some(pos2(110.0, 60.0)), false, true));
        assert_eq!(up, vec![CanvasInput::PointerUp(pos2(20.0, 20.0))]);
        assert!(!input.is_dragging());
    }

    #[test]
    fn press_outside_the_canvas_is_ignored() {
        let mut input = handler();
        assert!(input.process_frame(frame(Some(pos2(10.0, 10.0)), true, false)).is_empty());
        assert!(input.process_frame(frame(Some(pos2(150.0, 100.0)), false, false)).is_empty());
    }

    #[test]
    fn leaving_the_canvas_ends_the_gesture() {
        let mut input = handler();
        input.process_frame(frame(Some(pos2(150.0, 100.0)), true, false));
        let events = input.process_frame(frame(Some(pos2(500.0, 100.0)), false, false));
        assert_eq!(events, vec![CanvasInput::PointerUp(pos2(100.0, 100.0))]);
        assert!(!input.is_dragging());
    }

    #[test]
    fn press_after_a_cancelled_gesture_starts_a_new_one() {
        let mut input = handler();
        input.process_frame(frame(Some(pos2(120.0, 70.0)), true, false));
        // Release happens while a prompt owns the pointer and is never seen here.
        input.cancel();
        assert!(input.process_frame(frame(Some(pos2(200.0, 200.0)), false, false)).is_empty());

        let events = input.process_frame(frame(Some(pos2(200.0, 200.0)), true, false));
        assert_eq!(events, vec![CanvasInput::PointerDown(pos2(200.0, 300.0))]);
    }

    #[test]
    fn shortcuts_need_the_command_modifier() {
        assert_eq!(Shortcut::from_key(Key::Z, Modifiers::COMMAND), Some(Shortcut::Undo));
        assert_eq!(
            Shortcut::from_key(Key::Z, Modifiers::COMMAND | Modifiers::SHIFT),
            Some(Shortcut::Redo)
        );
        assert_eq!(Shortcut::from_key(Key::Y, Modifiers::COMMAND), Some(Shortcut::Redo));
        assert_eq!(Shortcut::from_key(Key::Z, Modifiers::NONE), None);
    }
}
