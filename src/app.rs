use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::{Color32, TextureHandle, TextureOptions};
use serde::{Deserialize, Serialize};

use crate::analysis::{AzureOpenAiClient, DiagramAnalyzer};
use crate::canvas::Canvas;
use crate::config::{AnalysisConfig, AppConfig};
use crate::input::{CanvasInput, InputHandler, Shortcut};
use crate::panels::{central_panel, tools_panel, yaml_panel};
use crate::persistence::LocalStore;
use crate::session::Session;
use crate::tools::ToolKind;

/// How often to look for a finished analysis or restore while one is running
const BUSY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What survives a restart. We derive Deserialize/Serialize so eframe can
/// persist it on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Preferences {
    pub tool: ToolKind,
    pub color: Color32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            color: Color32::BLACK,
        }
    }
}

pub struct SketchApp {
    pub(crate) canvas: Canvas,
    pub(crate) session: Session,
    pub(crate) store: LocalStore,
    pub(crate) analyzer: Arc<dyn DiagramAnalyzer>,
    /// Whether the endpoint settings were complete at startup
    pub(crate) analysis_configured: bool,
    pub(crate) input: InputHandler,
    texture: Option<TextureHandle>,
    texture_revision: u64,
    pub(crate) show_clear_confirm: bool,
    /// Buffer behind the text tool's entry prompt
    pub(crate) text_entry: String,
    /// Last user-facing message from save/load/download
    pub(crate) status: Option<String>,
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let preferences: Preferences = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let analysis = AnalysisConfig::from_env();
        let missing = analysis.missing();
        if !missing.is_empty() {
            log::warn!("Azure OpenAI configuration missing: {}", missing.join(", "));
        }
        let configured = missing.is_empty();
        let analyzer = Arc::new(AzureOpenAiClient::new(analysis));

        let mut app = Self::with_analyzer(config, analyzer, preferences);
        app.analysis_configured = configured;
        app
    }

    /// Build without an eframe context, with any analyzer
    pub fn with_analyzer(
        config: AppConfig,
        analyzer: Arc<dyn DiagramAnalyzer>,
        preferences: Preferences,
    ) -> Self {
        let mut canvas = Canvas::new(config.surface, config.history);
        canvas.set_tool(preferences.tool);
        let input = InputHandler::new(egui::Rect::NOTHING, [config.surface.width, config.surface.height]);
        Self {
            canvas,
            session: Session::new(preferences.tool, preferences.color),
            store: LocalStore::new(config.storage_dir, config.output_dir),
            analyzer,
            analysis_configured: true,
            input,
            texture: None,
            texture_revision: 0,
            show_clear_confirm: false,
            text_entry: String::new(),
            status: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            tool: self.session.tool,
            color: self.session.color,
        }
    }

    pub fn select_tool(&mut self, tool: ToolKind) {
        self.session.tool = tool;
        self.canvas.set_tool(tool);
    }

    pub fn select_color(&mut self, color: Color32) {
        self.session.color = color;
    }

    pub fn undo(&mut self) {
        if self.canvas.undo() {
            log::debug!("Undo requested");
        }
    }

    pub fn redo(&mut self) {
        if self.canvas.redo() {
            log::debug!("Redo requested");
        }
    }

    pub fn generate(&mut self) {
        // Rejections are already reflected in the session state.
        let _ = self
            .session
            .start_generation(&mut self.canvas, Arc::clone(&self.analyzer));
    }

    pub fn validate(&mut self) {
        self.session.validate();
    }

    pub fn download(&mut self) {
        self.status = match self.session.download(&self.store) {
            Ok(Some(path)) => Some(format!("Saved {}", path.display())),
            Ok(None) => None,
            Err(err) => {
                log::error!("Download failed: {err}");
                Some(format!("Download failed: {err}"))
            }
        };
    }

    pub fn save_drawing(&mut self) {
        self.status = match self.session.save_drawing(&self.store, &self.canvas) {
            Ok(_) => Some("Drawing saved".to_owned()),
            Err(err) => {
                log::error!("Failed to save drawing: {err}");
                Some(format!("Failed to save drawing: {err}"))
            }
        };
    }

    pub fn load_drawing(&mut self) {
        let Some(record) = self.store.load_drawing() else {
            self.status = Some("No saved drawing".to_owned());
            return;
        };
        let loaded = record
            .png()
            .map_err(|err| err.to_string())
            .and_then(|png| {
                self.canvas
                    .load_image(&png, Instant::now())
                    .map_err(|err| err.to_string())
            });
        self.status = Some(match loaded {
            Ok(()) => format!("Loaded drawing from {}", record.timestamp),
            Err(err) => {
                log::error!("Failed to load saved drawing: {err}");
                format!("Failed to load drawing: {err}")
            }
        });
    }

    pub fn confirm_clear(&mut self) {
        self.show_clear_confirm = false;
        self.session.clear(&mut self.canvas, Instant::now());
        self.status = None;
    }

    pub fn commit_text(&mut self) {
        let text = std::mem::take(&mut self.text_entry);
        self.canvas
            .commit_text(&text, self.session.color, Instant::now());
    }

    pub fn cancel_text(&mut self) {
        self.text_entry.clear();
        self.canvas.cancel_text();
    }

    pub fn handle_canvas_input(&mut self, events: Vec<CanvasInput>) {
        let now = Instant::now();
        let color = self.session.color;
        for event in events {
            match event {
                CanvasInput::PointerDown(pos) => self.canvas.pointer_down(pos, color, now),
                CanvasInput::PointerMove(pos) => self.canvas.pointer_move(pos, color, now),
                CanvasInput::PointerUp(pos) => self.canvas.pointer_up(pos, color, now),
            }
        }
    }

    /// The canvas as an egui texture, re-uploaded only when the pixels changed
    pub(crate) fn canvas_texture(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let surface = self.canvas.surface();
        let revision = surface.revision();
        match &mut self.texture {
            Some(texture) => {
                if self.texture_revision != revision {
                    texture.set(surface.to_color_image(), TextureOptions::LINEAR);
                }
            }
            None => {
                self.texture = Some(ctx.load_texture(
                    "canvas",
                    surface.to_color_image(),
                    TextureOptions::LINEAR,
                ));
            }
        }
        self.texture_revision = revision;
        self.texture
            .as_ref()
            .map_or(egui::TextureId::default(), TextureHandle::id)
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // The YAML editor keeps its own undo on these keys.
        if ctx.wants_keyboard_input() {
            return;
        }
        for shortcut in InputHandler::shortcuts(ctx) {
            match shortcut {
                Shortcut::Undo => self.undo(),
                Shortcut::Redo => self.redo(),
            }
        }
    }

    fn show_clear_modal(&mut self, ctx: &egui::Context) {
        if !self.show_clear_confirm {
            return;
        }
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Clear canvas")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Are you sure you want to clear the canvas? This action cannot be undone.");
                ui.horizontal(|ui| {
                    confirmed = ui.button("Clear").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });
        if confirmed {
            self.confirm_clear();
        } else if cancelled {
            self.show_clear_confirm = false;
        }
    }

    fn show_text_modal(&mut self, ctx: &egui::Context) {
        if self.canvas.pending_text().is_none() {
            return;
        }
        let mut committed = false;
        let mut cancelled = false;
        let text_entry = &mut self.text_entry;
        egui::Window::new("Add text")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Enter text:");
                let response = ui.text_edit_singleline(text_entry);
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    committed = true;
                } else {
                    response.request_focus();
                }
                ui.horizontal(|ui| {
                    committed |= ui.button("OK").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            cancelled = true;
        }
        if committed {
            self.commit_text();
        } else if cancelled {
            self.cancel_text();
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if let Some(wait) = self.canvas.history().time_until_snapshot(now) {
            ctx.request_repaint_after(wait);
        }
        if self.session.is_busy() || self.canvas.history().is_restoring() {
            ctx.request_repaint_after(BUSY_POLL_INTERVAL);
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.preferences());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.canvas.tick(now);
        self.session.poll_generation();
        self.handle_shortcuts(ctx);

        // Side panels first so the central panel gets what is left.
        tools_panel(self, ctx);
        yaml_panel(self, ctx);
        central_panel(self, ctx);

        self.show_clear_modal(ctx);
        self.show_text_modal(ctx);
        self.schedule_repaint(ctx, now);
    }
}
