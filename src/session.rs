//! Top-level state of one editing session and the actions that change it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use egui::Color32;
use futures::channel::oneshot;

use crate::analysis::DiagramAnalyzer;
use crate::canvas::Canvas;
use crate::error::{AnalysisError, PersistenceResult};
use crate::persistence::{DrawingMetadata, LocalStore, SavedDrawing};
use crate::templates;
use crate::tools::ToolKind;
use crate::validator::{self, ValidationReport};

pub const SUMMARY_GENERATED: &str = "YAML generated successfully!";
pub const SUMMARY_GENERATION_FAILED: &str = "Generation failed";
pub const SUMMARY_NOTHING_TO_VALIDATE: &str = "No YAML to validate";
pub const ISSUE_GENERATE_FIRST: &str = "Please generate YAML first";

/// The seven palette colors
pub const PALETTE: [Color32; 7] = [
    Color32::from_rgb(0x00, 0x00, 0x00),
    Color32::from_rgb(0x25, 0x63, 0xeb),
    Color32::from_rgb(0xdc, 0x26, 0x26),
    Color32::from_rgb(0x16, 0xa3, 0x4a),
    Color32::from_rgb(0xca, 0x8a, 0x04),
    Color32::from_rgb(0x93, 0x33, 0xea),
    Color32::from_rgb(0xc2, 0x41, 0x0c),
];

/// `#rrggbb` for an opaque color
pub fn color_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

type GenerationResult = Result<String, AnalysisError>;

/// Why a generation request was not started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateRejected {
    /// A request is already outstanding
    Busy,
    /// Could not start; the reason is in the validation result
    Failed,
}

/// Everything the panels display and edit, in one place
#[derive(Debug)]
pub struct Session {
    pub tool: ToolKind,
    pub color: Color32,
    yaml: String,
    validation: Option<ValidationReport>,
    /// Outstanding analysis; `Some` means busy
    generation: Option<oneshot::Receiver<GenerationResult>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ToolKind::default(), PALETTE[0])
    }
}

impl Session {
    pub fn new(tool: ToolKind, color: Color32) -> Self {
        Self {
            tool,
            color,
            yaml: String::new(),
            validation: None,
            generation: None,
        }
    }

    pub fn yaml(&self) -> &str {
        &self.yaml
    }

    /// Text area edits replace the artifact wholesale
    pub fn set_yaml(&mut self, text: impl Into<String>) {
        self.yaml = text.into();
    }

    /// Mutable access for the text editor widget
    pub fn yaml_mut(&mut self) -> &mut String {
        &mut self.yaml
    }

    pub fn validation(&self) -> Option<&ValidationReport> {
        self.validation.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.generation.is_some()
    }

    pub fn metadata(&self) -> DrawingMetadata {
        DrawingMetadata {
            tool: self.tool,
            color: color_hex(self.color),
        }
    }

    /// Export the canvas and hand it to `analyzer` on a worker thread.
    ///
    /// Any undo/redo still decoding is applied first, so the analyzer sees the
    /// state the user stepped to. Refused while another request is outstanding.
    /// There is no retry and no timeout; the session stays busy until the
    /// analyzer answers.
    pub fn start_generation(
        &mut self,
        canvas: &mut Canvas,
        analyzer: Arc<dyn DiagramAnalyzer>,
    ) -> Result<(), GenerateRejected> {
        if self.is_busy() {
            log::warn!("Generation already in progress");
            return Err(GenerateRejected::Busy);
        }
        self.validation = None;

        canvas.settle();
        let png = match canvas.export_image() {
            Ok(png) => png,
            Err(err) => {
                self.fail_generation(AnalysisError::Image(err.to_string()));
                return Err(GenerateRejected::Failed);
            }
        };

        log::info!("Generating YAML from drawing...");
        let (sender, receiver) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("diagram-analysis".to_owned())
            .spawn(move || {
                let result = analyzer.analyze(&png);
                // The receiver is gone only if the session was dropped.
                let _ = sender.send(result);
            });

        match spawned {
            Ok(_) => {
                self.generation = Some(receiver);
                Ok(())
            }
            Err(err) => {
                self.fail_generation(AnalysisError::Transport(err.to_string()));
                Err(GenerateRejected::Failed)
            }
        }
    }

    /// Apply the analysis outcome if it has arrived.
    /// Returns `true` when the session stopped being busy.
    pub fn poll_generation(&mut self) -> bool {
        let Some(receiver) = self.generation.as_mut() else {
            return false;
        };
        let outcome = match receiver.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return false,
            Err(oneshot::Canceled) => Err(AnalysisError::Cancelled),
        };
        self.generation = None;
        self.finish_generation(outcome);
        true
    }

    /// Block until the outstanding analysis answers, then apply it
    pub fn wait_generation(&mut self) -> bool {
        let Some(receiver) = self.generation.take() else {
            return false;
        };
        let outcome = futures::executor::block_on(receiver).unwrap_or(Err(AnalysisError::Cancelled));
        self.finish_generation(outcome);
        true
    }

    fn finish_generation(&mut self, outcome: GenerationResult) {
        match outcome {
            Ok(yaml) => {
                log::info!("Generation finished ({} bytes)", yaml.len());
                self.yaml = yaml;
                self.validation = Some(ValidationReport::success(SUMMARY_GENERATED));
            }
            Err(err) => self.fail_generation(err),
        }
    }

    fn fail_generation(&mut self, err: AnalysisError) {
        log::error!("Generation failed: {err}");
        self.validation = Some(ValidationReport::failure(
            SUMMARY_GENERATION_FAILED,
            err.to_string(),
        ));
    }

    /// Lint the current text, or say there is nothing to lint
    pub fn validate(&mut self) -> &ValidationReport {
        let report = if self.yaml.is_empty() {
            ValidationReport::failure(SUMMARY_NOTHING_TO_VALIDATE, ISSUE_GENERATE_FIRST)
        } else {
            validator::validate(&self.yaml)
        };
        self.validation.insert(report)
    }

    /// Replace the text with the bundled starter chart
    pub fn insert_starter_template(&mut self) {
        self.yaml = templates::basic_helm_chart().to_owned();
        self.validation = None;
    }

    /// Write the text to the output directory; `None` when there is no text
    pub fn download(&self, store: &LocalStore) -> PersistenceResult<Option<PathBuf>> {
        if self.yaml.is_empty() {
            return Ok(None);
        }
        store.download_yaml(&self.yaml, None).map(Some)
    }

    pub fn save_drawing(&self, store: &LocalStore, canvas: &Canvas) -> PersistenceResult<SavedDrawing> {
        let png = canvas.export_image()?;
        store.save_drawing(&png, self.metadata())
    }

    /// Blank the canvas and drop the generated artifact.
    /// Confirmation is the caller's job.
    pub fn clear(&mut self, canvas: &mut Canvas, now: Instant) {
        canvas.clear(now);
        self.yaml.clear();
        self.validation = None;
    }
}
