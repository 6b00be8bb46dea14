#![warn(clippy::all, rust_2018_idioms)]

pub mod analysis;
pub mod app;
pub mod canvas;
pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod panels;
pub mod persistence;
pub mod session;
pub mod surface;
pub mod templates;
pub mod tools;
pub mod validator;

pub use analysis::{AzureOpenAiClient, DiagramAnalyzer};
pub use app::{Preferences, SketchApp};
pub use canvas::Canvas;
pub use command::DrawCommand;
pub use config::{AnalysisConfig, AppConfig, HistoryConfig, SnapshotEncoding, SurfaceConfig};
pub use error::{AnalysisError, PersistenceError, SurfaceError};
pub use history::{Snapshot, SnapshotHistory};
pub use persistence::{DrawingMetadata, LocalStore, SavedDrawing};
pub use session::Session;
pub use surface::DrawingSurface;
pub use tools::{Tool, ToolKind};
pub use validator::{ValidationReport, validate};
