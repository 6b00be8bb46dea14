use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::analysis::png_data_url;
use crate::error::{PersistenceError, PersistenceResult};
use crate::tools::ToolKind;

/// Name of the single saved-drawing record
pub const DRAWING_RECORD: &str = "helm-chart-drawing";
/// Default file name for downloaded charts
pub const DEFAULT_CHART_FILENAME: &str = "helm-chart.yaml";

/// Tool and color in use when the drawing was saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingMetadata {
    pub tool: ToolKind,
    /// `#rrggbb`
    pub color: String,
}

/// The saved drawing: PNG as a data URL plus when and how it was made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDrawing {
    pub image: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub metadata: DrawingMetadata,
}

impl SavedDrawing {
    pub fn new(png: &[u8], metadata: DrawingMetadata) -> Self {
        Self {
            image: png_data_url(png),
            timestamp: chrono::Utc::now().to_rfc3339(),
            metadata,
        }
    }

    /// Decoded image bytes behind the data URL
    pub fn png(&self) -> PersistenceResult<Vec<u8>> {
        let (_, payload) = self
            .image
            .split_once(";base64,")
            .ok_or_else(|| PersistenceError::InvalidRecord("image is not base64 encoded".to_owned()))?;
        STANDARD
            .decode(payload)
            .map_err(|err| PersistenceError::InvalidRecord(err.to_string()))
    }
}

/// Local storage for the saved drawing and downloaded charts
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Directory holding the drawing record
    storage_dir: PathBuf,
    /// Directory charts are downloaded into
    output_dir: PathBuf,
}

impl LocalStore {
    pub fn new(storage_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn record_path(&self) -> PathBuf {
        self.storage_dir.join(format!("{DRAWING_RECORD}.json"))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Overwrite the drawing record
    pub fn save_drawing(&self, png: &[u8], metadata: DrawingMetadata) -> PersistenceResult<SavedDrawing> {
        let record = SavedDrawing::new(png, metadata);
        fs::create_dir_all(&self.storage_dir)?;
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(self.record_path(), json)?;
        log::info!("Drawing saved to {}", self.record_path().display());
        Ok(record)
    }

    /// The saved drawing, or `None` when there is none or it cannot be read
    pub fn load_drawing(&self) -> Option<SavedDrawing> {
        let path = self.record_path();
        if !path.exists() {
            return None;
        }
        match Self::read_record(&path) {
            Ok(record) => Some(record),
            Err(err) => {
                log::error!("Failed to load saved drawing: {err}");
                None
            }
        }
    }

    fn read_record(path: &Path) -> PersistenceResult<SavedDrawing> {
        let json = fs::read_to_string(path)?;
        let record: SavedDrawing = serde_json::from_str(&json)?;
        if !record.image.starts_with("data:image/") {
            return Err(PersistenceError::InvalidRecord(
                "image is not a data URL".to_owned(),
            ));
        }
        Ok(record)
    }

    /// Write `content` to `filename` in the output directory
    pub fn download_yaml(&self, content: &str, filename: Option<&str>) -> PersistenceResult<PathBuf> {
        let filename = filename.unwrap_or(DEFAULT_CHART_FILENAME);
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(filename);
        fs::write(&path, content)?;
        log::info!("Chart written to {}", path.display());
        Ok(path)
    }
}
