use thiserror::Error;

/// Errors raised while encoding or decoding the raster surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to encode surface: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] image::ImageError),
}

/// Errors returned by a diagram analyzer
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// One or more configuration items are absent; no request was attempted
    #[error("Azure OpenAI configuration missing: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("Azure OpenAI API Error: {status} - {body}")]
    Endpoint { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode canvas for analysis: {0}")]
    Image(String),

    /// The worker running the request went away before answering
    #[error("Analysis was cancelled")]
    Cancelled,
}

/// Errors that can occur while saving or loading local artifacts
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize drawing: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid drawing record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
