use thiserror::Error;

/// Main error type for the pixvid library
#[derive(Error, Debug)]
pub enum PixvidError {
    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Video decode/encode errors (external tool boundary)
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load video file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to probe video: {reason}")]
    ProbeFailed { reason: String },

    #[error("{tool} invocation failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("Video decoding failed: {reason}")]
    DecodingFailed { reason: String },

    #[error("Frame processing failed: {reason}")]
    FrameProcessingFailed { reason: String },
}

/// Palette extraction and quantization errors
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Palette extraction produced no colours")]
    EmptyPalette,
}

/// Pipeline orchestration errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Staging directory setup failed: {reason}")]
    StagingFailed { reason: String },

    #[error("Worker pool setup failed: {reason}")]
    WorkerPoolFailed { reason: String },

    #[error("Output generation failed: {reason}")]
    OutputFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PixvidError
pub type Result<T> = std::result::Result<T, PixvidError>;
