//! Error types for pointmark.
//!
//! Every error is fatal at the point of detection: the operator fixes the
//! condition and re-runs. `InvalidLabel` is the exception, the window shell
//! reports it and keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while annotating or converting points.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad output location or settings
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the problem
        message: String,
    },

    /// Refusing to overwrite an earlier session's output
    #[error("Output already exists: {path:?}")]
    AlreadyExists {
        /// Existing file or directory
        path: PathBuf,
    },

    /// No image with an accepted extension in the source directory
    #[error("No image files found in {dir:?}")]
    EmptyInput {
        /// Directory that was scanned
        dir: PathBuf,
    },

    /// Image index past the end of the set
    #[error("Image index {index} is out of bounds ({len} images)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of images in the set
        len: usize,
    },

    /// A points file line that cannot be used
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number in the points file
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Point label that cannot be written to the space-separated log
    #[error("Invalid point label {label:?}: {reason}")]
    InvalidLabel {
        /// The rejected label
        label: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// An operation needed a loaded image but none was loaded
    #[error("No image is currently loaded")]
    NothingLoaded,

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GPU setup or presentation error
    #[error("GPU error: {0}")]
    Gpu(#[from] pointmark_gpu::GpuError),

    /// Window system error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Window creation error
    #[error("Window error: {0}")]
    Window(#[from] winit::error::OsError),
}

impl Error {
    /// Create a configuration error with a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed record error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Create an already-exists error.
    pub fn already_exists(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Whether the window shell may report this error and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InvalidLabel { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
