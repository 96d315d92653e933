//! Error types for the detection pipeline and its collaborators.
//!
//! Degenerate contours and empty candidate sets are not errors: the analyzer
//! and resolver handle them locally. Everything here is fail-fast and ends the
//! aim loop when it surfaces.

/// Top-level error type for marker_vision operations.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Invalid frame: {message}")]
    InvalidFrame { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Frame source exhausted after {frames} frames")]
    SourceExhausted { frames: u64 },

    #[error("Input injection error: {message}")]
    Input { message: String },

    #[error("Display error: {message}")]
    Display { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using VisionError.
pub type VisionResult<T> = Result<T, VisionError>;

impl VisionError {
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
