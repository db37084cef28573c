use std::path::PathBuf;
use thiserror::Error;

use crate::state::LifecycleState;

/// Errors raised by the shared lifecycle cell
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// A state write carried no state at all
    #[error("recorder state cannot be set to nothing")]
    Unset,
    /// A raw value did not decode to any lifecycle state
    #[error("invalid recorder state discriminant: {0}")]
    InvalidDiscriminant(u8),
}

/// Errors that can occur while producing a preview image
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("invalid preview dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("canvas buffer holds {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// Errors that can occur while writing the finished canvas to disk
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to prepare export directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("canvas has no pixels to export")]
    EmptyCanvas,

    #[error("no export directory available")]
    NoExportDir,
}

/// Errors surfaced by recording session management
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("a recording session is already active (state: {0:?})")]
    AlreadyActive(LifecycleState),

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: usize, height: usize },

    #[error("failed to spawn render thread: {0}")]
    EngineSpawn(#[source] std::io::Error),

    #[error("render thread terminated abnormally")]
    EngineFault,

    #[error(transparent)]
    Export(#[from] ExportError),
}
