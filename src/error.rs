//! Error types for loading, welding and saving meshes.

use std::path::PathBuf;
use thiserror::Error;

use super::F;

/// Result type for weld operations.
pub type WeldResult<T> = Result<T, WeldError>;

/// Coarse classification of a [`WeldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad threshold or malformed triangle indices.
    InvalidArgument,
    /// Input file does not exist.
    NotFound,
    /// Input file could not be parsed as a mesh.
    FormatError,
    /// Output file could not be written.
    IoError,
}

/// Errors that can occur while welding a mesh file.
#[derive(Debug, Error)]
pub enum WeldError {
    /// Threshold was negative or not a number.
    #[error("invalid threshold {threshold}: must be a non-negative number")]
    InvalidThreshold {
        /// The rejected value.
        threshold: F,
    },

    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// Position of the offending triangle.
        triangle: usize,
        /// The out of range index.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Mesh has more vertices than can be indexed while welding.
    #[error("mesh has {vertex_count} vertices, at most {max} are supported")]
    TooManyVertices {
        /// Number of vertices in the mesh.
        vertex_count: usize,
        /// Largest supported vertex count.
        max: usize,
    },

    /// Input file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Input file exists but is not a readable mesh.
    #[error("failed to read mesh from {}: {source}", path.display())]
    Format {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying reader error.
        source: std::io::Error,
    },

    /// Output file could not be written.
    #[error("failed to write mesh to {}: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying writer error.
        source: std::io::Error,
    },
}

impl WeldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidThreshold { .. }
            | Self::InvalidIndex { .. }
            | Self::TooManyVertices { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Format { .. } => ErrorKind::FormatError,
            Self::Io { .. } => ErrorKind::IoError,
        }
    }

    /// Maps a reader failure on `path` to `NotFound` or `Format`.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Format { path, source },
        }
    }
}
