//! Error types for ccbr_io operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while collecting and writing labeled scenes.
#[derive(Error, Debug)]
pub enum CcbrIoError {
    /// Underlying filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row of an annotation file could not be parsed.
    #[error("parse error in {path:?} line {line}: {message}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A scene contained no annotation points.
    #[error("no annotated points found in {path:?}")]
    EmptyScene {
        /// Annotation directory of the scene.
        path: PathBuf,
    },

    /// An area directory does not exist.
    #[error("area directory {path:?} does not exist")]
    MissingArea {
        /// Expected area directory.
        path: PathBuf,
    },

    /// An area directory contains no scenes.
    #[error("area directory {path:?} contains no scenes")]
    EmptyArea {
        /// Area directory.
        path: PathBuf,
    },

    /// A room directory name cannot be used in an output file name.
    #[error("scene directory name {path:?} is not valid UTF-8")]
    InvalidSceneName {
        /// Room directory.
        path: PathBuf,
    },

    /// Output format name is not recognised.
    #[error("unknown output format: {0} (expected numpy or txt)")]
    UnknownFormat(String),

    /// The class list is unusable.
    #[error("invalid class map: {message}")]
    InvalidClassMap {
        /// Description of the problem.
        message: String,
    },

    /// A loaded array does not have the scene layout.
    #[error("invalid scene array: expected {expected} columns, got {got}")]
    InvalidScene {
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns.
        got: usize,
    },

    /// Writing a `.npy` file failed.
    #[error("npy write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// Reading a `.npy` file failed.
    #[error("npy read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// Array construction failed.
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Result type for ccbr_io operations.
pub type Result<T> = std::result::Result<T, CcbrIoError>;
