use thiserror::Error;

/// Preconditions checked before a frame's iteration loop starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SketchError {
    #[error("source image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("palette is empty")]
    EmptyPalette,
    #[error("line length limit must be at least 1")]
    InvalidLineLength,
}
