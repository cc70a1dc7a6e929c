use std::path::PathBuf;

/// Errors reported by the edge detection pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    /// The image could not be opened or decoded.
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A zero width or zero height image reached the pipeline.
    #[error("input image has zero area")]
    EmptyImage,

    /// Kernel construction failed or a kernel set is inconsistent.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Two responses that must be combined have different dimensions.
    #[error("dimension mismatch: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },

    /// Hysteresis thresholds are out of order.
    #[error("low threshold {low} exceeds high threshold {high}")]
    InvalidThreshold { low: f32, high: f32 },

    /// The operator has no cutoff-independent gradient map.
    #[error("{0} has no separate gradient stage, run the full detector instead")]
    NoGradientStage(String),

    #[error("unknown edge operator: {0}")]
    UnknownOperator(String),

    /// The caller supplied an incomplete set of options.
    #[error("usage: {0}")]
    Usage(String),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EdgeError>;
