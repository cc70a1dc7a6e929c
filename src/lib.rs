//! # Gradient Edge Detection Library
//!
//! This crate implements the classic edge operators (Sobel, Prewitt, Roberts,
//! Frei-Chen, Marr-Hildreth and Canny) on top of an explicit 2D convolution
//! with configurable borders. Convolution and magnitude combination run
//! row-parallel with rayon and never mutate their inputs.
//!
//! ## Features
//!
//! - Kernel convolution with replicate, zero or reflect borders
//! - Fixed 3x3 Gaussian pre-smoothing before every operator
//! - Equal-weighted (`0.5·|gx| + 0.5·|gy|`) magnitude combination
//! - Nested Frei-Chen pairing over its four edge masks
//! - Binary thresholding and Canny hysteresis
//! - Slider-driven sessions that memoize the gradient stage
//! - Optional debug logging (enable with `logger` feature)
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use gradient_edge::{detect_edges, FileImageSource, ImageSource, Operator};
//! use std::path::Path;
//!
//! let image = FileImageSource.decode(Path::new("example.png")).unwrap();
//! let edges = detect_edges(&image, Operator::Sobel, None).unwrap();
//! edges.save("edges_output.png").unwrap();
//! ```
//!
//! ## Optional Features
//!
//! ### Logger Feature
//!
//! Enable debug logging to monitor the pipeline stages:
//!
//! ```toml
//! [dependencies]
//! gradient-edge = { version = "0.1.0", features = ["logger"] }
//! log = "0.4"
//! env_logger = "0.11"
//! ```
//!
//! ```rust,no_run
//! use gradient_edge::{GradientEdgeFilter, Operator};
//!
//! env_logger::init();
//!
//! let image = image::open("example.png").unwrap().to_luma8();
//! let edges = GradientEdgeFilter::new(Operator::FreiChen).gradient(&image).unwrap();
//! // With logger feature, you'll see debug messages like:
//! // DEBUG gradient_edge::operator: frei-chen: smoothed 640x480
//! // DEBUG gradient_edge::operator: frei-chen: 4 responses ok
//! ```
//!
//! ## Interactive Usage
//!
//! ```rust,no_run
//! use gradient_edge::{EdgeSession, GradientEdgeFilter, Operator, RecordingSink, Trackbar};
//!
//! let image = image::open("example.png").unwrap().to_luma8();
//! let filter = GradientEdgeFilter::new(Operator::MarrHildreth);
//! let mut session = EdgeSession::new(image, filter, Trackbar::new(30, 255)).unwrap();
//! let mut sink = RecordingSink::default();
//!
//! for position in [10, 30, 60] {
//!     session.control_mut().set(position);
//!     session.render_to(&mut sink).unwrap();
//! }
//! assert_eq!(session.gradient_runs(), 1);
//! ```

// Conditional logging macros
#[cfg(feature = "logger")]
macro_rules! debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub mod canny;
pub mod config;
pub mod convolve;
pub mod error;
pub mod io;
pub mod kernel;
pub mod magnitude;
pub mod operator;
pub mod session;
pub mod threshold;

pub use canny::{canny, canny_with_ratio, CANNY_RATIO};
pub use config::{load_config, DetectorConfig};
pub use convolve::{abs_to_u8, convolve, gaussian_smooth, saturate_u8, BorderMode, Response};
pub use error::{EdgeError, Result};
pub use io::{EdgeSink, FileImageSource, FileSink, ImageInfo, ImageSource, NullSink, RecordingSink};
pub use kernel::Kernel;
pub use magnitude::{combine, magnitude, Combination, PAIR_WEIGHT};
pub use operator::{detect_edges, GradientEdgeFilter, KernelSet, Operator};
pub use session::EdgeSession;
pub use threshold::{count_on, threshold_edges, ThresholdControl, Trackbar, DEFAULT_THRESHOLD};
