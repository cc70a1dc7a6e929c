//! Binary thresholding of edge maps and the slider-style control that feeds it.

use image::{GrayImage, Luma};
use imageproc::definitions::{HasBlack, HasWhite};
use rayon::prelude::*;

/// Cutoff used when an operator needs one and none was supplied.
pub const DEFAULT_THRESHOLD: u8 = 50;

/// Sets a pixel to white (255) if it is strictly greater than `cutoff`,
/// otherwise to black (0).
///
/// This is a plain binary threshold. Two-threshold hysteresis lives in
/// [`crate::canny`].
///
/// # Examples
///
/// ```
/// use gradient_edge::threshold_edges;
/// use image::GrayImage;
///
/// let map = GrayImage::from_raw(4, 1, vec![0, 50, 100, 200]).unwrap();
/// assert_eq!(threshold_edges(&map, 100).as_raw(), &vec![0, 0, 0, 255]);
/// ```
pub fn threshold_edges(edge_map: &GrayImage, cutoff: u8) -> GrayImage {
    let on = Luma::<u8>::white()[0];
    let off = Luma::<u8>::black()[0];
    let mut out = edge_map.clone();
    let samples: &mut [u8] = &mut out;
    samples
        .par_iter_mut()
        .for_each(|p| *p = if *p > cutoff { on } else { off });
    out
}

/// Number of white pixels in a binary map.
pub fn count_on(binary: &GrayImage) -> usize {
    let on = Luma::<u8>::white()[0];
    binary.as_raw().par_iter().filter(|&&p| p == on).count()
}

/// Source of the current cutoff, typically a UI slider.
///
/// Implementations are read on every render; callers must not cache the value.
pub trait ThresholdControl {
    fn current(&self) -> u8;
}

/// A bounded integer slider in `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trackbar {
    value: u8,
    max: u8,
}

impl Trackbar {
    /// Creates a slider; `value` is clamped to `max`.
    pub fn new(value: u8, max: u8) -> Self {
        Self {
            value: value.min(max),
            max,
        }
    }

    /// Moves the slider, clamping to its range. Returns the stored value.
    pub fn set(&mut self, value: u8) -> u8 {
        self.value = value.min(self.max);
        self.value
    }

    pub fn max(&self) -> u8 {
        self.max
    }
}

impl Default for Trackbar {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, u8::MAX)
    }
}

impl ThresholdControl for Trackbar {
    fn current(&self) -> u8 {
        self.value
    }
}

impl ThresholdControl for u8 {
    fn current(&self) -> u8 {
        *self
    }
}
