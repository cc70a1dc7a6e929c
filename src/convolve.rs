//! Straightforward 2D convolution with configurable border handling.

use crate::error::{EdgeError, Result};
use crate::kernel::{self, Kernel};
use image::{GrayImage, ImageBuffer, Luma, Primitive};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Wide (unclipped) filter response, one `f32` per pixel.
pub type Response = ImageBuffer<Luma<f32>, Vec<f32>>;

/// How samples outside the image are synthesized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderMode {
    /// Clamp to the nearest edge pixel: `aaa|abc|ccc`.
    #[default]
    Replicate,
    /// Treat outside samples as 0.
    Zero,
    /// Mirror including the edge pixel: `cba|abc|cba`.
    Reflect,
}

impl BorderMode {
    /// Maps a possibly out-of-range coordinate onto `0..len`, or `None` for a
    /// zero sample.
    #[inline]
    fn resolve(self, i: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        match self {
            BorderMode::Replicate => Some(i.clamp(0, n - 1) as usize),
            BorderMode::Zero => None,
            BorderMode::Reflect => {
                let period = 2 * n;
                let m = i.rem_euclid(period);
                let mirrored = if m < n { m } else { period - 1 - m };
                Some(mirrored as usize)
            }
        }
    }
}

impl std::str::FromStr for BorderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replicate" | "clamp" => Ok(BorderMode::Replicate),
            "zero" | "constant" => Ok(BorderMode::Zero),
            "reflect" | "mirror" => Ok(BorderMode::Reflect),
            other => Err(format!("unknown border mode: {other}")),
        }
    }
}

/// Correlates `image` with `kernel`:
/// `response[x,y] = Σ kernel[i,j] * source[x+i-ax, y+j-ay]`.
///
/// The kernel is not flipped. Rows are computed in parallel and the output
/// keeps the full `f32` range.
///
/// # Errors
///
/// [`EdgeError::EmptyImage`] if the image has zero width or height.
///
/// # Examples
///
/// ```
/// use gradient_edge::{convolve, kernel, BorderMode};
/// use image::{GrayImage, Luma};
///
/// let img = GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 0 } else { 255 }]));
/// let gx = convolve(&img, &kernel::sobel_x(), BorderMode::Replicate).unwrap();
/// assert_eq!(gx.get_pixel(1, 1)[0], 1020.0);
/// assert_eq!(gx.get_pixel(0, 1)[0], 0.0);
/// ```
pub fn convolve<T>(
    image: &ImageBuffer<Luma<T>, Vec<T>>,
    kernel: &Kernel,
    border: BorderMode,
) -> Result<Response>
where
    T: Primitive + Into<f32> + Sync,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EdgeError::EmptyImage);
    }
    let (w, h) = (width as usize, height as usize);
    let (ax, ay) = kernel.anchor();
    let src = image.as_raw();
    let mut out = vec![0.0f32; w * h];

    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for j in 0..kernel.height() {
                let sy = y as isize + j as isize - ay as isize;
                let Some(sy) = border.resolve(sy, h) else {
                    continue;
                };
                let src_row = &src[sy * w..(sy + 1) * w];
                for i in 0..kernel.width() {
                    let sx = x as isize + i as isize - ax as isize;
                    if let Some(sx) = border.resolve(sx, w) {
                        acc += kernel.weight(i, j) * src_row[sx].into();
                    }
                }
            }
            *px = acc;
        }
    });

    ImageBuffer::from_raw(width, height, out).ok_or(EdgeError::DimensionMismatch {
        left: (width, height),
        right: (width, height),
    })
}

/// Clips to `[0, 255]` and truncates. NaN maps to 0.
///
/// ```
/// use gradient_edge::saturate_u8;
///
/// assert_eq!(saturate_u8(1020.0), 255);
/// assert_eq!(saturate_u8(-3.0), 0);
/// assert_eq!(saturate_u8(127.9), 127);
/// ```
#[inline]
pub fn saturate_u8(value: f32) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.clamp(0.0, 255.0) as u8
    }
}

/// Converts a response to 8 bits by taking `|v|` and saturating.
pub fn abs_to_u8(response: &Response) -> Result<GrayImage> {
    let data = response.as_raw().par_iter().map(|v| saturate_u8(v.abs())).collect();
    gray_from_raw(response.width(), response.height(), data)
}

pub(crate) fn gray_from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<GrayImage> {
    let len = data.len();
    GrayImage::from_raw(width, height, data).ok_or(EdgeError::DimensionMismatch {
        left: (width, height),
        right: (len as u32, 1),
    })
}

/// Smooths with the fixed 3x3 approximate Gaussian, rounding to nearest.
///
/// Every named operator runs this before differentiation.
pub fn gaussian_smooth(image: &GrayImage, border: BorderMode) -> Result<GrayImage> {
    let blurred = convolve(image, &kernel::gaussian_3x3(), border)?;
    let data = blurred
        .as_raw()
        .par_iter()
        .map(|v| saturate_u8(v.round()))
        .collect();
    gray_from_raw(image.width(), image.height(), data)
}
