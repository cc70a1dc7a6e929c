//! Canny edge detection: a separate two-threshold algorithm.
//!
//! Unlike the kernel operators, Canny thins edges with non-maximum
//! suppression and links weak pixels to strong ones through hysteresis, so it
//! does not go through the [`crate::magnitude`] combination rules.

use crate::convolve::{convolve, gaussian_smooth, BorderMode, Response};
use crate::error::{EdgeError, Result};
use crate::kernel;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::{HasBlack, HasWhite};
use rayon::prelude::*;
use std::f32::consts::PI;

/// High threshold as a multiple of the low one when driven by a single slider.
pub const CANNY_RATIO: f32 = 3.0;

/// Runs Canny on `image` and returns a binary 0/255 edge map.
///
/// # Arguments
///
/// * `image` - Input grayscale image, smoothed internally with the 3x3 Gaussian
/// * `low_threshold` - Weak edges must reach this magnitude to be linked
/// * `high_threshold` - Pixels at or above this magnitude seed edges
/// * `border` - Border policy for smoothing and gradient convolution
///
/// # Errors
///
/// [`EdgeError::InvalidThreshold`] if `low_threshold > high_threshold`,
/// [`EdgeError::EmptyImage`] for a zero-area input.
///
/// # Algorithm Pipeline
///
/// 1. Gaussian smoothing
/// 2. Sobel gradients (Gx, Gy) and L2 magnitude
/// 3. Non-maximum suppression for edge thinning
/// 4. Hysteresis thresholding for edge connectivity
///
/// # Examples
///
/// ```
/// use gradient_edge::{canny, BorderMode};
/// use image::{GrayImage, Luma};
///
/// let img = GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 0 } else { 255 }]));
/// let edges = canny(&img, 50.0, 150.0, BorderMode::Replicate).unwrap();
/// assert_eq!(edges.get_pixel(3, 3)[0], 255);
/// assert_eq!(edges.get_pixel(0, 3)[0], 0);
/// ```
pub fn canny(
    image: &GrayImage,
    low_threshold: f32,
    high_threshold: f32,
    border: BorderMode,
) -> Result<GrayImage> {
    if low_threshold > high_threshold {
        return Err(EdgeError::InvalidThreshold {
            low: low_threshold,
            high: high_threshold,
        });
    }
    let smoothed = gaussian_smooth(image, border)?;
    debug!("canny: smoothed");

    let gx = convolve(&smoothed, &kernel::sobel_x(), border)?;
    let gy = convolve(&smoothed, &kernel::sobel_y(), border)?;
    debug!("canny: gx and gy ok");

    let mag_data: Vec<f32> = gx
        .as_raw()
        .par_iter()
        .zip(gy.as_raw().par_iter())
        .map(|(h, v)| h.hypot(*v))
        .collect();
    let mag: Response = ImageBuffer::from_raw(image.width(), image.height(), mag_data).ok_or(
        EdgeError::DimensionMismatch {
            left: image.dimensions(),
            right: gx.dimensions(),
        },
    )?;

    let thinned = non_maximum_suppression(&mag, &gx, &gy);
    debug!("canny: thinned ok");

    let edges = hysteresis(&thinned, low_threshold, high_threshold);
    debug!("canny: {} edge pixels", crate::threshold::count_on(&edges));
    Ok(edges)
}

/// Canny driven by one slider value: `high = low * CANNY_RATIO`.
pub fn canny_with_ratio(image: &GrayImage, low: u8, border: BorderMode) -> Result<GrayImage> {
    let low = f32::from(low);
    canny(image, low, low * CANNY_RATIO, border)
}

/// Zeroes every pixel that is not a local maximum along its gradient direction.
///
/// The direction is quantized to 0°, 45°, 90° or 135° and the two neighbours
/// along it are compared. Neighbours outside the image clamp to the edge.
fn non_maximum_suppression(g: &Response, gx: &Response, gy: &Response) -> Response {
    const RADIANS_TO_DEGREES: f32 = 180f32 / PI;

    let (width, height) = g.dimensions();
    let at = |x: i64, y: i64| -> f32 {
        let cx = x.clamp(0, width as i64 - 1) as u32;
        let cy = y.clamp(0, height as i64 - 1) as u32;
        g.get_pixel(cx, cy)[0]
    };

    ImageBuffer::from_fn(width, height, |x, y| {
        let mut angle = gy.get_pixel(x, y)[0].atan2(gx.get_pixel(x, y)[0]) * RADIANS_TO_DEGREES;
        if angle < 0.0 {
            angle += 180.0
        }

        let (xi, yi) = (x as i64, y as i64);
        let (cmp1, cmp2) = if !(22.5..157.5).contains(&angle) {
            (at(xi - 1, yi), at(xi + 1, yi))
        } else if (22.5..67.5).contains(&angle) {
            (at(xi + 1, yi + 1), at(xi - 1, yi - 1))
        } else if (67.5..112.5).contains(&angle) {
            (at(xi, yi - 1), at(xi, yi + 1))
        } else {
            (at(xi - 1, yi + 1), at(xi + 1, yi - 1))
        };

        let pixel = g.get_pixel(x, y)[0];
        if pixel < cmp1 || pixel < cmp2 {
            Luma([0.0])
        } else {
            Luma([pixel])
        }
    })
}

/// Keeps pixels `>= high_thresh` and every pixel `>= low_thresh` connected to
/// one through 8-neighbours. Pixels zeroed by suppression never qualify, even
/// at zero thresholds.
fn hysteresis(input: &Response, low_thresh: f32, high_thresh: f32) -> GrayImage {
    let max_brightness = Luma::<u8>::white();
    let min_brightness = Luma::<u8>::black();
    let (width, height) = input.dimensions();
    let mut out = ImageBuffer::from_pixel(width, height, min_brightness);

    // Explicit stack instead of recursion.
    let mut edges = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let strength = input.get_pixel(x, y)[0];
            if strength <= 0.0 || strength < high_thresh || out.get_pixel(x, y)[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, max_brightness);
            edges.push((x, y));

            while let Some((nx, ny)) = edges.pop() {
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (px, py) = (nx as i64 + dx, ny as i64 + dy);
                        if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                            continue;
                        }
                        let (px, py) = (px as u32, py as u32);
                        let weak = input.get_pixel(px, py)[0];
                        if weak > 0.0 && weak >= low_thresh && out.get_pixel(px, py)[0] == 0 {
                            out.put_pixel(px, py, max_brightness);
                            edges.push((px, py));
                        }
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([if x < width / 2 { 0 } else { 255 }]))
    }

    #[test]
    fn step_edge_is_thinned_to_boundary() {
        let edges = canny(&step(8, 8), 50.0, 150.0, BorderMode::Replicate).unwrap();
        for y in 0..8 {
            let row: Vec<u8> = (0..8).map(|x| edges.get_pixel(x, y)[0]).collect();
            assert_eq!(row, vec![0, 0, 0, 255, 255, 0, 0, 0], "row {y}");
        }
    }

    #[test]
    fn flat_field_has_no_edges() {
        let flat = GrayImage::from_pixel(6, 6, Luma([128]));
        let edges = canny(&flat, 1.0, 2.0, BorderMode::Replicate).unwrap();
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn zero_cutoff_keeps_flat_field_empty() {
        let flat = GrayImage::from_pixel(6, 6, Luma([128]));
        let edges = canny(&flat, 0.0, 0.0, BorderMode::Replicate).unwrap();
        assert_eq!(crate::threshold::count_on(&edges), 0);

        let edges = canny_with_ratio(&flat, 0, BorderMode::Replicate).unwrap();
        assert_eq!(crate::threshold::count_on(&edges), 0);
    }

    #[test]
    fn zero_cutoff_still_finds_the_step() {
        let edges = canny_with_ratio(&step(8, 8), 0, BorderMode::Replicate).unwrap();
        for y in 0..8 {
            assert_eq!(edges.get_pixel(3, y)[0], 255);
            assert_eq!(edges.get_pixel(0, y)[0], 0);
        }
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = canny(&step(4, 4), 100.0, 10.0, BorderMode::Replicate).unwrap_err();
        assert!(matches!(err, EdgeError::InvalidThreshold { .. }));
    }

    #[test]
    fn weak_pixels_link_only_to_strong_ones() {
        // Strong seed at (0,0) with a weak chain; an isolated weak pixel at (4,0).
        let input = Response::from_raw(5, 1, vec![200.0, 60.0, 60.0, 0.0, 60.0]).unwrap();
        let out = hysteresis(&input, 50.0, 150.0);
        assert_eq!(out.as_raw(), &vec![255, 255, 255, 0, 0]);
    }

    #[test]
    fn ratio_variant_matches_explicit_thresholds() {
        let img = step(8, 8);
        let a = canny_with_ratio(&img, 40, BorderMode::Replicate).unwrap();
        let b = canny(&img, 40.0, 120.0, BorderMode::Replicate).unwrap();
        assert_eq!(a, b);
    }
}
