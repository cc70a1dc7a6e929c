//! Combination of directional responses into one 8-bit edge map.
//!
//! All pair combinations use the equal-weighted average of absolute values,
//! `0.5·|a| + 0.5·|b|`, not the Euclidean norm. Changing the weights changes
//! edge intensity, and the reference edge maps in the test suite depend on
//! them exactly.

use crate::convolve::{abs_to_u8, gray_from_raw, saturate_u8, Response};
use crate::error::{EdgeError, Result};
use image::{GrayImage, ImageBuffer, Luma, Primitive};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Weight of each input in a pair combination.
pub const PAIR_WEIGHT: f32 = 0.5;

/// How an operator reduces its kernel responses to one magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Combination {
    /// One response, `|g|`.
    Single,
    /// Two responses, `0.5·|gx| + 0.5·|gy|`.
    Pair,
    /// Four responses paired as `combine(combine(g1, g2), combine(g3, g4))`.
    NestedPairs,
}

impl Combination {
    /// Number of responses this rule consumes.
    pub fn arity(self) -> usize {
        match self {
            Combination::Single => 1,
            Combination::Pair => 2,
            Combination::NestedPairs => 4,
        }
    }
}

/// `0.5·|a| + 0.5·|b|` per pixel, clipped to `[0, 255]` and truncated.
///
/// Works on wide responses and on already 8-bit maps, which is what the
/// nested Frei-Chen pairing feeds back in.
///
/// # Errors
///
/// [`EdgeError::DimensionMismatch`] if the inputs differ in size.
///
/// # Examples
///
/// ```
/// use gradient_edge::{combine, Response};
///
/// let gx = Response::from_raw(2, 1, vec![-100.0, 600.0]).unwrap();
/// let gy = Response::from_raw(2, 1, vec![51.0, 0.0]).unwrap();
/// assert_eq!(combine(&gx, &gy).unwrap().as_raw(), &vec![75, 255]);
/// ```
pub fn combine<T>(
    a: &ImageBuffer<Luma<T>, Vec<T>>,
    b: &ImageBuffer<Luma<T>, Vec<T>>,
) -> Result<GrayImage>
where
    T: Primitive + Into<f32> + Sync,
{
    if a.dimensions() != b.dimensions() {
        return Err(EdgeError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }
    let data = a
        .as_raw()
        .par_iter()
        .zip(b.as_raw().par_iter())
        .map(|(&pa, &pb)| {
            let pa: f32 = pa.into();
            let pb: f32 = pb.into();
            saturate_u8(PAIR_WEIGHT * pa.abs() + PAIR_WEIGHT * pb.abs())
        })
        .collect();
    gray_from_raw(a.width(), a.height(), data)
}

/// Reduces `responses` with `rule` into a single 8-bit edge map.
///
/// # Errors
///
/// [`EdgeError::InvalidKernel`] if the response count does not match the rule,
/// [`EdgeError::DimensionMismatch`] if the responses differ in size.
pub fn magnitude(responses: &[Response], rule: Combination) -> Result<GrayImage> {
    if responses.len() != rule.arity() {
        return Err(EdgeError::InvalidKernel(format!(
            "{rule:?} combines {} responses, got {}",
            rule.arity(),
            responses.len()
        )));
    }
    match (rule, responses) {
        (Combination::Single, [g]) => abs_to_u8(g),
        (Combination::Pair, [gx, gy]) => combine(gx, gy),
        (Combination::NestedPairs, [g1, g2, g3, g4]) => {
            let first = combine(g1, g2)?;
            let second = combine(g3, g4)?;
            combine(&first, &second)
        }
        _ => Err(EdgeError::InvalidKernel(format!(
            "{rule:?} cannot combine {} responses",
            responses.len()
        ))),
    }
}
