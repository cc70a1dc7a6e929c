//! Convolution kernels and the fixed masks used by the named edge operators.
//!
//! A [`Kernel`] is an immutable grid of `f32` weights stored row-major with an
//! anchor that marks the grid cell aligned to the output pixel. Odd sized
//! kernels default to their center; even sized kernels (e.g. Roberts' 2x2
//! masks) must name their anchor explicitly.

use crate::error::{EdgeError, Result};
use std::f32::consts::SQRT_2;

/// A small grid of signed weights approximating a derivative or smoothing filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    weights: Vec<f32>,
    anchor: (usize, usize),
}

impl Kernel {
    /// Creates a kernel anchored at its center.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeError::InvalidKernel`] if either side is zero or even, or
    /// if `weights.len() != width * height`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gradient_edge::Kernel;
    ///
    /// let k = Kernel::new(3, 1, vec![-1.0, 0.0, 1.0]).unwrap();
    /// assert_eq!(k.anchor(), (1, 0));
    /// assert!(Kernel::new(2, 2, vec![1.0, 0.0, 0.0, -1.0]).is_err());
    /// ```
    pub fn new(width: usize, height: usize, weights: Vec<f32>) -> Result<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(EdgeError::InvalidKernel(format!(
                "{width}x{height} kernel has an even side and no explicit anchor"
            )));
        }
        Self::with_anchor(width, height, weights, (width / 2, height / 2))
    }

    /// Creates a kernel with an explicit `(x, y)` anchor.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeError::InvalidKernel`] if the grid is empty, the weight
    /// count does not match the dimensions, or the anchor lies outside the grid.
    pub fn with_anchor(
        width: usize,
        height: usize,
        weights: Vec<f32>,
        anchor: (usize, usize),
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EdgeError::InvalidKernel(format!(
                "{width}x{height} kernel is empty"
            )));
        }
        if weights.len() != width * height {
            return Err(EdgeError::InvalidKernel(format!(
                "{width}x{height} kernel needs {} weights, got {}",
                width * height,
                weights.len()
            )));
        }
        if anchor.0 >= width || anchor.1 >= height {
            return Err(EdgeError::InvalidKernel(format!(
                "anchor {anchor:?} outside {width}x{height} kernel"
            )));
        }
        Ok(Self {
            width,
            height,
            weights,
            anchor,
        })
    }

    /// Builds a centered 3x3 kernel from rows.
    pub fn from_rows3(rows: [[f32; 3]; 3]) -> Self {
        Self {
            width: 3,
            height: 3,
            weights: rows.iter().flatten().copied().collect(),
            anchor: (1, 1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Anchor cell as `(x, y)`.
    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    /// Row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at column `i`, row `j`.
    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f32 {
        self.weights[j * self.width + i]
    }

    /// The same weights mirrored across the main diagonal, anchor swapped.
    pub fn transposed(&self) -> Self {
        let mut weights = Vec::with_capacity(self.weights.len());
        for i in 0..self.width {
            for j in 0..self.height {
                weights.push(self.weight(i, j));
            }
        }
        Self {
            width: self.height,
            height: self.width,
            weights,
            anchor: (self.anchor.1, self.anchor.0),
        }
    }

    /// The 1x1 kernel `[1]`; convolution with it leaves an image unchanged.
    pub fn identity() -> Self {
        Self {
            width: 1,
            height: 1,
            weights: vec![1.0],
            anchor: (0, 0),
        }
    }
}

/// 3x3 approximate Gaussian `[1 2 1; 2 4 2; 1 2 1] / 16`.
pub fn gaussian_3x3() -> Kernel {
    Kernel::from_rows3([
        [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
        [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
        [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    ])
}

/// Horizontal Sobel derivative, responds to vertical edges.
///
/// ```text
/// [-1  0  1]
/// [-2  0  2]
/// [-1  0  1]
/// ```
pub fn sobel_x() -> Kernel {
    Kernel::from_rows3([[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]])
}

/// Vertical Sobel derivative, the transpose of [`sobel_x`].
pub fn sobel_y() -> Kernel {
    sobel_x().transposed()
}

/// Horizontal Prewitt derivative.
///
/// ```text
/// [-1  0  1]
/// [-1  0  1]
/// [-1  0  1]
/// ```
pub fn prewitt_x() -> Kernel {
    Kernel::from_rows3([[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]])
}

pub fn prewitt_y() -> Kernel {
    prewitt_x().transposed()
}

/// Roberts cross, main diagonal: `[1 0; 0 -1]` anchored top-left.
pub fn roberts_main() -> Kernel {
    Kernel {
        width: 2,
        height: 2,
        weights: vec![1.0, 0.0, 0.0, -1.0],
        anchor: (0, 0),
    }
}

/// Roberts cross, anti diagonal: `[0 1; -1 0]` anchored top-left.
pub fn roberts_anti() -> Kernel {
    Kernel {
        width: 2,
        height: 2,
        weights: vec![0.0, 1.0, -1.0, 0.0],
        anchor: (0, 0),
    }
}

/// The four Frei-Chen edge-subspace masks, unnormalized, in pairing order.
///
/// ```text
/// G1 [ 1  √2  1]   G2 [ 1  0  -1]   G3 [ 0  -1  √2]   G4 [√2  -1   0]
///    [ 0   0  0]      [√2  0 -√2]      [ 1   0  -1]      [-1   0   1]
///    [-1 -√2 -1]      [ 1  0  -1]      [-√2  1   0]      [ 0   1 -√2]
/// ```
pub fn frei_chen() -> [Kernel; 4] {
    [
        Kernel::from_rows3([[1.0, SQRT_2, 1.0], [0.0, 0.0, 0.0], [-1.0, -SQRT_2, -1.0]]),
        Kernel::from_rows3([[1.0, 0.0, -1.0], [SQRT_2, 0.0, -SQRT_2], [1.0, 0.0, -1.0]]),
        Kernel::from_rows3([[0.0, -1.0, SQRT_2], [1.0, 0.0, -1.0], [-SQRT_2, 1.0, 0.0]]),
        Kernel::from_rows3([[SQRT_2, -1.0, 0.0], [-1.0, 0.0, 1.0], [0.0, 1.0, -SQRT_2]]),
    ]
}

/// 4-neighbour Laplacian used by Marr-Hildreth.
pub fn laplacian() -> Kernel {
    Kernel::from_rows3([[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]])
}
