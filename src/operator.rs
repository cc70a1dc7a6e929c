//! Registry of the named edge operators and the filter that runs them.
//!
//! Each [`Operator`] maps to a kernel set, a [`Combination`] rule and whether
//! it must be binarized. [`GradientEdgeFilter`] splits a run into the
//! expensive gradient stage and the cheap thresholding stage so that callers
//! reacting to a slider can redo only the latter.

use crate::canny::canny_with_ratio;
use crate::convolve::{convolve, gaussian_smooth, BorderMode, Response};
use crate::error::{EdgeError, Result};
use crate::kernel::{self, Kernel};
use crate::magnitude::{magnitude, Combination};
use crate::threshold::{threshold_edges, DEFAULT_THRESHOLD};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six classic edge detectors, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Canny,
    MarrHildreth,
    Roberts,
    Prewitt,
    Sobel,
    FreiChen,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Canny,
        Operator::MarrHildreth,
        Operator::Roberts,
        Operator::Prewitt,
        Operator::Sobel,
        Operator::FreiChen,
    ];

    /// 1-based menu number.
    pub fn menu_number(self) -> u8 {
        match self {
            Operator::Canny => 1,
            Operator::MarrHildreth => 2,
            Operator::Roberts => 3,
            Operator::Prewitt => 4,
            Operator::Sobel => 5,
            Operator::FreiChen => 6,
        }
    }

    pub fn from_menu_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.menu_number() == number)
    }

    /// Kebab-case identifier, also the serde and CLI spelling.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Canny => "canny",
            Operator::MarrHildreth => "marr-hildreth",
            Operator::Roberts => "roberts",
            Operator::Prewitt => "prewitt",
            Operator::Sobel => "sobel",
            Operator::FreiChen => "frei-chen",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Operator::Canny => "Canny Edge Detector",
            Operator::MarrHildreth => "Marr-Hildreth Edge Detector",
            Operator::Roberts => "Roberts Edge Detector",
            Operator::Prewitt => "Prewitt Edge Detector",
            Operator::Sobel => "Sobel Edge Detector",
            Operator::FreiChen => "Frei-Chen Edge Detector",
        }
    }

    /// Kernel set and combination rule, or `None` for Canny, which has its own
    /// algorithm.
    pub fn kernel_set(self) -> Option<KernelSet> {
        let (kernels, combination) = match self {
            Operator::Canny => return None,
            Operator::MarrHildreth => (vec![kernel::laplacian()], Combination::Single),
            Operator::Roberts => (
                vec![kernel::roberts_main(), kernel::roberts_anti()],
                Combination::Pair,
            ),
            Operator::Prewitt => (
                vec![kernel::prewitt_x(), kernel::prewitt_y()],
                Combination::Pair,
            ),
            Operator::Sobel => (vec![kernel::sobel_x(), kernel::sobel_y()], Combination::Pair),
            Operator::FreiChen => (kernel::frei_chen().to_vec(), Combination::NestedPairs),
        };
        Some(KernelSet {
            kernels,
            combination,
        })
    }

    /// Whether the operator always binarizes its output.
    pub fn needs_threshold(self) -> bool {
        matches!(self, Operator::Canny | Operator::MarrHildreth)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = EdgeError;

    /// Accepts the kebab-case name (case-insensitive, `_` or `-`) or the menu
    /// number.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return Self::from_menu_number(number)
                .ok_or_else(|| EdgeError::UnknownOperator(trimmed.to_string()));
        }
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        let alias = match normalized.as_str() {
            "marr" | "log" | "marrhildreth" => "marr-hildreth",
            "frei" | "freichen" | "frie-chen" => "frei-chen",
            "robert" | "roberts-cross" => "roberts",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|op| op.name() == alias)
            .ok_or_else(|| EdgeError::UnknownOperator(trimmed.to_string()))
    }
}

/// Kernels of one operator together with how their responses combine.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSet {
    pub kernels: Vec<Kernel>,
    pub combination: Combination,
}

impl KernelSet {
    /// Checks that the kernel count fits the combination rule and that paired
    /// kernels share dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.kernels.len() != self.combination.arity() {
            return Err(EdgeError::InvalidKernel(format!(
                "{:?} needs {} kernels, got {}",
                self.combination,
                self.combination.arity(),
                self.kernels.len()
            )));
        }
        if let Some(first) = self.kernels.first() {
            let shape = (first.width(), first.height());
            if let Some(other) = self
                .kernels
                .iter()
                .find(|k| (k.width(), k.height()) != shape)
            {
                return Err(EdgeError::InvalidKernel(format!(
                    "paired kernels differ: {shape:?} vs {:?}",
                    (other.width(), other.height())
                )));
            }
        }
        Ok(())
    }

    /// Convolves `image` with every kernel, in order.
    pub fn responses(&self, image: &GrayImage, border: BorderMode) -> Result<Vec<Response>> {
        self.kernels
            .iter()
            .map(|k| convolve(image, k, border))
            .collect()
    }
}

/// Runs one named operator over grayscale images.
///
/// # Examples
///
/// ```
/// use gradient_edge::{GradientEdgeFilter, Operator};
/// use image::{GrayImage, Luma};
///
/// let img = GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 0 } else { 255 }]));
/// let filter = GradientEdgeFilter::new(Operator::Sobel);
///
/// let edges = filter.gradient(&img).unwrap();
/// assert_eq!(edges.get_pixel(0, 0)[0], 128);
///
/// let binary = filter.apply(&img, Some(200)).unwrap();
/// assert_eq!(binary.get_pixel(0, 0)[0], 0);
/// assert_eq!(binary.get_pixel(1, 0)[0], 255);
/// ```
#[derive(Debug, Clone)]
pub struct GradientEdgeFilter {
    operator: Operator,
    border: BorderMode,
    kernels: Option<KernelSet>,
}

impl GradientEdgeFilter {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            border: BorderMode::default(),
            kernels: operator.kernel_set(),
        }
    }

    /// Filter over a custom kernel set, reported as `operator`.
    ///
    /// # Errors
    ///
    /// [`EdgeError::InvalidKernel`] if the set fails [`KernelSet::validate`].
    pub fn with_kernels(operator: Operator, kernels: KernelSet) -> Result<Self> {
        kernels.validate()?;
        Ok(Self {
            operator,
            border: BorderMode::default(),
            kernels: Some(kernels),
        })
    }

    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn border(&self) -> BorderMode {
        self.border
    }

    /// Whether the output can only be produced with the cutoff in hand. True
    /// for Canny, which links edges using the threshold itself and therefore
    /// has no [`gradient`](Self::gradient) stage.
    pub fn gradient_depends_on_cutoff(&self) -> bool {
        self.kernels.is_none()
    }

    /// The expensive stage: smoothing, convolution and magnitude combination.
    ///
    /// # Errors
    ///
    /// [`EdgeError::NoGradientStage`] for Canny, whose edge map cannot be
    /// split from its thresholds; use [`apply`](Self::apply) instead.
    /// [`EdgeError::EmptyImage`] for a zero-area input.
    pub fn gradient(&self, image: &GrayImage) -> Result<GrayImage> {
        let Some(set) = &self.kernels else {
            return Err(EdgeError::NoGradientStage(self.operator.title().to_string()));
        };
        let smoothed = gaussian_smooth(image, self.border)?;
        debug!("{}: smoothed {}x{}", self.operator, image.width(), image.height());
        let responses = set.responses(&smoothed, self.border)?;
        debug!("{}: {} responses ok", self.operator, responses.len());
        magnitude(&responses, set.combination)
    }

    /// The cheap stage: binarizes a gradient when the operator needs it or a
    /// cutoff was supplied.
    pub fn finish(&self, gradient: GrayImage, cutoff: Option<u8>) -> GrayImage {
        if self.gradient_depends_on_cutoff() {
            return gradient;
        }
        match self.effective_cutoff(cutoff) {
            Some(c) => threshold_edges(&gradient, c),
            None => gradient,
        }
    }

    /// Cutoff that [`finish`](Self::finish) will use, if any.
    pub fn effective_cutoff(&self, cutoff: Option<u8>) -> Option<u8> {
        match cutoff {
            Some(c) => Some(c),
            None if self.operator.needs_threshold() => Some(DEFAULT_THRESHOLD),
            None => None,
        }
    }

    /// Full run: gradient then [`finish`](Self::finish).
    ///
    /// Canny runs as one algorithm with `cutoff` (or the default) as its low
    /// threshold.
    pub fn apply(&self, image: &GrayImage, cutoff: Option<u8>) -> Result<GrayImage> {
        let effective = self.effective_cutoff(cutoff);
        if self.gradient_depends_on_cutoff() {
            let low = effective.unwrap_or(DEFAULT_THRESHOLD);
            return canny_with_ratio(image, low, self.border);
        }
        let gradient = self.gradient(image)?;
        Ok(self.finish(gradient, effective))
    }
}

/// Convenience for a one-shot run with the default border.
pub fn detect_edges(image: &GrayImage, operator: Operator, cutoff: Option<u8>) -> Result<GrayImage> {
    GradientEdgeFilter::new(operator).apply(image, cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn registry_is_consistent() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_menu_number(op.menu_number()), Some(op));
            assert_eq!(op.name().parse::<Operator>().unwrap(), op);
            assert_eq!(op.to_string(), op.name());
            match op.kernel_set() {
                Some(set) => set.validate().unwrap(),
                None => assert_eq!(op, Operator::Canny),
            }
        }
    }

    #[test]
    fn parses_aliases_and_numbers() {
        assert_eq!("6".parse::<Operator>().unwrap(), Operator::FreiChen);
        assert_eq!("Marr_Hildreth".parse::<Operator>().unwrap(), Operator::MarrHildreth);
        assert_eq!("frie-chen".parse::<Operator>().unwrap(), Operator::FreiChen);
        assert!(matches!(
            "7".parse::<Operator>(),
            Err(EdgeError::UnknownOperator(_))
        ));
        assert!("scharr".parse::<Operator>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Operator::MarrHildreth).unwrap();
        assert_eq!(json, "\"marr-hildreth\"");
        let op: Operator = serde_json::from_str("\"frei-chen\"").unwrap();
        assert_eq!(op, Operator::FreiChen);
    }

    #[test]
    fn mismatched_kernel_set_is_rejected() {
        let set = KernelSet {
            kernels: vec![kernel::sobel_x(), kernel::roberts_main()],
            combination: Combination::Pair,
        };
        assert!(matches!(
            GradientEdgeFilter::with_kernels(Operator::Sobel, set),
            Err(EdgeError::InvalidKernel(_))
        ));

        let set = KernelSet {
            kernels: vec![kernel::sobel_x()],
            combination: Combination::Pair,
        };
        assert!(set.validate().is_err());
    }

    #[test]
    fn flat_field_yields_no_gradient() {
        let flat = GrayImage::from_pixel(3, 3, Luma([128]));
        for op in [
            Operator::Roberts,
            Operator::Prewitt,
            Operator::Sobel,
            Operator::FreiChen,
            Operator::MarrHildreth,
        ] {
            let edges = GradientEdgeFilter::new(op).gradient(&flat).unwrap();
            assert!(edges.pixels().all(|p| p[0] == 0), "{op}");
        }
    }

    #[test]
    fn canny_has_no_gradient_stage() {
        let img = GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 0 } else { 255 }]));
        let filter = GradientEdgeFilter::new(Operator::Canny);
        assert!(filter.gradient_depends_on_cutoff());
        assert!(matches!(
            filter.gradient(&img),
            Err(EdgeError::NoGradientStage(_))
        ));
        assert_eq!(filter.apply(&img, Some(50)).unwrap().get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn optional_threshold_only_when_needed() {
        let f = GradientEdgeFilter::new(Operator::Sobel);
        assert_eq!(f.effective_cutoff(None), None);
        assert_eq!(f.effective_cutoff(Some(9)), Some(9));

        let f = GradientEdgeFilter::new(Operator::MarrHildreth);
        assert_eq!(f.effective_cutoff(None), Some(DEFAULT_THRESHOLD));
    }

    #[test]
    fn empty_image_fails_for_every_operator() {
        let empty = GrayImage::new(0, 0);
        for op in Operator::ALL {
            assert!(matches!(
                detect_edges(&empty, op, None),
                Err(EdgeError::EmptyImage)
            ));
        }
    }
}
