//! Interactive state around the pure filter.
//!
//! An [`EdgeSession`] owns what a slider-driven front end would otherwise keep
//! in globals: the current source, the operator and the threshold control.
//! Every [`render`](EdgeSession::render) reads the control afresh. The
//! gradient is memoized and only recomputed when the source or operator
//! changes.

use crate::convolve::BorderMode;
use crate::error::{EdgeError, Result};
use crate::io::EdgeSink;
use crate::operator::{GradientEdgeFilter, Operator};
use crate::threshold::ThresholdControl;
use image::GrayImage;

pub struct EdgeSession<C> {
    source: GrayImage,
    filter: GradientEdgeFilter,
    control: C,
    requested_binarize: bool,
    binarize: bool,
    gradient: Option<GrayImage>,
    gradient_runs: usize,
}

impl<C: ThresholdControl> EdgeSession<C> {
    /// # Errors
    ///
    /// [`EdgeError::EmptyImage`] if `source` has zero area.
    pub fn new(source: GrayImage, filter: GradientEdgeFilter, control: C) -> Result<Self> {
        check_area(&source)?;
        let binarize = filter.operator().needs_threshold();
        Ok(Self {
            source,
            filter,
            control,
            requested_binarize: false,
            binarize,
            gradient: None,
            gradient_runs: 0,
        })
    }

    /// Forces the slider cutoff onto operators that do not need one.
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.requested_binarize = binarize;
        self.binarize = binarize || self.filter.operator().needs_threshold();
        self
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }

    pub fn operator(&self) -> Operator {
        self.filter.operator()
    }

    pub fn source(&self) -> &GrayImage {
        &self.source
    }

    /// How many times the expensive gradient stage has run.
    pub fn gradient_runs(&self) -> usize {
        self.gradient_runs
    }

    pub fn set_source(&mut self, source: GrayImage) -> Result<()> {
        check_area(&source)?;
        self.source = source;
        self.gradient = None;
        Ok(())
    }

    /// Switches operator, keeping the border mode.
    pub fn set_operator(&mut self, operator: Operator) {
        if operator == self.filter.operator() {
            return;
        }
        let border: BorderMode = self.filter.border();
        self.filter = GradientEdgeFilter::new(operator).with_border(border);
        self.binarize = self.requested_binarize || operator.needs_threshold();
        self.gradient = None;
    }

    /// Cutoff the next render will use.
    pub fn cutoff(&self) -> Option<u8> {
        self.binarize.then(|| self.control.current())
    }

    /// Recomputes the output for the current control value.
    pub fn render(&mut self) -> Result<GrayImage> {
        let cutoff = self.cutoff();
        if self.filter.gradient_depends_on_cutoff() {
            self.gradient_runs += 1;
            return self.filter.apply(&self.source, cutoff);
        }
        let gradient = match &self.gradient {
            Some(g) => g.clone(),
            None => {
                let g = self.filter.gradient(&self.source)?;
                self.gradient_runs += 1;
                self.gradient = Some(g.clone());
                g
            }
        };
        debug!("{}: render with cutoff {:?}", self.filter.operator(), cutoff);
        Ok(self.filter.finish(gradient, cutoff))
    }

    /// Renders and hands the result to `sink` labelled with the operator title
    /// and cutoff.
    pub fn render_to(&mut self, sink: &mut dyn EdgeSink) -> Result<GrayImage> {
        let image = self.render()?;
        let label = match self.cutoff() {
            Some(c) => format!("{} t={c}", self.filter.operator().title()),
            None => self.filter.operator().title().to_string(),
        };
        sink.show(&label, &image)?;
        Ok(image)
    }
}

fn check_area(image: &GrayImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EdgeError::EmptyImage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::RecordingSink;
    use crate::threshold::Trackbar;
    use image::Luma;

    fn step() -> GrayImage {
        GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 0 } else { 255 }]))
    }

    #[test]
    fn threshold_change_reuses_gradient() {
        let filter = GradientEdgeFilter::new(Operator::Sobel);
        let mut session = EdgeSession::new(step(), filter, Trackbar::new(100, 255))
            .unwrap()
            .with_binarize(true);

        let a = session.render().unwrap();
        assert_eq!(a.get_pixel(0, 0)[0], 255);

        session.control_mut().set(200);
        let b = session.render().unwrap();
        assert_eq!(b.get_pixel(0, 0)[0], 0);
        assert_eq!(b.get_pixel(1, 0)[0], 255);
        assert_eq!(session.gradient_runs(), 1);
    }

    #[test]
    fn operator_change_invalidates_cache() {
        let filter = GradientEdgeFilter::new(Operator::Sobel);
        let mut session = EdgeSession::new(step(), filter, 0u8).unwrap();
        let sobel = session.render().unwrap();
        session.set_operator(Operator::Roberts);
        let roberts = session.render().unwrap();
        assert_ne!(sobel, roberts);
        assert_eq!(session.gradient_runs(), 2);
        assert_eq!(session.cutoff(), None);

        session.set_operator(Operator::MarrHildreth);
        assert_eq!(session.cutoff(), Some(0));

        session.set_operator(Operator::Sobel);
        assert_eq!(session.cutoff(), None);
        assert_eq!(session.render().unwrap().get_pixel(0, 0)[0], 128);
    }

    #[test]
    fn forced_binarize_survives_operator_changes() {
        let filter = GradientEdgeFilter::new(Operator::Sobel);
        let mut session = EdgeSession::new(step(), filter, 200u8)
            .unwrap()
            .with_binarize(true);
        session.set_operator(Operator::Canny);
        session.set_operator(Operator::Prewitt);
        assert_eq!(session.cutoff(), Some(200));
        let edges = session.render().unwrap();
        assert_eq!(edges.get_pixel(0, 0)[0], 0);
        assert_eq!(edges.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn canny_reruns_every_time() {
        let filter = GradientEdgeFilter::new(Operator::Canny);
        let mut session = EdgeSession::new(step(), filter, Trackbar::new(20, 100)).unwrap();
        session.render().unwrap();
        session.render().unwrap();
        assert_eq!(session.gradient_runs(), 2);
    }

    #[test]
    fn render_to_labels_with_cutoff() {
        let filter = GradientEdgeFilter::new(Operator::MarrHildreth);
        let mut session = EdgeSession::new(step(), filter, Trackbar::new(40, 255)).unwrap();
        let mut sink = RecordingSink::default();
        session.render_to(&mut sink).unwrap();
        assert_eq!(sink.labels(), vec!["Marr-Hildreth Edge Detector t=40"]);
    }

    #[test]
    fn empty_sources_are_rejected() {
        let filter = GradientEdgeFilter::new(Operator::Sobel);
        assert!(matches!(
            EdgeSession::new(GrayImage::new(0, 3), filter.clone(), 0u8),
            Err(EdgeError::EmptyImage)
        ));
        let mut session = EdgeSession::new(step(), filter, 0u8).unwrap();
        assert!(session.set_source(GrayImage::new(3, 0)).is_err());
        assert_eq!(session.source().dimensions(), (4, 4));
    }
}
