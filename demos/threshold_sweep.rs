use std::time::Instant;

use env_logger::Builder;
use gradient_edge::{
    count_on, EdgeSession, FileSink, GradientEdgeFilter, Operator, RecordingSink, Trackbar,
};
use image::{GrayImage, Luma};
use log::info;

fn main() {
    Builder::from_default_env().format_timestamp_nanos().init();

    // Bright disk on a dark background with a soft ramp
    let (width, height) = (256u32, 192u32);
    let img = GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - width as f32 / 2.0;
        let dy = y as f32 - height as f32 / 2.0;
        let ramp = (x as f32 / width as f32 * 40.0) as u8;
        if dx * dx + dy * dy < 60.0 * 60.0 {
            Luma([200])
        } else {
            Luma([20 + ramp])
        }
    });

    info!("image: {}x{}", img.width(), img.height());

    let mut files = FileSink::new("edges_output").unwrap();

    for op in Operator::ALL {
        let filter = GradientEdgeFilter::new(op);
        let mut session = EdgeSession::new(img.clone(), filter, Trackbar::new(0, u8::MAX))
            .unwrap()
            .with_binarize(true);
        let mut frames = RecordingSink::default();

        let instance = Instant::now();
        for position in [10, 40, 80, 160] {
            session.control_mut().set(position);
            session.render_to(&mut frames).unwrap();
        }
        let elapsed = instance.elapsed();

        for (label, frame) in &frames.frames {
            info!("  {label}: {} edge pixels", count_on(frame));
        }
        info!(
            "{}: 4 renders, {} gradient run(s), {elapsed:?}",
            op.title(),
            session.gradient_runs()
        );

        session.render_to(&mut files).unwrap();
    }
}
