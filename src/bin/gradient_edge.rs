//! Run one of the six edge operators over an image and write the results.
//!
//! Without `--operator` (and no config), the operator menu is printed and a
//! number is read from stdin.
//!
//! Usage:
//!   cargo run --features cli --bin gradient-edge -- --input img/wdg2.bmp --operator sobel
//!   cargo run --features cli --bin gradient-edge -- --input img/wdg2.bmp --operator 2 -t 20 -t 40
//!   cargo run --features cli --bin gradient-edge -- --config run.json

use clap::Parser;
use env_logger::Builder;
use gradient_edge::{
    count_on, load_config, BorderMode, DetectorConfig, EdgeError, EdgeSession, EdgeSink,
    FileImageSource, FileSink, GradientEdgeFilter, ImageInfo, Operator, ThresholdControl, Trackbar,
    DEFAULT_THRESHOLD,
};
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "gradient-edge")]
#[command(about = "Classic edge detectors over explicit kernel convolution")]
struct Args {
    /// JSON run configuration; explicit flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input image (any format the image crate decodes)
    #[arg(long, required_unless_present = "config")]
    input: Option<PathBuf>,

    /// Operator name (sobel, prewitt, roberts, frei-chen, marr-hildreth, canny) or menu number 1-6
    #[arg(long)]
    operator: Option<Operator>,

    /// Cutoff; repeat to sweep like successive slider positions
    #[arg(short = 't', long = "threshold")]
    thresholds: Vec<u8>,

    /// Border policy: replicate, zero or reflect
    #[arg(long)]
    border: Option<BorderMode>,

    /// Directory for the written PNGs
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() {
    Builder::from_default_env().format_timestamp_nanos().init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), EdgeError> {
    let config = resolve_config(args)?;
    info!(
        "{} on {} (border {:?})",
        config.operator.title(),
        config.input.display(),
        config.border
    );

    let (image, decoded) = FileImageSource.decode_with_info(&config.input)?;
    debug!("decoded layout: {decoded}");
    info!("original image: {}", ImageInfo::gray(&image));

    let mut sink = FileSink::new(&config.output_dir)?;
    sink.show("original", &image)?;

    let filter = GradientEdgeFilter::new(config.operator).with_border(config.border);
    let binarize = !config.thresholds.is_empty();
    let first = config.thresholds.first().copied().unwrap_or(DEFAULT_THRESHOLD);
    let mut session = EdgeSession::new(image, filter, Trackbar::new(first, u8::MAX))?
        .with_binarize(binarize);

    let positions = if config.thresholds.is_empty() {
        vec![session.control().current()]
    } else {
        config.thresholds.clone()
    };
    for position in positions {
        session.control_mut().set(position);
        let started = Instant::now();
        let edges = session.render_to(&mut sink)?;
        match session.cutoff() {
            Some(cutoff) => info!(
                "cutoff {cutoff}: {} edge pixels in {:?}",
                count_on(&edges),
                started.elapsed()
            ),
            None => info!("gradient map in {:?}", started.elapsed()),
        }
    }
    info!(
        "gradient computed {} time(s), output in {}",
        session.gradient_runs(),
        config.output_dir.display()
    );
    Ok(())
}

fn resolve_config(args: Args) -> Result<DetectorConfig, EdgeError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let input = args.input.clone().ok_or_else(|| {
                EdgeError::Usage("either --config or --input is required".to_string())
            })?;
            let operator = match args.operator {
                Some(op) => op,
                None => prompt_operator()?,
            };
            DetectorConfig::new(input, operator)
        }
    };
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(operator) = args.operator {
        config.operator = operator;
    }
    if let Some(border) = args.border {
        config.border = border;
    }
    if !args.thresholds.is_empty() {
        config.thresholds = args.thresholds;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    Ok(config)
}

fn prompt_operator() -> Result<Operator, EdgeError> {
    let mut stdout = io::stdout();
    writeln!(stdout, "Edge detector algorithms:")?;
    for op in Operator::ALL {
        writeln!(stdout, "\t{} - {}", op.menu_number(), op.title())?;
    }
    write!(stdout, "\nChoose number of the algorithm: ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    line.parse()
}
