use capture_gate::{
    classify_environment,
    cli::annotate_frame,
    common::{DevMode, GateConfig},
    core::{
        face::{DetectedFace, EulerAngles, FaceBox},
        grayscale::prepare_frame,
        sharpness::SharpnessEstimator,
    },
    stream::ShutterGate,
    QualityAnalyzer,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Exit status for a frame the gate rejected.
const EXIT_REJECTED: i32 = 2;

#[derive(Parser)]
#[command(name = "capture-gate")]
#[command(about = "Per-frame capture quality gate for face photos")]
struct Cli {
    /// Enable development mode (debug logging, saves annotated frames and reports locally)
    #[arg(long, global = true)]
    dev: bool,

    /// Gate configuration file (defaults to the system config, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full quality gate on an image
    Analyze {
        image: PathBuf,
        /// Face bounding box in pixels: left,top,right,bottom
        #[arg(long, value_parser = parse_face_box)]
        face: FaceBox,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pitch: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        yaw: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        roll: f64,
        /// Ambient illuminance at capture time
        #[arg(long)]
        lux: f64,
        /// Print the capture record as JSON
        #[arg(long)]
        json: bool,
        /// Write a copy of the image with the face box drawn on it
        #[arg(long)]
        annotate: Option<PathBuf>,
    },
    /// Print the lighting environment label for a lux value
    Environment {
        #[arg(long)]
        lux: f64,
    },
    /// Print the Laplacian sharpness of an image
    Sharpness {
        image: PathBuf,
    },
}

fn parse_face_box(s: &str) -> std::result::Result<FaceBox, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("invalid coordinate '{}': {}", v, e)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [left, top, right, bottom] => {
            let bbox = FaceBox::new(*left, *top, *right, *bottom);
            bbox.validate().map_err(|e| e.to_string())?;
            Ok(bbox)
        }
        _ => Err(format!("expected left,top,right,bottom, got {} values", values.len())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.dev);

    let dev_mode = DevMode::new(cli.dev)?;
    let config = match &cli.config {
        Some(path) => GateConfig::load_from_path(path)?,
        None => GateConfig::load()?,
    };

    match cli.command {
        Commands::Analyze { image, face, pitch, yaw, roll, lux, json, annotate } => {
            let passed = analyze(
                config,
                &dev_mode,
                &image,
                DetectedFace::new(face, EulerAngles::new(pitch, yaw, roll)),
                lux,
                json,
                annotate,
            )?;
            if !passed {
                std::process::exit(EXIT_REJECTED);
            }
        }
        Commands::Environment { lux } => {
            println!("{}", classify_environment(lux));
        }
        Commands::Sharpness { image } => {
            let frame = load_image(&image)?;
            let field = prepare_frame(&frame, &config.analysis);
            let result = SharpnessEstimator::new(config.sharpness.clone()).estimate(&field);
            println!("variance: {:.2}", result.variance);
            println!("score:    {:.3}", result.score);
            println!("sharp:    {}", result.is_sharp);
        }
    }

    Ok(())
}

fn analyze(
    config: GateConfig,
    dev_mode: &DevMode,
    image: &Path,
    face: DetectedFace,
    lux: f64,
    json: bool,
    annotate: Option<PathBuf>,
) -> Result<bool> {
    let frame = load_image(image)?;
    let gate = ShutterGate::new(QualityAnalyzer::new(config)?);
    let record = gate.capture(&frame, Some(&face), lux)?;

    if json {
        println!("{}", record.to_json()?);
    } else {
        print!("{}", record.report);
    }

    let annotate_path = annotate.or_else(|| dev_mode.get_debug_path("analyze"));
    if let Some(path) = annotate_path {
        annotate_frame(&frame, &face.bbox, &record.report, &gate.analyzer().config().scoring)
            .save(&path)
            .with_context(|| format!("Failed to write annotated image {}", path.display()))?;
        tracing::info!("Saved annotated frame to {}", path.display());
    }

    if let Some(path) = dev_mode.get_report_path("analyze") {
        record.save_json(&path)?;
        tracing::info!("Saved capture record to {}", path.display());
    }

    Ok(record.accepted)
}

fn load_image(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).with_context(|| format!("Failed to open image {}", path.display()))
}

fn setup_logging(dev_mode: bool) {
    if dev_mode {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .init();
    }
}
