use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use fishwatch_core::dataset::coco_dataset::CocoDataset;
use fishwatch_core::detection::domain::part_detector::{DetectorError, PartDetector};
use fishwatch_core::detection::infrastructure::onnx_part_detector::{OnnxPartDetector, OutputLayout};
use fishwatch_core::detection::infrastructure::replay_detector::ReplayDetector;
use fishwatch_core::pipeline::monitor_fish_use_case::{
    AnnotatedOutput, MonitorFishUseCase, ProgressCallback, ReportCallback,
};
use fishwatch_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use fishwatch_core::pipeline::preview_dataset_use_case::PreviewDatasetUseCase;
use fishwatch_core::reporting::domain::frame_result::FrameResult;
use fishwatch_core::reporting::domain::position_reporter::{PositionReporter, StateThresholds};
use fishwatch_core::reporting::domain::welfare_monitor::{LoggingWelfareObserver, WelfareMonitor};
use fishwatch_core::shared::constants::{
    DATASET_NAME, DEFAULT_HUNGRY_MOUTH_AREA, DEFAULT_OUTPUT_DIR, DEFAULT_PREVIEW_SAMPLES,
    DEFAULT_SCORE_THRESHOLD, DISPLAY_HEIGHT, DISPLAY_WIDTH, IMAGE_EXTENSIONS,
};
use fishwatch_core::shared::model_resolver::{self, ModelResolveError};
use fishwatch_core::training::training_config::TrainingConfig;
use fishwatch_core::video::domain::video_reader::VideoReader;
use fishwatch_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use fishwatch_core::video::infrastructure::image_file_reader::ImageFileReader;
use fishwatch_core::video::infrastructure::image_file_writer::ImageFileWriter;
use fishwatch_core::visualization::infrastructure::box_annotator::BoxAnnotator;

/// Fish-part position reporting and welfare heuristics for aquarium videos.
#[derive(Parser)]
#[command(name = "fishwatch")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect fish parts frame by frame and print their positions.
    Watch(WatchArgs),
    /// Draw ground-truth boxes on a few random training images.
    PreviewDataset(PreviewArgs),
    /// Write the training configuration for the external trainer.
    TrainConfig(TrainConfigArgs),
}

#[derive(clap::Args)]
struct WatchArgs {
    /// Input video or image file.
    input: PathBuf,

    /// Exported ONNX model (default: <output-dir>/model_final.onnx, then the user cache).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Directory the trainer writes its model to.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Save annotated frames into this directory.
    #[arg(long)]
    annotated_dir: Option<PathBuf>,

    /// Detection score threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
    confidence: f32,

    /// Mouth box area (px²) above which a fish next to a finger counts as hungry.
    #[arg(long, default_value_t = DEFAULT_HUNGRY_MOUTH_AREA)]
    hungry_area: f64,

    /// Replay detections from a JSON recording instead of running the model.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Save every frame's detections to a JSON file usable with --replay.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Model output index holding the boxes.
    #[arg(long, default_value_t = 0)]
    boxes_output: usize,

    /// Model output index holding the class ids.
    #[arg(long, default_value_t = 1)]
    classes_output: usize,

    /// Model output index holding the scores.
    #[arg(long, default_value_t = 3)]
    scores_output: usize,

    /// Width annotated frames are scaled to.
    #[arg(long, default_value_t = DISPLAY_WIDTH)]
    display_width: u32,

    /// Height annotated frames are scaled to.
    #[arg(long, default_value_t = DISPLAY_HEIGHT)]
    display_height: u32,
}

#[derive(clap::Args)]
struct PreviewArgs {
    /// COCO instances file.
    annotations: PathBuf,

    /// Directory the annotated images live in.
    images_dir: PathBuf,

    /// Directory previews are written to.
    out_dir: PathBuf,

    /// Number of images to sample.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_SAMPLES)]
    samples: usize,

    /// Seed for a reproducible sample.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args)]
struct TrainConfigArgs {
    /// Where to write the JSON (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Trainer output directory recorded in the config.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Watch(args) => {
            validate_watch(&args)?;
            run_watch(&args)
        }
        Command::PreviewDataset(args) => {
            validate_preview(&args)?;
            run_preview(&args)
        }
        Command::TrainConfig(args) => run_train_config(&args),
    }
}

fn run_watch(args: &WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let detector = build_detector(args)?;

    let mut reader = open_reader(&args.input);
    let metadata = reader.open(&args.input)?;
    log::info!(
        "Watching {} ({}x{}, {} frames)",
        args.input.display(),
        metadata.width,
        metadata.height,
        metadata.total_frames
    );

    let total = metadata.total_frames;
    let progress: ProgressCallback = Box::new(move |current, _| {
        if total > 0 {
            eprint!("\rProcessing frame {current}/{total}");
        }
        true
    });
    let print_report: ReportCallback = Box::new(|_, result: &FrameResult| {
        if !result.report_text.is_empty() {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(result.report_text.as_bytes());
            let _ = out.flush();
        }
    });

    let reporter = PositionReporter::new(StateThresholds {
        hungry_mouth_area: args.hungry_area,
    });
    let monitor = WelfareMonitor::new().with_observer(Box::new(LoggingWelfareObserver));

    let use_case = MonitorFishUseCase::new(
        reader,
        detector,
        reporter,
        monitor,
        Box::new(BoxAnnotator::default()),
        Box::new(ImageFileWriter::new()),
        Box::new(StdoutPipelineLogger::default()),
        Some(progress),
        Some(print_report),
    );
    let mut use_case = if args.record.is_some() {
        use_case.with_recording()
    } else {
        use_case
    };

    let output = args.annotated_dir.as_ref().map(|dir| AnnotatedOutput {
        dir: dir.clone(),
        size: Some((args.display_width, args.display_height)),
    });
    let summary = use_case.execute(&metadata, output.as_ref())?;
    if total > 0 {
        eprintln!();
    }
    if let (Some(path), Some(recording)) = (&args.record, use_case.take_recording()) {
        recording.save(path)?;
        log::info!("Detections recorded to {}", path.display());
    }
    log::info!(
        "Done: {} frames, {} tired, {} hungry",
        summary.frames,
        summary.tired_frames,
        summary.hungry_frames
    );
    if let Some(out) = &output {
        log::info!("Annotated frames written to {}", out.dir.display());
    }
    Ok(())
}

fn run_preview(args: &PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = CocoDataset::load(DATASET_NAME, &args.annotations, &args.images_dir)?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut use_case = PreviewDatasetUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(BoxAnnotator::default()),
        Box::new(ImageFileWriter::new()),
        Box::new(rng),
    );
    for path in use_case.execute(&dataset, &args.out_dir, args.samples)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_train_config(args: &TrainConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = TrainingConfig::with_output_dir(&args.output_dir);
    match &args.output {
        Some(path) => config.write(path)?,
        None => {
            config.validate()?;
            println!("{}", config.to_json()?);
        }
    }
    Ok(())
}

fn build_detector(args: &WatchArgs) -> Result<Box<dyn PartDetector>, Box<dyn std::error::Error>> {
    if let Some(recording) = &args.replay {
        log::info!("Replaying detections from {}", recording.display());
        return Ok(Box::new(ReplayDetector::from_file(recording)?));
    }

    let model_path = model_resolver::resolve_weights(args.model.as_deref(), &args.output_dir)
        .map_err(|e| model_unavailable(args, e))?;
    log::info!("Loading model: {}", model_path.display());
    let detector = OnnxPartDetector::new(&model_path, args.confidence)?
        .with_layout(output_layout(args))?;
    Ok(Box::new(detector))
}

fn output_layout(args: &WatchArgs) -> OutputLayout {
    OutputLayout {
        boxes: args.boxes_output,
        classes: args.classes_output,
        scores: args.scores_output,
    }
}

fn model_unavailable(args: &WatchArgs, err: ModelResolveError) -> DetectorError {
    let path = match &err {
        ModelResolveError::Missing(path) => path.clone(),
        ModelResolveError::NotTrained { .. } => args.output_dir.clone(),
    };
    DetectorError::ModelUnavailable {
        path,
        reason: err.to_string(),
    }
}

fn validate_watch(args: &WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.input.exists() {
        return Err(format!("Input file not found: {}", args.input.display()).into());
    }
    if !(0.0..=1.0).contains(&args.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            args.confidence
        )
        .into());
    }
    if !args.hungry_area.is_finite() || args.hungry_area < 0.0 {
        return Err(format!(
            "Hungry area must be a non-negative number, got {}",
            args.hungry_area
        )
        .into());
    }
    if args.display_width == 0 || args.display_height == 0 {
        return Err("Display size must be non-zero".into());
    }
    output_layout(args).validate()?;
    if args.replay.is_some() && args.model.is_some() {
        return Err("--replay and --model are mutually exclusive".into());
    }
    if let Some(recording) = &args.replay {
        if !recording.is_file() {
            return Err(format!("Replay file not found: {}", recording.display()).into());
        }
    }
    Ok(())
}

fn validate_preview(args: &PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.annotations.is_file() {
        return Err(format!(
            "Annotations file not found: {}",
            args.annotations.display()
        )
        .into());
    }
    if !args.images_dir.is_dir() {
        return Err(format!(
            "Images directory not found: {}",
            args.images_dir.display()
        )
        .into());
    }
    if args.samples == 0 {
        return Err("--samples must be at least 1".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn open_reader(input: &Path) -> Box<dyn VideoReader> {
    if is_image(input) {
        Box::new(ImageFileReader::new())
    } else {
        Box::new(FfmpegReader::new())
    }
}
