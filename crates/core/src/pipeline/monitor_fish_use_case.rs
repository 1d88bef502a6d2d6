use std::path::PathBuf;
use std::time::Instant;

use crate::detection::domain::part_detector::PartDetector;
use crate::detection::infrastructure::replay_detector::DetectionRecording;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::reporting::domain::frame_result::FrameResult;
use crate::reporting::domain::position_reporter::PositionReporter;
use crate::reporting::domain::welfare_monitor::WelfareMonitor;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::visualization::domain::frame_annotator::FrameAnnotator;

pub type ProgressCallback = Box<dyn Fn(usize, usize) -> bool + Send>;
pub type ReportCallback = Box<dyn FnMut(usize, &FrameResult) + Send>;

/// Where and how annotated frames are saved.
#[derive(Clone, Debug)]
pub struct AnnotatedOutput {
    pub dir: PathBuf,
    /// Frames are scaled to this size before writing; `None` keeps the source size.
    pub size: Option<(u32, u32)>,
}

impl AnnotatedOutput {
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index}.jpg"))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub frames: usize,
    pub tired_frames: usize,
    pub hungry_frames: usize,
    pub welfare_events: usize,
}

/// Frame loop: read → detect → report → welfare → annotate → write.
///
/// Runs on the calling thread and pulls one frame at a time. Returning
/// `false` from the progress callback stops the loop with a "Cancelled"
/// error.
pub struct MonitorFishUseCase {
    reader: Box<dyn VideoReader>,
    detector: Box<dyn PartDetector>,
    reporter: PositionReporter,
    monitor: WelfareMonitor,
    annotator: Box<dyn FrameAnnotator>,
    image_writer: Box<dyn ImageWriter>,
    logger: Box<dyn PipelineLogger>,
    on_progress: Option<ProgressCallback>,
    on_report: Option<ReportCallback>,
    recording: Option<DetectionRecording>,
}

impl MonitorFishUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn VideoReader>,
        detector: Box<dyn PartDetector>,
        reporter: PositionReporter,
        monitor: WelfareMonitor,
        annotator: Box<dyn FrameAnnotator>,
        image_writer: Box<dyn ImageWriter>,
        logger: Box<dyn PipelineLogger>,
        on_progress: Option<ProgressCallback>,
        on_report: Option<ReportCallback>,
    ) -> Self {
        Self {
            reader,
            detector,
            reporter,
            monitor,
            annotator,
            image_writer,
            logger,
            on_progress,
            on_report,
            recording: None,
        }
    }

    /// Keeps every frame's detections so the run can be replayed later.
    pub fn with_recording(mut self) -> Self {
        self.recording = Some(DetectionRecording::default());
        self
    }

    /// Detections recorded so far; `None` unless recording was enabled.
    pub fn take_recording(&mut self) -> Option<DetectionRecording> {
        self.recording.take()
    }

    /// Processes every frame of the already-opened reader.
    ///
    /// Annotation only runs when `output` is given, since nothing else
    /// consumes the annotated frame.
    pub fn execute(
        &mut self,
        metadata: &VideoMetadata,
        output: Option<&AnnotatedOutput>,
    ) -> Result<MonitorSummary, Box<dyn std::error::Error>> {
        let Self {
            reader,
            detector,
            reporter,
            monitor,
            annotator,
            image_writer,
            logger,
            on_progress,
            on_report,
            recording,
        } = self;

        let total = metadata.total_frames;
        let mut summary = MonitorSummary::default();
        monitor.reset();

        for frame in reader.frames() {
            let frame = frame?;
            let index = frame.index();

            let t = Instant::now();
            let detections = detector.detect(&frame)?;
            logger.timing("detect", elapsed_ms(t));
            logger.metric("detections", detections.len() as f64);
            log::debug!("Frame {index}: {} detections", detections.len());
            if let Some(recording) = recording.as_mut() {
                recording.record(index, &detections);
            }

            let t = Instant::now();
            let result = reporter.compute(&detections);
            logger.timing("report", elapsed_ms(t));

            if !result.report_text.is_empty() {
                log::debug!("Frame {index}:\n{}", result.report_text.trim_end());
            }
            if let Some(callback) = on_report.as_mut() {
                callback(index, &result);
            }

            summary.welfare_events += monitor.observe(index, &result).len();
            summary.tired_frames += usize::from(result.is_tired);
            summary.hungry_frames += usize::from(result.is_hungry);

            if let Some(out) = output {
                let t = Instant::now();
                let annotated = annotator.annotate(&frame, &detections)?;
                logger.timing("annotate", elapsed_ms(t));

                let t = Instant::now();
                image_writer.write(&out.frame_path(index), &annotated, out.size)?;
                logger.timing("write", elapsed_ms(t));
            }

            summary.frames += 1;
            logger.progress(summary.frames, total);
            if let Some(callback) = on_progress.as_ref() {
                if !callback(summary.frames, total) {
                    return Err("Cancelled".into());
                }
            }
        }

        reader.close();
        logger.info(&format!(
            "Processed {} frames ({} tired, {} hungry)",
            summary.frames, summary.tired_frames, summary.hungry_frames
        ));
        logger.summary();
        Ok(summary)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
