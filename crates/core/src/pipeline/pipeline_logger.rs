use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for pipeline orchestration events: progress, per-stage timings,
/// per-frame metrics and status messages.
pub trait PipelineLogger: Send {
    /// `total` is 0 when the source does not know its length (live streams,
    /// containers without a frame count).
    fn progress(&mut self, current: usize, total: usize);

    fn timing(&mut self, stage: &str, duration_ms: f64);

    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running totals for one stage or metric.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stat {
    pub count: usize,
    pub sum: f64,
    pub max: f64,
}

impl Stat {
    fn push(&mut self, value: f64) {
        if self.count == 0 || value > self.max {
            self.max = value;
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Accumulates stage timings and metrics, reports progress through `log`
/// every `throttle_frames` frames, and renders a summary at the end.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Stat>,
    metrics: BTreeMap<String, Stat>,
    start_time: Instant,
    frames_seen: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
            messages: Vec::new(),
        }
    }

    pub fn timing_stat(&self, stage: &str) -> Option<Stat> {
        self.timings.get(stage).copied()
    }

    pub fn metric_stat(&self, name: &str) -> Option<Stat> {
        self.metrics.get(name).copied()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `None` until at least one timing or metric was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Monitoring summary ({} frames, {:.1}s):",
            self.frames_seen,
            elapsed_ms / 1000.0
        )];

        for (stage, stat) in &self.timings {
            lines.push(format!(
                "  {stage:10}: avg {:6.1}ms  max {:6.1}ms  total {:7.0}ms",
                stat.mean(),
                stat.max,
                stat.sum
            ));
        }
        for (name, stat) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1}  max {:.1}", stat.mean(), stat.max));
        }
        if self.frames_seen > 0 && elapsed_ms > 0.0 {
            let fps = self.frames_seen as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        let due = current % self.throttle_frames == 0;
        if total > 0 {
            if due || current == total {
                let pct = current as f64 / total as f64 * 100.0;
                log::info!("Monitoring: {current}/{total} frames ({pct:.1}%)");
            }
        } else if due {
            log::info!("Monitoring: {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings.entry(stage.to_string()).or_default().push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
        self.messages.push(message.to_string());
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
