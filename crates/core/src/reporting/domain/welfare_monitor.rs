use std::fmt;

use crate::reporting::domain::frame_result::FrameResult;

/// A change in one of the welfare flags between consecutive frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WelfareEvent {
    BecameTired,
    Rested,
    BecameHungry,
    Fed,
}

impl fmt::Display for WelfareEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WelfareEvent::BecameTired => "fish looks tired",
            WelfareEvent::Rested => "fish no longer looks tired",
            WelfareEvent::BecameHungry => "fish looks hungry",
            WelfareEvent::Fed => "fish no longer looks hungry",
        };
        f.write_str(text)
    }
}

/// Receives welfare flag transitions.
pub trait WelfareObserver: Send {
    fn on_event(&mut self, event: WelfareEvent, frame_index: usize, result: &FrameResult);
}

/// Writes each transition to the log at `warn` for onsets and `info` for
/// recoveries.
pub struct LoggingWelfareObserver;

impl WelfareObserver for LoggingWelfareObserver {
    fn on_event(&mut self, event: WelfareEvent, frame_index: usize, _result: &FrameResult) {
        match event {
            WelfareEvent::BecameTired | WelfareEvent::BecameHungry => {
                log::warn!("Frame {frame_index}: {event}")
            }
            WelfareEvent::Rested | WelfareEvent::Fed => {
                log::info!("Frame {frame_index}: {event}")
            }
        }
    }
}

/// Edge detector over the per-frame flags.
///
/// The reporter itself has no memory; this is the only place that compares
/// a frame with the one before it. Before the first frame both flags are
/// considered false.
#[derive(Default)]
pub struct WelfareMonitor {
    observers: Vec<Box<dyn WelfareObserver>>,
    was_tired: bool,
    was_hungry: bool,
}

impl WelfareMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Box<dyn WelfareObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Compares `result` with the previous frame and notifies observers of
    /// every flag that changed. Returns the emitted events.
    pub fn observe(&mut self, frame_index: usize, result: &FrameResult) -> Vec<WelfareEvent> {
        let mut events = Vec::new();
        match (self.was_tired, result.is_tired) {
            (false, true) => events.push(WelfareEvent::BecameTired),
            (true, false) => events.push(WelfareEvent::Rested),
            _ => {}
        }
        match (self.was_hungry, result.is_hungry) {
            (false, true) => events.push(WelfareEvent::BecameHungry),
            (true, false) => events.push(WelfareEvent::Fed),
            _ => {}
        }
        self.was_tired = result.is_tired;
        self.was_hungry = result.is_hungry;

        for event in &events {
            for observer in &mut self.observers {
                observer.on_event(*event, frame_index, result);
            }
        }
        events
    }

    pub fn reset(&mut self) {
        self.was_tired = false;
        self.was_hungry = false;
    }
}
