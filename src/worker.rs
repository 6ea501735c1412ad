//! Capture worker: drains the click queue one click at a time.
//!
//! For every click: read the current mode, resolve the region, capture it
//! (or skip an empty region) and write exactly one event-log line. A failing
//! click is logged and forgotten; it never stops the worker.

use crate::capture::{self, CaptureError, CaptureMode, ClickEvent, Desktop, GeometryError, ImageCapturer, ModeState};
use crate::event_log::EventLog;
use crate::queue::ClickReceiver;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Default wait between queue polls while idle.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum ClickError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// What happened to one dequeued click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Captured { path: PathBuf, target: String },
    Skipped { target: String },
    Failed { error: String },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: u64,
    pub captured: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl WorkerStats {
    pub fn record(&mut self, outcome: &ClickOutcome) {
        self.processed += 1;
        match outcome {
            ClickOutcome::Captured { .. } => self.captured += 1,
            ClickOutcome::Skipped { .. } => self.skipped += 1,
            ClickOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Resolve → capture → log for a single click. Blocking.
pub struct CapturePipeline {
    desktop: Arc<dyn Desktop>,
    capturer: Arc<ImageCapturer>,
    log: Arc<EventLog>,
}

impl CapturePipeline {
    pub fn new(desktop: Arc<dyn Desktop>, capturer: Arc<ImageCapturer>, log: Arc<EventLog>) -> Self {
        Self {
            desktop,
            capturer,
            log,
        }
    }

    /// Handles one click under `mode`, writing exactly one log line.
    pub fn process(&self, click: ClickEvent, mode: CaptureMode) -> ClickOutcome {
        let region = match capture::resolve(self.desktop.as_ref(), click, mode) {
            Ok(region) => region,
            Err(e) => return self.fail(click, ClickError::from(e)),
        };

        if region.is_empty() {
            log::debug!("[WORKER] Nothing to capture at {} ({})", click, region.target);
            self.log.log(&format!(
                "Clicked: {}. Process: {}. Target: {}. Skipped: empty capture region",
                click, region.process, region.target
            ));
            return ClickOutcome::Skipped {
                target: region.target,
            };
        }

        match self.capturer.capture(region.rect) {
            Ok(path) => {
                self.log.log(&format!(
                    "Clicked: {}. Process: {}. Target: {}. Screenshot: {}",
                    click,
                    region.process,
                    region.target,
                    path.display()
                ));
                ClickOutcome::Captured {
                    path,
                    target: region.target,
                }
            }
            Err(e) => self.fail(click, ClickError::from(e)),
        }
    }

    fn fail(&self, click: ClickEvent, error: ClickError) -> ClickOutcome {
        self.record_failure(click, &error.to_string())
    }

    fn record_failure(&self, click: ClickEvent, error: &str) -> ClickOutcome {
        log::warn!("[WORKER] Capture failed for click at {}: {}", click, error);
        self.log
            .log(&format!("[ERROR] Capture failed for click at {}: {}", click, error));
        ClickOutcome::Failed {
            error: error.to_string(),
        }
    }
}

/// Single consumer of the click queue.
pub struct CaptureWorker {
    queue: ClickReceiver,
    mode: ModeState,
    pipeline: Arc<CapturePipeline>,
    poll_interval: Duration,
}

impl CaptureWorker {
    pub fn new(queue: ClickReceiver, mode: ModeState, pipeline: CapturePipeline) -> Self {
        Self {
            queue,
            mode,
            pipeline: Arc::new(pipeline),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Idle wait between polls; zero is raised to 1 ms.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Processes the next queued click, if any, to completion.
    ///
    /// The mode is read at dequeue; switching it later does not affect
    /// this click.
    pub async fn step(&mut self) -> Option<ClickOutcome> {
        let click = self.queue.try_dequeue()?;
        let mode = self.mode.get();

        let pipeline = Arc::clone(&self.pipeline);
        let outcome = match tokio::task::spawn_blocking(move || pipeline.process(click, mode)).await {
            Ok(outcome) => outcome,
            Err(e) => self
                .pipeline
                .record_failure(click, &format!("capture task aborted: {}", e)),
        };
        Some(outcome)
    }

    /// Runs until `shutdown` turns true (or its sender is dropped).
    ///
    /// Cancellation is only observed between clicks; a click already
    /// dequeued is always finished.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> WorkerStats {
        let mut stats = WorkerStats::default();
        log::info!("[WORKER] Started, polling every {:?}", self.poll_interval);

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Some(outcome) = self.step().await {
                stats.record(&outcome);
                continue;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        log::info!(
            "[WORKER] Stopped after {} clicks ({} captured, {} skipped, {} failed)",
            stats.processed,
            stats.captured,
            stats.skipped,
            stats.failed
        );
        stats
    }
}
