//! The running click-capture service.
//!
//! Owns every piece of shared state (mode, queue endpoints, event log,
//! worker task, hook) and exposes the three things the tray menu can do:
//! read the mode, switch it, and shut everything down.

use crate::capture::{CaptureMode, Desktop, ImageCapturer, ModeState, ScreenSource};
use crate::event_log::EventLog;
use crate::hook::{ClickSource, HookError};
use crate::queue;
use crate::settings::Settings;
use crate::worker::{CapturePipeline, CaptureWorker, WorkerStats};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to create output directory: {0}")]
    OutputDir(#[from] std::io::Error),

    #[error(transparent)]
    Hook(#[from] HookError),
}

/// OS capability providers the service is wired to.
pub struct Backends {
    pub desktop: Arc<dyn Desktop>,
    pub screen: Arc<dyn ScreenSource>,
    pub hook: Box<dyn ClickSource>,
}

pub struct ClickSpy {
    mode: ModeState,
    log: Arc<EventLog>,
    hook: Arc<dyn ClickSource>,
    shutdown: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<WorkerStats>>>,
}

impl ClickSpy {
    /// Creates the output directory, spawns the worker and installs the hook.
    ///
    /// Must be called from within a tokio runtime. A hook that cannot be
    /// installed is fatal: the worker is stopped again and the error returned.
    pub fn start(settings: &Settings, backends: Backends) -> Result<Self, StartupError> {
        let log = Arc::new(EventLog::new(&settings.log_file));

        let capturer = Arc::new(ImageCapturer::new(backends.screen, &settings.output_dir));
        capturer.ensure_output_dir()?;
        log.log("App started.");

        let mode = ModeState::new(settings.initial_mode);
        let (sender, receiver) = queue::channel();
        let (shutdown, shutdown_rx) = watch::channel(false);

        let pipeline = CapturePipeline::new(backends.desktop, capturer, Arc::clone(&log));
        let worker = CaptureWorker::new(receiver, mode.clone(), pipeline)
            .with_poll_interval(settings.poll_interval);
        let handle = tokio::spawn(worker.run(shutdown_rx));

        let hook: Arc<dyn ClickSource> = Arc::from(backends.hook);
        if let Err(e) = hook.start(sender) {
            log::error!("[HOOK] {}", e);
            log.log(&format!("[ERROR] {}", e));
            let _ = shutdown.send(true);
            return Err(e.into());
        }

        log::info!(
            "[SERVICE] Capturing {} clicks into {}",
            mode.get().label(),
            settings.output_dir.display()
        );

        Ok(Self {
            mode,
            log,
            hook,
            shutdown,
            worker: Mutex::new(Some(handle)),
        })
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode.get()
    }

    /// Applies to clicks dequeued from now on.
    pub fn switch_mode(&self, mode: CaptureMode) {
        self.mode.set(mode);
        log::info!("[SERVICE] Capture mode: {}", mode.label());
        self.log.log(&format!("Switched: {}.", mode.label()));
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Stops the hook, lets the worker finish its current click, logs the stop.
    ///
    /// Returns the worker's totals the first time; later calls return `None`.
    /// Stopping the hook may wait on its thread, so it runs off the async
    /// executor.
    pub async fn shutdown(&self) -> Option<WorkerStats> {
        let hook = Arc::clone(&self.hook);
        if let Err(e) = tokio::task::spawn_blocking(move || hook.stop()).await {
            log::error!("[SERVICE] Stopping the mouse hook failed: {}", e);
        }
        let _ = self.shutdown.send(true);

        let handle = self.worker.lock().ok()?.take()?;
        let stats = match handle.await {
            Ok(stats) => Some(stats),
            Err(e) => {
                log::error!("[SERVICE] Capture worker ended abnormally: {}", e);
                None
            }
        };

        self.log.log("App stopped.");
        stats
    }
}
