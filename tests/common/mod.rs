//! Shared test helpers: scripted desktops and screens, scratch directories.

#![allow(dead_code)]

use click_spy_lib::capture::{
    CaptureError, Desktop, GeometryError, ImageCapturer, MonitorInfo, ScreenSource, WindowHandle,
};
use click_spy_lib::event_log::EventLog;
use click_spy_lib::worker::CapturePipeline;
use click_spy_lib::{ClickEvent, Rect};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A window whose clicked child differs from its root.
#[derive(Clone)]
pub struct FakeWindow {
    pub child: u32,
    pub root: u32,
    pub root_bounds: Rect,
    pub title: String,
    pub process: Option<String>,
}

/// Desktop with one optional window under every point and a fixed monitor list.
#[derive(Clone, Default)]
pub struct FakeDesktop {
    pub window: Option<FakeWindow>,
    pub monitors: Vec<MonitorInfo>,
}

impl FakeDesktop {
    pub fn single_monitor() -> Self {
        Self {
            window: None,
            monitors: vec![MonitorInfo {
                device: r"\\.\DISPLAY1".to_string(),
                bounds: Rect::new(0, 0, 1920, 1080),
            }],
        }
    }

    pub fn with_notepad(mut self) -> Self {
        self.window = Some(FakeWindow {
            child: 42,
            root: 7,
            root_bounds: Rect::new(50, 50, 800, 600),
            title: "Notepad".to_string(),
            process: Some("notepad".to_string()),
        });
        self
    }
}

impl Desktop for FakeDesktop {
    fn window_at(&self, _point: ClickEvent) -> Option<WindowHandle> {
        self.window.as_ref().map(|w| WindowHandle(w.child))
    }

    fn root_window(&self, window: WindowHandle) -> WindowHandle {
        match &self.window {
            Some(w) if w.child == window.0 => WindowHandle(w.root),
            _ => window,
        }
    }

    fn window_bounds(&self, window: WindowHandle) -> Result<Rect, GeometryError> {
        match &self.window {
            Some(w) if w.root == window.0 => Ok(w.root_bounds),
            _ => Err(GeometryError::WindowGone(window.0)),
        }
    }

    fn window_title(&self, window: WindowHandle) -> Option<String> {
        self.window
            .as_ref()
            .filter(|w| w.root == window.0)
            .map(|w| w.title.clone())
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, GeometryError> {
        Ok(self.monitors.clone())
    }

    fn process_name(&self, window: WindowHandle) -> Option<String> {
        self.window
            .as_ref()
            .filter(|w| w.child == window.0)
            .and_then(|w| w.process.clone())
    }
}

/// Screen that returns blank rect-sized images and remembers every request.
#[derive(Default)]
pub struct FakeScreen {
    pub grabs: Mutex<Vec<Rect>>,
    pub fail_grabs: Mutex<usize>,
}

impl FakeScreen {
    /// Makes the next `count` grabs fail.
    pub fn fail_next(&self, count: usize) {
        *self.fail_grabs.lock().unwrap() = count;
    }

    pub fn grabbed(&self) -> Vec<Rect> {
        self.grabs.lock().unwrap().clone()
    }
}

impl ScreenSource for FakeScreen {
    fn grab(&self, rect: Rect) -> Result<RgbaImage, CaptureError> {
        self.grabs.lock().unwrap().push(rect);
        let mut fail = self.fail_grabs.lock().unwrap();
        if *fail > 0 {
            *fail -= 1;
            return Err(CaptureError::Grab("simulated display failure".to_string()));
        }
        Ok(RgbaImage::new(rect.width as u32, rect.height as u32))
    }
}

/// Fresh empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("click-spy-test-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Everything a pipeline test needs, rooted in one scratch directory.
pub struct Rig {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub log_path: PathBuf,
    pub screen: Arc<FakeScreen>,
    pub log: Arc<EventLog>,
}

impl Rig {
    pub fn new(name: &str) -> Self {
        let root = scratch_dir(name);
        let output_dir = root.join("screenshots");
        std::fs::create_dir_all(&output_dir).unwrap();
        let log_path = root.join("log.txt");
        Self {
            output_dir,
            log: Arc::new(EventLog::new(&log_path)),
            log_path,
            screen: Arc::new(FakeScreen::default()),
            root,
        }
    }

    pub fn pipeline(&self, desktop: FakeDesktop) -> CapturePipeline {
        let capturer = Arc::new(ImageCapturer::new(self.screen.clone(), &self.output_dir));
        CapturePipeline::new(Arc::new(desktop), capturer, self.log.clone())
    }

    pub fn log_lines(&self) -> Vec<String> {
        read_lines(&self.log_path)
    }

    pub fn artifacts(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.output_dir)
            .map(|entries| entries.filter_map(Result::ok).map(|e| e.path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }
}

impl Drop for Rig {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Message part of a `<timestamp> - <message>` line.
pub fn message(line: &str) -> &str {
    line.split_once(" - ").map(|(_, m)| m).unwrap_or(line)
}

/// Polls until the file holds at least `count` lines, or panics after 10s.
pub async fn wait_for_lines(path: &Path, count: usize) -> Vec<String> {
    for _ in 0..1000 {
        let lines = read_lines(path);
        if lines.len() >= count {
            return lines;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "timed out waiting for {} lines in {}: {:?}",
        count,
        path.display(),
        read_lines(path)
    );
}
