//! Geometry resolution: which part of the screen a click captures.
//!
//! The OS is reached only through the [`Desktop`] trait so the rules here
//! (root-window walk, nearest-monitor fallback, empty-region outcome,
//! process-name placeholder) can be exercised without a real display.

use super::{CaptureMode, ClickEvent, Rect};

/// Substituted when the owning process of the clicked window is unknown.
pub const PROCESS_PLACEHOLDER: &str = "N/A";

/// Opaque OS window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u32);

/// A physical display: full bounds plus a stable device identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub device: String,
    pub bounds: Rect,
}

/// Window and monitor queries the resolver needs from the OS.
pub trait Desktop: Send + Sync {
    /// Topmost window under the point, if any.
    fn window_at(&self, point: ClickEvent) -> Option<WindowHandle>;

    /// Root (top-level) ancestor of a window. A top-level window is its own root.
    fn root_window(&self, window: WindowHandle) -> WindowHandle;

    fn window_bounds(&self, window: WindowHandle) -> Result<Rect, GeometryError>;

    fn window_title(&self, window: WindowHandle) -> Option<String>;

    fn monitors(&self) -> Result<Vec<MonitorInfo>, GeometryError>;

    /// Executable name of the process owning the window. Best effort.
    fn process_name(&self, window: WindowHandle) -> Option<String>;
}

/// The rectangle to capture for one click and what it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRegion {
    pub rect: Rect,
    /// `Window '<title>'` or `Screen '<device>'`.
    pub target: String,
    /// Owning process of the clicked window, or [`PROCESS_PLACEHOLDER`].
    pub process: String,
}

impl CaptureRegion {
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("No monitor attached")]
    NoMonitor,

    #[error("Failed to enumerate {0}")]
    Enumeration(String),

    #[error("Window {0} disappeared before it could be measured")]
    WindowGone(u32),
}

/// Resolves a click to the region to capture under `mode`.
///
/// An empty rectangle is a valid result meaning "nothing to capture";
/// callers check [`CaptureRegion::is_empty`] before capturing.
pub fn resolve(
    desktop: &dyn Desktop,
    point: ClickEvent,
    mode: CaptureMode,
) -> Result<CaptureRegion, GeometryError> {
    let clicked = desktop.window_at(point);

    let (rect, target) = match mode {
        CaptureMode::Window => resolve_window(desktop, clicked)?,
        CaptureMode::Monitor => resolve_monitor(desktop, point)?,
    };

    let process = clicked
        .and_then(|window| desktop.process_name(window))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| PROCESS_PLACEHOLDER.to_string());

    Ok(CaptureRegion {
        rect,
        target,
        process,
    })
}

fn resolve_window(
    desktop: &dyn Desktop,
    clicked: Option<WindowHandle>,
) -> Result<(Rect, String), GeometryError> {
    let Some(window) = clicked else {
        return Ok((Rect::default(), "Window '<none>'".to_string()));
    };

    let root = desktop.root_window(window);
    let rect = desktop.window_bounds(root)?;
    let title = desktop.window_title(root).unwrap_or_default();
    Ok((rect, format!("Window '{}'", title)))
}

fn resolve_monitor(desktop: &dyn Desktop, point: ClickEvent) -> Result<(Rect, String), GeometryError> {
    let monitors = desktop.monitors()?;
    let monitor = monitor_for_point(&monitors, point).ok_or(GeometryError::NoMonitor)?;
    Ok((monitor.bounds, format!("Screen '{}'", monitor.device)))
}

/// The monitor containing `point`, else the nearest one.
///
/// Ties go to the monitor enumerated first. `None` only for an empty list.
pub fn monitor_for_point(monitors: &[MonitorInfo], point: ClickEvent) -> Option<&MonitorInfo> {
    if let Some(hit) = monitors.iter().find(|m| m.bounds.contains(point)) {
        return Some(hit);
    }
    monitors.iter().min_by_key(|m| m.bounds.distance_sq(point))
}
