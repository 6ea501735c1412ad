//! Desktop queries and screen grabs using the `xcap` crate.
//!
//! This is the infrastructure layer that talks to the OS. Screen grabs go
//! through here on every platform; the window and monitor queries are only
//! used where no native backend exists (Windows uses `win32`). xcap only
//! enumerates top-level windows, so every window it reports is already
//! its own root.

use super::geometry::{monitor_for_point, Desktop, GeometryError, MonitorInfo, WindowHandle};
use super::{copy_region, CaptureError, ClickEvent, Rect, ScreenSource};
use image::RgbaImage;
use xcap::{Monitor, Window};

/// [`Desktop`] and [`ScreenSource`] backed by xcap.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapDesktop;

impl XcapDesktop {
    pub fn new() -> Self {
        Self
    }

    fn find_window(&self, handle: WindowHandle) -> Option<Window> {
        Window::all()
            .ok()?
            .into_iter()
            .find(|w| w.id().ok() == Some(handle.0))
    }
}

fn window_rect(window: &Window) -> Option<Rect> {
    Some(Rect::new(
        window.x().ok()?,
        window.y().ok()?,
        window.width().ok()? as i32,
        window.height().ok()? as i32,
    ))
}

fn monitor_info(monitor: &Monitor) -> Result<MonitorInfo, GeometryError> {
    let field = |e: xcap::XCapError| GeometryError::Enumeration(format!("monitor geometry: {}", e));
    Ok(MonitorInfo {
        device: monitor.name().map_err(field)?,
        bounds: Rect::new(
            monitor.x().map_err(field)?,
            monitor.y().map_err(field)?,
            monitor.width().map_err(field)? as i32,
            monitor.height().map_err(field)? as i32,
        ),
    })
}

impl Desktop for XcapDesktop {
    fn window_at(&self, point: ClickEvent) -> Option<WindowHandle> {
        let windows = match Window::all() {
            Ok(windows) => windows,
            Err(e) => {
                log::warn!("[CAPTURE] Window enumeration failed: {}", e);
                return None;
            }
        };

        // xcap lists windows front to back.
        windows
            .iter()
            .filter(|w| !w.is_minimized().unwrap_or(false))
            .find(|w| window_rect(w).is_some_and(|r| !r.is_empty() && r.contains(point)))
            .and_then(|w| w.id().ok())
            .map(WindowHandle)
    }

    fn root_window(&self, window: WindowHandle) -> WindowHandle {
        window
    }

    fn window_bounds(&self, window: WindowHandle) -> Result<Rect, GeometryError> {
        self.find_window(window)
            .as_ref()
            .and_then(window_rect)
            .ok_or(GeometryError::WindowGone(window.0))
    }

    fn window_title(&self, window: WindowHandle) -> Option<String> {
        self.find_window(window)?.title().ok()
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, GeometryError> {
        let monitors =
            Monitor::all().map_err(|e| GeometryError::Enumeration(format!("monitors: {}", e)))?;
        monitors.iter().map(monitor_info).collect()
    }

    fn process_name(&self, window: WindowHandle) -> Option<String> {
        self.find_window(window)?.app_name().ok()
    }
}

impl ScreenSource for XcapDesktop {
    /// Snapshots the monitor under the rectangle's centre (or the nearest
    /// one) and cuts the rectangle out of it.
    fn grab(&self, rect: Rect) -> Result<RgbaImage, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Grab(e.to_string()))?;
        let infos = monitors
            .iter()
            .map(monitor_info)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CaptureError::Grab(e.to_string()))?;

        let target = monitor_for_point(&infos, rect.center())
            .ok_or_else(|| CaptureError::Grab("no monitor attached".into()))?;
        let index = infos
            .iter()
            .position(|m| std::ptr::eq(m, target))
            .ok_or_else(|| CaptureError::Grab("monitor list changed".into()))?;

        let snapshot = monitors[index]
            .capture_image()
            .map_err(|e| CaptureError::Grab(e.to_string()))?;

        copy_region(&snapshot, target.bounds.left, target.bounds.top, rect)
    }
}
