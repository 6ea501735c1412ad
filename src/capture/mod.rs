//! Screen capture domain: public API.
//!
//! This module owns everything between a click coordinate and a PNG on
//! disk: which rectangle to capture (`geometry`, answered by `win32` on
//! Windows), how pixels are copied (`region`, `screenshot`) and how the
//! artifact is written (`artifact`).

mod artifact;
pub mod geometry;
mod region;
#[cfg(feature = "desktop")]
mod screenshot;
#[cfg(all(feature = "desktop", target_os = "windows"))]
mod win32;

pub use artifact::{artifact_file_name, CaptureError, ImageCapturer, ScreenSource};
pub use geometry::{
    resolve, CaptureRegion, Desktop, GeometryError, MonitorInfo, WindowHandle,
    PROCESS_PLACEHOLDER,
};
pub use region::copy_region;
#[cfg(feature = "desktop")]
pub use screenshot::XcapDesktop;
#[cfg(all(feature = "desktop", target_os = "windows"))]
pub use win32::Win32Desktop;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Window and monitor queries for the current platform.
#[cfg(all(feature = "desktop", target_os = "windows"))]
pub fn platform_desktop() -> Arc<dyn Desktop> {
    Arc::new(Win32Desktop::new())
}

/// Window and monitor queries for the current platform.
#[cfg(all(feature = "desktop", not(target_os = "windows")))]
pub fn platform_desktop() -> Arc<dyn Desktop> {
    Arc::new(XcapDesktop::new())
}

/// A primary-button press at a virtual-desktop pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClickEvent {
    pub x: i32,
    pub y: i32,
}

impl ClickEvent {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ClickEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Axis-aligned screen rectangle in virtual-desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a rect from Win32-style edges (`right`/`bottom` exclusive).
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Nothing to capture: zero or negative extent on either axis.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, point: ClickEvent) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    /// Squared distance from `point` to the nearest pixel of this rect (0 when inside).
    pub fn distance_sq(&self, point: ClickEvent) -> i64 {
        let nearest_x = (point.x as i64).clamp(self.left as i64, (self.right() - 1).max(self.left) as i64);
        let nearest_y = (point.y as i64).clamp(self.top as i64, (self.bottom() - 1).max(self.top) as i64);
        let dx = point.x as i64 - nearest_x;
        let dy = point.y as i64 - nearest_y;
        dx * dx + dy * dy
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let rect = Rect::from_edges(left, top, right, bottom);
        (!rect.is_empty()).then_some(rect)
    }

    pub fn center(&self) -> ClickEvent {
        ClickEvent::new(self.left + self.width / 2, self.top + self.height / 2)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{} {}x{})",
            self.left, self.top, self.width, self.height
        )
    }
}

/// What a click captures: the whole display or the window under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    #[serde(alias = "screen")]
    Monitor,
    Window,
}

impl CaptureMode {
    /// Name shown in the tray menu and the event log.
    pub fn label(self) -> &'static str {
        match self {
            CaptureMode::Monitor => "Screen",
            CaptureMode::Window => "Window",
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            CaptureMode::Monitor => 0,
            CaptureMode::Window => 1,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => CaptureMode::Window,
            _ => CaptureMode::Monitor,
        }
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monitor" | "screen" => Ok(CaptureMode::Monitor),
            "window" => Ok(CaptureMode::Window),
            other => Err(format!("unknown capture mode '{}'", other)),
        }
    }
}

/// Shared, lock-free cell holding the active [`CaptureMode`].
///
/// Cloning yields another handle to the same cell. Readers see the latest
/// `set`; there is no coupling to captures already in flight.
#[derive(Debug, Clone, Default)]
pub struct ModeState(Arc<AtomicU8>);

impl ModeState {
    pub fn new(mode: CaptureMode) -> Self {
        Self(Arc::new(AtomicU8::new(mode.as_u8())))
    }

    pub fn get(&self) -> CaptureMode {
        CaptureMode::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, mode: CaptureMode) {
        self.0.store(mode.as_u8(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rect_detection() {
        assert!(Rect::new(0, 0, 0, 0).is_empty());
        assert!(Rect::new(10, 10, 100, 0).is_empty());
        assert!(Rect::new(10, 10, -5, 20).is_empty());
        assert!(!Rect::new(-1920, 0, 1920, 1080).is_empty());
    }

    #[test]
    fn contains_excludes_right_and_bottom_edges() {
        let r = Rect::new(0, 0, 1920, 1080);
        assert!(r.contains(ClickEvent::new(0, 0)));
        assert!(r.contains(ClickEvent::new(1919, 1079)));
        assert!(!r.contains(ClickEvent::new(1920, 500)));
        assert!(!r.contains(ClickEvent::new(500, 1080)));
    }

    #[test]
    fn distance_is_zero_inside_and_grows_outside() {
        let r = Rect::new(0, 0, 100, 100);
        assert_eq!(r.distance_sq(ClickEvent::new(50, 50)), 0);
        assert_eq!(r.distance_sq(ClickEvent::new(102, 50)), 9);
        assert_eq!(r.distance_sq(ClickEvent::new(-3, -4)), 25);
    }

    #[test]
    fn intersection_of_overlapping_and_disjoint_rects() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 50, 50, 50)));
        assert_eq!(a.intersection(&Rect::new(200, 200, 10, 10)), None);
    }

    #[test]
    fn mode_parses_menu_and_config_names() {
        assert_eq!("screen".parse::<CaptureMode>(), Ok(CaptureMode::Monitor));
        assert_eq!(" Window ".parse::<CaptureMode>(), Ok(CaptureMode::Window));
        assert!("region".parse::<CaptureMode>().is_err());
    }

    #[test]
    fn mode_state_defaults_to_monitor_and_is_shared_between_clones() {
        let state = ModeState::default();
        let reader = state.clone();
        assert_eq!(reader.get(), CaptureMode::Monitor);
        state.set(CaptureMode::Window);
        assert_eq!(reader.get(), CaptureMode::Window);
    }
}
