//! Window and monitor queries straight from Win32.
//!
//! The window under a click is the one `WindowFromPoint` reports, walked up
//! with `GetAncestor(GA_ROOT)`, so the desktop itself and our own windows
//! are valid targets. Monitors are named by their GDI device
//! (`\\.\DISPLAY1`), which stays stable across sessions and tells two
//! identical panels apart. Pixels still come from [`super::XcapDesktop`].

use super::geometry::{Desktop, GeometryError, MonitorInfo, WindowHandle};
use super::{ClickEvent, Rect};
use std::ffi::c_void;
use std::path::Path;

use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, BOOL, HWND, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFOEXW,
};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetAncestor, GetWindowRect, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId,
    WindowFromPoint, GA_ROOT,
};

/// [`Desktop`] backed by user32/gdi32 calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Desktop;

impl Win32Desktop {
    pub fn new() -> Self {
        Self
    }
}

// Window handles only carry 32 significant bits; the upper half is a sign
// extension, so a round trip through `u32` is lossless.
fn to_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize as i32 as u32)
}

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as i32 as isize as *mut c_void)
}

/// UTF-16 buffer up to its first NUL.
fn wide_to_string(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}

/// `C:\Windows\notepad.exe` → `notepad`.
fn process_stem(image_path: &str) -> Option<String> {
    Path::new(image_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

impl Desktop for Win32Desktop {
    fn window_at(&self, point: ClickEvent) -> Option<WindowHandle> {
        let hwnd = unsafe { WindowFromPoint(POINT { x: point.x, y: point.y }) };
        (!hwnd.0.is_null()).then(|| to_handle(hwnd))
    }

    fn root_window(&self, window: WindowHandle) -> WindowHandle {
        let root = unsafe { GetAncestor(to_hwnd(window), GA_ROOT) };
        if root.0.is_null() {
            window
        } else {
            to_handle(root)
        }
    }

    fn window_bounds(&self, window: WindowHandle) -> Result<Rect, GeometryError> {
        let mut rc = RECT::default();
        unsafe { GetWindowRect(to_hwnd(window), &mut rc) }
            .map_err(|_| GeometryError::WindowGone(window.0))?;
        Ok(Rect::from_edges(rc.left, rc.top, rc.right, rc.bottom))
    }

    fn window_title(&self, window: WindowHandle) -> Option<String> {
        let hwnd = to_hwnd(window);
        let len = unsafe { GetWindowTextLengthW(hwnd) };
        if len <= 0 {
            return None;
        }
        let mut buffer = vec![0u16; len as usize + 1];
        let copied = unsafe { GetWindowTextW(hwnd, &mut buffer) };
        (copied > 0).then(|| wide_to_string(&buffer[..copied as usize]))
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, GeometryError> {
        unsafe extern "system" fn enum_proc(
            monitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            data: LPARAM,
        ) -> BOOL {
            let monitors = unsafe { &mut *(data.0 as *mut Vec<MonitorInfo>) };
            let mut info = MONITORINFOEXW::default();
            info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;
            if unsafe { GetMonitorInfoW(monitor, &mut info.monitorInfo as *mut _ as *mut _) }.as_bool() {
                let rc = info.monitorInfo.rcMonitor;
                monitors.push(MonitorInfo {
                    device: wide_to_string(&info.szDevice),
                    bounds: Rect::from_edges(rc.left, rc.top, rc.right, rc.bottom),
                });
            }
            BOOL(1)
        }

        let mut monitors: Vec<MonitorInfo> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(enum_proc),
                LPARAM(&mut monitors as *mut Vec<MonitorInfo> as isize),
            )
        };
        if !ok.as_bool() {
            return Err(GeometryError::Enumeration("display monitors".into()));
        }
        Ok(monitors)
    }

    fn process_name(&self, window: WindowHandle) -> Option<String> {
        unsafe {
            let mut pid: u32 = 0;
            GetWindowThreadProcessId(to_hwnd(window), Some(&mut pid));
            if pid == 0 {
                return None;
            }
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, BOOL(0), pid).ok()?;
            let mut buffer = vec![0u16; 1024];
            let mut size = buffer.len() as u32;
            let ok = QueryFullProcessImageNameW(handle, PROCESS_NAME_WIN32, PWSTR(buffer.as_mut_ptr()), &mut size)
                .is_ok();
            let _ = CloseHandle(handle);
            if !ok {
                return None;
            }
            process_stem(&String::from_utf16_lossy(&buffer[..size as usize]))
        }
    }
}
