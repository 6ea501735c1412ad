//! Win32 low-level mouse hook (`WH_MOUSE_LL`).
//!
//! This module is only compiled on Windows. The hook lives on a dedicated
//! thread that installs it, pumps messages (Windows delivers low-level hook
//! callbacks through the installing thread's message loop) and removes it
//! when it receives `WM_QUIT`.

use super::{ClickSource, HookError};
use crate::capture::ClickEvent;
use crate::queue::ClickSender;
use std::cell::RefCell;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HHOOK, MSG, MSLLHOOKSTRUCT, WH_MOUSE_LL,
    WM_LBUTTONDOWN, WM_QUIT,
};

thread_local! {
    // Only the hook thread ever sets this, and only it runs the callback.
    static SINK: RefCell<Option<ClickSender>> = const { RefCell::new(None) };
}

struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

/// Global primary-button listener.
pub struct MouseHook {
    running: Mutex<Option<HookThread>>,
}

impl MouseHook {
    pub fn new() -> Self {
        Self {
            running: Mutex::new(None),
        }
    }
}

impl Default for MouseHook {
    fn default() -> Self {
        Self::new()
    }
}

impl ClickSource for MouseHook {
    fn start(&self, sink: ClickSender) -> Result<(), HookError> {
        let mut running = self
            .running
            .lock()
            .map_err(|_| HookError::Install("hook state poisoned".into()))?;
        if running.is_some() {
            return Ok(());
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("click-spy-hook".into())
            .spawn(move || hook_thread(sink, ready_tx))
            .map_err(|e| HookError::Install(format!("spawn hook thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                log::info!("[HOOK] Mouse hook installed on thread {}", thread_id);
                *running = Some(HookThread { thread_id, handle });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(HookError::Install("hook thread exited during start-up".into()))
            }
        }
    }

    fn stop(&self) {
        let Ok(mut running) = self.running.lock() else {
            return;
        };
        let Some(hook) = running.take() else {
            return;
        };

        if let Err(e) = unsafe { PostThreadMessageW(hook.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
            log::warn!("[HOOK] Failed to signal hook thread: {}", e);
        }
        if hook.handle.join().is_err() {
            log::warn!("[HOOK] Hook thread panicked");
        }
        log::info!("[HOOK] Mouse hook removed");
    }
}

impl Drop for MouseHook {
    fn drop(&mut self) {
        self.stop();
    }
}

fn hook_thread(sink: ClickSender, ready: mpsc::Sender<Result<u32, HookError>>) {
    SINK.with(|slot| *slot.borrow_mut() = Some(sink));

    let hook = match install() {
        Ok(hook) => hook,
        Err(e) => {
            SINK.with(|slot| slot.borrow_mut().take());
            let _ = ready.send(Err(e));
            return;
        }
    };

    let thread_id = unsafe { GetCurrentThreadId() };
    if ready.send(Ok(thread_id)).is_err() {
        let _ = unsafe { UnhookWindowsHookEx(hook) };
        return;
    }

    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, HWND::default(), 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        if let Err(e) = UnhookWindowsHookEx(hook) {
            log::warn!("[HOOK] UnhookWindowsHookEx failed: {}", e);
        }
    }

    SINK.with(|slot| slot.borrow_mut().take());
}

fn install() -> Result<HHOOK, HookError> {
    unsafe {
        let module = GetModuleHandleW(None).map_err(|e| HookError::Install(e.to_string()))?;
        let hook = SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_proc), HINSTANCE(module.0), 0)
            .map_err(|e| HookError::Install(e.to_string()))?;
        Ok(hook)
    }
}

/// Runs inside Windows' input dispatch: forward the point and return at once.
unsafe extern "system" fn mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 && wparam.0 as u32 == WM_LBUTTONDOWN {
        let info = &*(lparam.0 as *const MSLLHOOKSTRUCT);
        let click = ClickEvent::new(info.pt.x, info.pt.y);
        SINK.with(|slot| {
            if let Some(sink) = slot.borrow().as_ref() {
                sink.enqueue(click);
            }
        });
    }
    CallNextHookEx(HHOOK::default(), code, wparam, lparam)
}
